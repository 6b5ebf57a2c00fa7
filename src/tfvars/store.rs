//! The tfvars store: seed, backfill, update, write back
//!
//! `ensure` guarantees a stage has a usable `<env>.tfvars` before apply,
//! seeding it from a checked-in example when missing and backfilling keys
//! the example gained since. `update` applies targeted key updates without
//! disturbing the rest of the document. Both write through a temp file and
//! an atomic rename.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{PilotError, PilotResult};

use super::{parse_file, render, DiffReporter, Document, TfValue, TracingDiffReporter};

/// Ordered example-file candidates for an environment.
fn example_candidates(stack_dir: &Path, env: &str) -> [PathBuf; 2] {
    [
        stack_dir.join(format!("terraform.tfvars.{env}.example")),
        stack_dir.join(format!("{env}.tfvars.example")),
    ]
}

pub struct TfvarsStore {
    reporter: Box<dyn DiffReporter>,
}

impl Default for TfvarsStore {
    fn default() -> Self {
        Self {
            reporter: Box::new(TracingDiffReporter),
        }
    }
}

impl TfvarsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reporter(reporter: Box<dyn DiffReporter>) -> Self {
        Self { reporter }
    }

    /// Make sure `<stack_dir>/<env>.tfvars` exists and carries the supplied
    /// identity, seeding or backfilling from the stack's example file.
    ///
    /// An existing-but-corrupt document is downgraded to a warning and
    /// regenerated from the example rather than aborting the pipeline.
    pub fn ensure(
        &self,
        stack_dir: &Path,
        env: &str,
        subscription_id: &str,
        tenant_id: &str,
    ) -> PilotResult<PathBuf> {
        let target = stack_dir.join(format!("{env}.tfvars"));
        let example = example_candidates(stack_dir, env)
            .into_iter()
            .find(|candidate| candidate.exists());

        let mut base = if !target.exists() {
            let Some(example) = example else {
                return Err(PilotError::MissingTfvars {
                    env: env.to_string(),
                    stack_dir: stack_dir.to_path_buf(),
                });
            };
            std::fs::copy(&example, &target)?;
            tracing::info!(
                "seeded tfvars {} (from {})",
                target.display(),
                example.file_name().unwrap_or_default().to_string_lossy()
            );
            parse_file(&target)?
        } else {
            let current = match parse_file(&target) {
                Ok(document) => document,
                Err(error) => {
                    tracing::warn!(
                        "failed to parse existing tfvars {} ({error}); regenerating from example",
                        target.display()
                    );
                    Document::new()
                }
            };
            match example {
                // Backfill keys the example has gained without overwriting
                // anything already present.
                Some(example) => {
                    let mut merged = parse_file(&example)?;
                    merged.merge_update(&current);
                    merged
                }
                None => current,
            }
        };

        base.insert("subscription_id", subscription_id);
        base.insert("tenant_id", tenant_id);
        base.insert("environment_code", env);

        self.write(&target, &base)?;
        Ok(target)
    }

    /// Apply `updates` to an existing document. A `None` value is an
    /// explicit no-op: the key keeps whatever value it already has.
    pub fn update(&self, path: &Path, updates: &[(&str, Option<TfValue>)]) -> PilotResult<()> {
        let mut document = parse_file(path)?;
        for (key, value) in updates {
            if let Some(value) = value {
                document.insert(*key, value.clone());
            }
        }
        self.write(path, &document)
    }

    fn write(&self, path: &Path, document: &Document) -> PilotResult<()> {
        let before = if path.exists() {
            parse_file(path).ok()
        } else {
            None
        };

        let directory = path.parent().unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(directory)?;
        temp.write_all(render(document).as_bytes())?;
        temp.persist(path).map_err(|err| err.error)?;

        if let Some(before) = before {
            self.reporter.report(path, &before, document);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tfvars::parse_str;
    use tempfile::tempdir;

    fn store() -> TfvarsStore {
        TfvarsStore::new()
    }

    #[test]
    fn ensure_without_tfvars_or_example_is_a_configuration_error() {
        let dir = tempdir().unwrap();
        let err = store()
            .ensure(dir.path(), "dev", "sub", "ten")
            .unwrap_err();
        assert!(matches!(err, PilotError::MissingTfvars { .. }));
        assert!(err.to_string().contains("dev"));
    }

    #[test]
    fn ensure_seeds_from_example_and_forces_identity() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("terraform.tfvars.dev.example"),
            "location = \"westeurope\"\nreplicas = 2\n",
        )
        .unwrap();

        let target = store().ensure(dir.path(), "dev", "sub-1", "ten-1").unwrap();
        let doc = parse_file(&target).unwrap();

        let keys: Vec<_> = doc.keys().collect();
        assert_eq!(
            keys,
            vec!["location", "replicas", "subscription_id", "tenant_id", "environment_code"]
        );
        assert_eq!(doc.get("subscription_id"), Some(&TfValue::String("sub-1".to_string())));
        assert_eq!(doc.get("environment_code"), Some(&TfValue::String("dev".to_string())));
    }

    #[test]
    fn ensure_prefers_the_first_example_candidate() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("terraform.tfvars.dev.example"),
            "origin = \"primary\"\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("dev.tfvars.example"), "origin = \"secondary\"\n").unwrap();

        let target = store().ensure(dir.path(), "dev", "s", "t").unwrap();
        let doc = parse_file(&target).unwrap();
        assert_eq!(doc.get("origin"), Some(&TfValue::String("primary".to_string())));
    }

    #[test]
    fn ensure_backfills_example_keys_without_overwriting() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("dev.tfvars.example"),
            "location = \"westeurope\"\nnew_knob = true\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("dev.tfvars"),
            "location = \"northeurope\"\ncustom = 7\n",
        )
        .unwrap();

        let target = store().ensure(dir.path(), "dev", "s", "t").unwrap();
        let doc = parse_file(&target).unwrap();

        // existing value wins, example-only key arrives
        assert_eq!(doc.get("location"), Some(&TfValue::String("northeurope".to_string())));
        assert_eq!(doc.get("new_knob"), Some(&TfValue::Bool(true)));
        assert_eq!(doc.get("custom"), Some(&TfValue::Int(7)));
    }

    #[test]
    fn ensure_regenerates_a_corrupt_document_from_the_example() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("dev.tfvars.example"), "location = \"we\"\n").unwrap();
        std::fs::write(dir.path().join("dev.tfvars"), "this is {{{ not tfvars\n").unwrap();

        let target = store().ensure(dir.path(), "dev", "s", "t").unwrap();
        let doc = parse_file(&target).unwrap();
        assert_eq!(doc.get("location"), Some(&TfValue::String("we".to_string())));
        assert_eq!(doc.get("environment_code"), Some(&TfValue::String("dev".to_string())));
    }

    #[test]
    fn ensure_without_example_keeps_the_existing_document() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("dev.tfvars"), "only = \"mine\"\n").unwrap();

        let target = store().ensure(dir.path(), "dev", "s", "t").unwrap();
        let doc = parse_file(&target).unwrap();
        assert_eq!(doc.get("only"), Some(&TfValue::String("mine".to_string())));
        assert_eq!(doc.len(), 4);
    }

    #[test]
    fn update_skips_none_values_and_keeps_other_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dev.tfvars");
        std::fs::write(&path, "keep = 1\ntouch = \"old\"\n").unwrap();

        store()
            .update(
                &path,
                &[
                    ("touch", Some(TfValue::String("new".to_string()))),
                    ("keep", None),
                    ("added", Some(TfValue::Bool(false))),
                ],
            )
            .unwrap();

        let doc = parse_file(&path).unwrap();
        assert_eq!(doc.get("keep"), Some(&TfValue::Int(1)));
        assert_eq!(doc.get("touch"), Some(&TfValue::String("new".to_string())));
        assert_eq!(doc.get("added"), Some(&TfValue::Bool(false)));
    }

    #[test]
    fn update_on_a_missing_file_fails() {
        let dir = tempdir().unwrap();
        let result = store().update(&dir.path().join("absent.tfvars"), &[]);
        assert!(result.is_err());
    }

    #[test]
    fn a_noop_reporter_still_writes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dev.tfvars");
        std::fs::write(&path, "value = 1\n").unwrap();

        let store = TfvarsStore::with_reporter(Box::new(crate::tfvars::NoopDiffReporter));
        store
            .update(&path, &[("value", Some(TfValue::Int(2)))])
            .unwrap();
        assert_eq!(parse_file(&path).unwrap().get("value"), Some(&TfValue::Int(2)));
    }

    #[test]
    fn written_documents_round_trip() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("dev.tfvars.example"),
            "tags = {\n  team = \"gw\"\n}\nzones = [\"1\", \"2\"]\n",
        )
        .unwrap();

        let target = store().ensure(dir.path(), "dev", "s", "t").unwrap();
        let rendered = std::fs::read_to_string(&target).unwrap();
        let reparsed = parse_str(&rendered).unwrap();
        assert_eq!(reparsed, parse_file(&target).unwrap());
        assert!(rendered.ends_with('\n'));
    }
}
