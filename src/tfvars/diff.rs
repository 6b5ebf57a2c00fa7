//! Structural change reporting for tfvars writes
//!
//! Before a document is rewritten, the previous parseable version is
//! compared against the new one and the change summary is logged. The
//! reporter is an optional collaborator: writes never depend on it
//! succeeding, and a no-op implementation is available.

use std::path::Path;

use similar::{ChangeTag, TextDiff};

use super::{render, Document};

/// Top-level keys that differ between two documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub changed: Vec<String>,
}

impl DocumentDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    /// Compact summary such as `+2 ~1 -0`.
    pub fn summary(&self) -> String {
        format!(
            "+{} ~{} -{}",
            self.added.len(),
            self.changed.len(),
            self.removed.len()
        )
    }
}

/// Compare two documents by top-level key.
pub fn document_diff(before: &Document, after: &Document) -> DocumentDiff {
    let mut diff = DocumentDiff::default();
    for (key, value) in after.iter() {
        match before.get(key) {
            None => diff.added.push(key.to_string()),
            Some(previous) if previous != value => diff.changed.push(key.to_string()),
            Some(_) => {}
        }
    }
    for (key, _) in before.iter() {
        if !after.contains_key(key) {
            diff.removed.push(key.to_string());
        }
    }
    diff
}

/// Observer for document rewrites.
pub trait DiffReporter {
    fn report(&self, path: &Path, before: &Document, after: &Document);
}

/// Default when change reporting is unwanted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDiffReporter;

impl DiffReporter for NoopDiffReporter {
    fn report(&self, _path: &Path, _before: &Document, _after: &Document) {}
}

/// Logs a key summary at info and the changed lines at debug.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiffReporter;

impl DiffReporter for TracingDiffReporter {
    fn report(&self, path: &Path, before: &Document, after: &Document) {
        let diff = document_diff(before, after);
        if diff.is_empty() {
            return;
        }
        tracing::info!(
            "updated {}: {} (added: [{}] changed: [{}] removed: [{}])",
            path.display(),
            diff.summary(),
            diff.added.join(", "),
            diff.changed.join(", "),
            diff.removed.join(", "),
        );

        let old_text = render(before);
        let new_text = render(after);
        for change in TextDiff::from_lines(old_text.as_str(), new_text.as_str()).iter_all_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => '-',
                ChangeTag::Insert => '+',
                ChangeTag::Equal => continue,
            };
            tracing::debug!("{sign} {}", change.value().trim_end());
        }
    }
}
