//! Secret store access
//!
//! The [`SecretStore`] port separates reconciliation logic from the `az
//! keyvault` CLI. `show` distinguishes not-found from real failures; `set`
//! is retried while Key Vault data-plane RBAC propagates.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::classify::classify_failure;
use crate::error::{PilotError, PilotResult};
use crate::exec::{Cmd, CommandFailure, Echo};
use crate::retry::SECRET_SET;

/// A secret as currently stored, with its provenance tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredSecret {
    pub value: Option<String>,
    pub tags: BTreeMap<String, String>,
}

impl StoredSecret {
    /// The provenance source tag, empty when untagged.
    pub fn source(&self) -> &str {
        self.tags.get("source").map(String::as_str).unwrap_or("")
    }
}

/// Remote secret store operations.
pub trait SecretStore {
    /// Read a secret; `Ok(None)` is the distinguished not-found outcome.
    fn show(&self, vault: &str, name: &str) -> PilotResult<Option<StoredSecret>>;

    /// Write a secret value with its tags.
    fn set(
        &self,
        vault: &str,
        name: &str,
        value: &str,
        tags: &BTreeMap<String, String>,
    ) -> PilotResult<()>;
}

/// Production store backed by the `az keyvault secret` CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct AzKeyVault;

#[derive(Deserialize)]
struct ShowPayload {
    value: Option<String>,
    tags: Option<BTreeMap<String, String>>,
}

impl SecretStore for AzKeyVault {
    fn show(&self, vault: &str, name: &str) -> PilotResult<Option<StoredSecret>> {
        let result = Cmd::new("az")
            .args(["keyvault", "secret", "show"])
            .args(["--vault-name", vault, "--name", name])
            .args(["--query", "{value:value, tags:tags}", "-o", "json"])
            .run_captured(Echo::Never);

        let output = match result {
            Ok(output) => output,
            Err(failure) => {
                if is_not_found(&failure) {
                    return Ok(None);
                }
                return Err(failure.into());
            }
        };

        let payload: ShowPayload =
            serde_json::from_str(&output.stdout).map_err(|err| PilotError::SecretDecode {
                name: name.to_string(),
                message: err.to_string(),
            })?;
        Ok(Some(StoredSecret {
            value: payload.value,
            tags: payload.tags.unwrap_or_default(),
        }))
    }

    fn set(
        &self,
        vault: &str,
        name: &str,
        value: &str,
        tags: &BTreeMap<String, String>,
    ) -> PilotResult<()> {
        let mut cmd = Cmd::new("az")
            .args(["keyvault", "secret", "set"])
            .args(["--vault-name", vault, "--name", name, "--value", value]);
        if !tags.is_empty() {
            cmd = cmd.arg("--tags");
            for (key, tag_value) in tags {
                cmd = cmd.arg(format!("{key}={tag_value}"));
            }
        }
        SECRET_SET.run(classify_failure, || {
            cmd.run_captured(Echo::Never).map(|_| ())
        })?;
        Ok(())
    }
}

fn is_not_found(failure: &CommandFailure) -> bool {
    let text = failure.output_text();
    text.contains("SecretNotFound") || text.contains("was not found")
}

/// In-memory store for tests, cloneable and shared.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct MemorySecretStore {
    secrets: std::sync::Arc<
        std::sync::Mutex<std::collections::HashMap<(String, String), StoredSecret>>,
    >,
    pub writes: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
}

#[cfg(test)]
impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preload(&self, vault: &str, name: &str, value: &str, tags: &[(&str, &str)]) {
        let tags = tags
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.secrets.lock().unwrap().insert(
            (vault.to_string(), name.to_string()),
            StoredSecret {
                value: Some(value.to_string()),
                tags,
            },
        );
    }

    pub fn stored_value(&self, vault: &str, name: &str) -> Option<String> {
        self.secrets
            .lock()
            .unwrap()
            .get(&(vault.to_string(), name.to_string()))
            .and_then(|secret| secret.value.clone())
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }
}

#[cfg(test)]
impl SecretStore for MemorySecretStore {
    fn show(&self, vault: &str, name: &str) -> PilotResult<Option<StoredSecret>> {
        Ok(self
            .secrets
            .lock()
            .unwrap()
            .get(&(vault.to_string(), name.to_string()))
            .cloned())
    }

    fn set(
        &self,
        vault: &str,
        name: &str,
        value: &str,
        tags: &BTreeMap<String, String>,
    ) -> PilotResult<()> {
        self.secrets.lock().unwrap().insert(
            (vault.to_string(), name.to_string()),
            StoredSecret {
                value: Some(value.to_string()),
                tags: tags.clone(),
            },
        );
        self.writes.lock().unwrap().push(name.to_string());
        Ok(())
    }
}
