//! Standalone secret reconciliation, outside a full pipeline run.

use super::Orchestrator;
use crate::error::{PilotError, PilotResult};
use crate::secrets::{seed_secrets, SeedRequest, SeedSummary};
use crate::tfvars;
use crate::vault::AzKeyVault;

/// Options for `tfpilot seed-secrets`.
#[derive(Debug, Clone, Default)]
pub struct SeedOptions {
    /// Explicit vault name; otherwise resolved from the workload tfvars.
    pub key_vault: Option<String>,
    /// Extra expected secret names on top of the configured ones.
    pub expected_names: Vec<String>,
    /// Allow placeholder values when no provisioned material exists.
    pub allow_placeholders: bool,
}

impl Orchestrator {
    pub fn reconcile_secrets(&self, options: &SeedOptions) -> PilotResult<SeedSummary> {
        let vault = self.resolve_key_vault(options.key_vault.as_deref())?;
        let bootstrap = self.load_bootstrap_state()?;
        let provisioned = self.foundry_outputs_best_effort(&bootstrap);

        let expected_names = if options.expected_names.is_empty() {
            self.config.expected_secret_names.clone()
        } else {
            options.expected_names.clone()
        };

        let summary = seed_secrets(
            &AzKeyVault,
            &SeedRequest {
                vault: &vault,
                provisioned,
                expected_names: &expected_names,
                allow_placeholders: options.allow_placeholders,
                placeholder_value: &self.config.placeholder_value,
            },
        )?;
        if !options.allow_placeholders && summary.seeded.is_empty() {
            tracing::warn!(
                "expected real provisioned secrets but none were seeded into {vault}"
            );
        }
        Ok(summary)
    }

    /// Vault name from the explicit override, falling back to the
    /// `key_vault_name` recorded in the workload tfvars.
    fn resolve_key_vault(&self, explicit: Option<&str>) -> PilotResult<String> {
        if let Some(name) = explicit {
            let name = name.trim();
            if !name.is_empty() {
                return Ok(name.to_string());
            }
        }

        let tfvars_path = self.paths.workload.join(format!("{}.tfvars", self.env));
        if tfvars_path.exists() {
            if let Ok(document) = tfvars::parse_file(&tfvars_path) {
                if let Some(name) = document.get("key_vault_name").and_then(|value| value.as_str())
                {
                    let name = name.trim();
                    if !name.is_empty() {
                        return Ok(name.to_string());
                    }
                }
            }
        }
        Err(PilotError::MissingKeyVault)
    }
}
