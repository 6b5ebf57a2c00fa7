//! Foundry stage: optional Azure AI Foundry / OpenAI provisioning. After a
//! successful apply the provisioned keys are reconciled into the
//! environment's Key Vault with real (`source=foundry`) provenance.

use super::Orchestrator;
use crate::error::{PilotError, PilotResult};
use crate::secrets::{seed_secrets, SeedRequest};
use crate::stacks::{BootstrapState, FoundationState, FoundryState, FOUNDRY, PLATFORM};
use crate::state::state_key;
use crate::terraform;
use crate::vault::AzKeyVault;

impl Orchestrator {
    /// Deploy the foundry stack when it exists. Skips (each with its own
    /// logged reason) when flagged off or when the stack directory is
    /// absent; a skip is a normal outcome, not an error.
    pub fn deploy_foundry(
        &self,
        skip: bool,
        bootstrap: Option<&BootstrapState>,
        foundation: Option<&FoundationState>,
    ) -> PilotResult<FoundryState> {
        if skip {
            tracing::info!("skipping {FOUNDRY} (flagged to skip)");
            return Ok(FoundryState::absent());
        }
        if !self.paths.foundry.exists() {
            tracing::info!("{FOUNDRY} stack missing; skipping");
            return Ok(FoundryState::absent());
        }

        let bootstrap = self.bootstrap_or_load(bootstrap)?;
        let foundation = self.foundation_or_load(foundation, &bootstrap)?;

        let tfvars_file = self.ensure_tfvars(&self.paths.foundry)?;
        self.store.update(
            &tfvars_file,
            &[
                (
                    "remote_state_resource_group_name",
                    Some(bootstrap.resource_group.as_str().into()),
                ),
                (
                    "remote_state_storage_account_name",
                    Some(bootstrap.storage_account.as_str().into()),
                ),
                (
                    "remote_state_container_name",
                    Some(bootstrap.container.as_str().into()),
                ),
                (
                    "foundation_state_blob_key",
                    Some(state_key(&bootstrap.state_prefix, PLATFORM).into()),
                ),
            ],
        )?;

        let env = self.core_env().with_foundation(&bootstrap, &foundation);

        tracing::info!("==> {FOUNDRY}");
        let foundry_key = state_key(&bootstrap.state_prefix, FOUNDRY);
        terraform::init_remote(&self.paths.foundry, &self.backend(&bootstrap, FOUNDRY), &env)?;
        terraform::apply(&self.paths.foundry, &tfvars_file, &env)?;

        if foundation.key_vault_name.is_empty() {
            return Err(PilotError::MissingKeyVault);
        }
        let provisioned = self.foundry_outputs_best_effort(&bootstrap);
        let summary = seed_secrets(
            &AzKeyVault,
            &SeedRequest {
                vault: &foundation.key_vault_name,
                provisioned,
                expected_names: &self.config.expected_secret_names,
                allow_placeholders: false,
                placeholder_value: &self.config.placeholder_value,
            },
        )?;
        if summary.seeded.is_empty() {
            tracing::warn!(
                "foundry apply succeeded but no OpenAI secrets were seeded into {}; \
                 rerun the workload stage after verifying terraform outputs",
                foundation.key_vault_name
            );
        }

        Ok(FoundryState::provisioned_at(foundry_key))
    }
}
