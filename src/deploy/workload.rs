//! Workload stage: consumes every prior stage's state plus reconciled
//! secrets, and applies with concrete image references.

use super::Orchestrator;
use crate::error::PilotResult;
use crate::exec::Cmd;
use crate::images;
use crate::stacks::{BootstrapState, FoundationState, FoundryState, FOUNDRY, WORKLOAD};
use crate::state::state_key;
use crate::terraform;

/// Workload deployment knobs.
#[derive(Debug, Clone, Default)]
pub struct WorkloadOptions {
    /// Read recorded image tags from the tfvars instead of building.
    pub no_image_build: bool,
    /// Forwarded to the build pipeline: build with the local docker daemon.
    pub local_docker: bool,
    /// Treat provisioned OpenAI as disabled regardless of foundry state.
    pub skip_openai: bool,
}

impl Orchestrator {
    pub fn deploy_workload(
        &self,
        options: &WorkloadOptions,
        bootstrap: Option<&BootstrapState>,
        foundation: Option<&FoundationState>,
        foundry: Option<&FoundryState>,
    ) -> PilotResult<()> {
        let bootstrap = self.bootstrap_or_load(bootstrap)?;
        let foundation = self.foundation_or_load(foundation, &bootstrap)?;
        let tfvars_file = self.ensure_tfvars(&self.paths.workload)?;

        let mut env = self.core_env().with_foundation(&bootstrap, &foundation);

        let foundry = match foundry {
            Some(state) => state.clone(),
            None => self.detect_foundry_state(options.skip_openai, &bootstrap),
        };
        if foundry.provisioned {
            env.set("TF_VAR_use_provisioned_azure_openai", "true");
            if let Some(key) = &foundry.state_blob_key {
                env.set("TF_VAR_openai_state_blob_key", key);
            }
        } else {
            env.set("TF_VAR_use_provisioned_azure_openai", "false");
            env.unset("TF_VAR_openai_state_blob_key");
        }

        if self.paths.observability.exists() {
            match self.load_observability_state(&bootstrap) {
                Ok(observability) => {
                    env = env.with_observability(&observability);
                }
                Err(error) => tracing::warn!(
                    "observability state unavailable ({error}); continuing without \
                     log/metrics bindings"
                ),
            }
        }

        self.sync_environment(&foundation.key_vault_name, foundry.provisioned)?;

        let images = if options.no_image_build {
            images::images_from_tfvars(&tfvars_file)?
        } else {
            images::build_images(&self.config, options.local_docker)?
        };
        env.set("TF_VAR_gateway_image", &images.gateway);
        env.set("TF_VAR_hydrenv_image", &images.hydrenv);

        tracing::info!("==> {WORKLOAD}");
        terraform::init_remote(&self.paths.workload, &self.backend(&bootstrap, WORKLOAD), &env)?;
        terraform::apply(&self.paths.workload, &tfvars_file, &env)?;

        if !options.no_image_build {
            // record the applied images so --no-image-build can reuse them
            self.store.update(
                &tfvars_file,
                &[
                    ("gateway_image", Some(images.gateway.into())),
                    ("hydrenv_image", Some(images.hydrenv.into())),
                ],
            )?;
        }
        Ok(())
    }

    /// Decide whether the workload consumes provisioned OpenAI. Three
    /// distinct skip paths, each logged: flagged off, stack directory
    /// missing, or state unreadable.
    fn detect_foundry_state(&self, skip: bool, bootstrap: &BootstrapState) -> FoundryState {
        if skip {
            tracing::info!("treating provisioned OpenAI as disabled for workload deployment");
            return FoundryState::absent();
        }
        if !self.paths.foundry.exists() {
            tracing::info!("{FOUNDRY} stack missing; continuing without provisioned OpenAI");
            return FoundryState::absent();
        }

        let env = self.core_env();
        let probe = terraform::init_remote(
            &self.paths.foundry,
            &self.backend(bootstrap, FOUNDRY),
            &env,
        )
        .and_then(|()| terraform::output(&self.paths.foundry, &env));
        match probe {
            Ok(_) => FoundryState::provisioned_at(state_key(&bootstrap.state_prefix, FOUNDRY)),
            Err(error) => {
                tracing::info!(
                    "{FOUNDRY} state not readable ({error}); continuing without provisioned OpenAI"
                );
                FoundryState::absent()
            }
        }
    }

    /// Environment-sync boundary: renders config files for the workload
    /// from Key Vault and env sources. Internals live outside this tool.
    fn sync_environment(&self, key_vault: &str, use_provisioned_openai: bool) -> PilotResult<()> {
        let mut cmd = Cmd::new(&self.config.sync_env_command).arg(&self.env);
        if !key_vault.is_empty() {
            cmd = cmd.args(["--key-vault", key_vault]);
        }
        if use_provisioned_openai {
            cmd = cmd.arg("--use-provisioned-openai");
        }
        cmd.run()?;
        Ok(())
    }
}
