//! Deployment orchestration
//!
//! Sequences the fixed stage pipeline (bootstrap → platform → optional
//! foundry → workload), threading each stage's typed state into the next
//! stage's environment bindings. Each stage transition follows the same
//! shape: ensure tfvars → export context bindings → derive state key →
//! retry-wrapped backend init → retry-wrapped apply → read outputs.

mod bootstrap;
mod foundry;
mod observability;
mod platform;
mod seed;
mod workload;

pub use seed::SeedOptions;
pub use workload::WorkloadOptions;

use std::path::Path;

use crate::azure;
use crate::config::Config;
use crate::envctx::{AzureContext, TfEnv};
use crate::error::{PilotError, PilotResult};
use crate::exec;
use crate::secrets::ProvisionedSecrets;
use crate::stacks::{
    BootstrapState, FoundationState, ObservabilityState, StackPaths, FOUNDRY, OBSERVABILITY,
    PLATFORM,
};
use crate::terraform::{self, RemoteBackend};
use crate::tfvars::TfvarsStore;

/// Options for the full pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    pub skip_foundry: bool,
    pub workload: WorkloadOptions,
}

/// One orchestration run against one environment.
pub struct Orchestrator {
    env: String,
    ctx: AzureContext,
    paths: StackPaths,
    config: Config,
    store: TfvarsStore,
}

impl Orchestrator {
    /// Pre-flight the external tools, resolve identity once, and lay out
    /// the stage directories.
    pub fn new(root: &Path, env: &str) -> PilotResult<Self> {
        exec::ensure_tools(&["az", "terraform"])?;
        let config = Config::load_or_default(root);
        let ctx = azure::azure_context()?;
        let paths = StackPaths::resolve(root, &config.stacks_dir);
        Ok(Self {
            env: env.to_string(),
            ctx,
            paths,
            config,
            store: TfvarsStore::new(),
        })
    }

    /// Run the whole pipeline in order. A skipped or missing foundry stage
    /// never aborts; the workload stage consumes whatever state exists.
    pub fn deploy_all(&self, options: &PipelineOptions) -> PilotResult<()> {
        let bootstrap = self.deploy_bootstrap()?;
        let foundation = self.deploy_platform(Some(&bootstrap))?;
        let foundry =
            self.deploy_foundry(options.skip_foundry, Some(&bootstrap), Some(&foundation))?;
        self.deploy_workload(
            &options.workload,
            Some(&bootstrap),
            Some(&foundation),
            Some(&foundry),
        )
    }

    fn core_env(&self) -> TfEnv {
        TfEnv::core(&self.env, &self.ctx)
    }

    fn backend(&self, bootstrap: &BootstrapState, stage: &str) -> RemoteBackend {
        RemoteBackend::for_stage(bootstrap, &self.ctx.tenant_id, stage)
    }

    fn ensure_tfvars(&self, stack_dir: &Path) -> PilotResult<std::path::PathBuf> {
        self.store.ensure(
            stack_dir,
            &self.env,
            &self.ctx.subscription_id,
            &self.ctx.tenant_id,
        )
    }

    fn bootstrap_or_load(
        &self,
        provided: Option<&BootstrapState>,
    ) -> PilotResult<BootstrapState> {
        match provided {
            Some(state) => Ok(state.clone()),
            None => self.load_bootstrap_state(),
        }
    }

    fn foundation_or_load(
        &self,
        provided: Option<&FoundationState>,
        bootstrap: &BootstrapState,
    ) -> PilotResult<FoundationState> {
        match provided {
            Some(state) => Ok(state.clone()),
            None => self.load_foundation_state(bootstrap),
        }
    }

    /// Re-derive bootstrap state from the local backend. Requires a prior
    /// bootstrap deployment for this environment.
    pub fn load_bootstrap_state(&self) -> PilotResult<BootstrapState> {
        let state_path = self.paths.bootstrap_state_file(&self.env);
        if !state_path.exists() {
            return Err(PilotError::BootstrapStateNotFound {
                path: state_path,
                env: self.env.clone(),
            });
        }
        let env = self.core_env();
        terraform::init_local(&self.paths.bootstrap, &state_path, &env)?;
        let outputs = terraform::output(&self.paths.bootstrap, &env)?;
        BootstrapState::from_outputs(&outputs)
    }

    /// Re-derive platform state from the remote backend.
    pub fn load_foundation_state(
        &self,
        bootstrap: &BootstrapState,
    ) -> PilotResult<FoundationState> {
        let env = self.core_env();
        terraform::init_remote(&self.paths.foundation, &self.backend(bootstrap, PLATFORM), &env)?;
        let outputs = terraform::output(&self.paths.foundation, &env)?;
        FoundationState::from_outputs(&outputs)
    }

    /// Re-derive observability state from the remote backend.
    pub fn load_observability_state(
        &self,
        bootstrap: &BootstrapState,
    ) -> PilotResult<ObservabilityState> {
        let env = self.core_env();
        terraform::init_remote(
            &self.paths.observability,
            &self.backend(bootstrap, OBSERVABILITY),
            &env,
        )?;
        let outputs = terraform::output(&self.paths.observability, &env)?;
        ObservabilityState::from_outputs(&outputs)
    }

    /// Best-effort read of the foundry stage's provisioned secret material.
    /// Any failure to read that state means "no provisioned material", not
    /// an error.
    pub fn foundry_outputs_best_effort(
        &self,
        bootstrap: &BootstrapState,
    ) -> Option<ProvisionedSecrets> {
        if !self.paths.foundry.exists() {
            tracing::info!("{FOUNDRY} stack not present; skipping provisioned OpenAI discovery");
            return None;
        }
        let env = self.core_env();
        let result = terraform::init_remote(
            &self.paths.foundry,
            &self.backend(bootstrap, FOUNDRY),
            &env,
        )
        .and_then(|()| terraform::output(&self.paths.foundry, &env));
        match result {
            Ok(outputs) => Some(ProvisionedSecrets {
                names: outputs.optional_string_list("azure_openai_key_vault_secret_names"),
                values: outputs.optional_string_list("azure_openai_primary_keys"),
            }),
            Err(error) => {
                tracing::info!("unable to read {FOUNDRY} state for OpenAI sync: {error}");
                None
            }
        }
    }
}
