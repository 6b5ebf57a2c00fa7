//! Platform stage: remote backend keyed off bootstrap coordinates,
//! produces the registry/vault/identity coordinates the workload consumes.

use super::Orchestrator;
use crate::error::PilotResult;
use crate::stacks::{BootstrapState, FoundationState, PLATFORM};
use crate::terraform;

impl Orchestrator {
    pub fn deploy_platform(
        &self,
        bootstrap: Option<&BootstrapState>,
    ) -> PilotResult<FoundationState> {
        let bootstrap = self.bootstrap_or_load(bootstrap)?;
        let tfvars_file = self.ensure_tfvars(&self.paths.foundation)?;
        let env = self.core_env();

        tracing::info!("==> {PLATFORM}");
        terraform::init_remote(&self.paths.foundation, &self.backend(&bootstrap, PLATFORM), &env)?;
        terraform::apply(&self.paths.foundation, &tfvars_file, &env)?;

        let outputs = terraform::output(&self.paths.foundation, &env)?;
        FoundationState::from_outputs(&outputs)
    }
}
