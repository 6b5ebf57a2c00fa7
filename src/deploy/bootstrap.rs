//! Bootstrap stage: local backend, produces the remote-state coordinates
//! every later stage keys its backend off.

use super::Orchestrator;
use crate::error::PilotResult;
use crate::stacks::{BootstrapState, BOOTSTRAP};
use crate::terraform;

impl Orchestrator {
    pub fn deploy_bootstrap(&self) -> PilotResult<BootstrapState> {
        let tfvars_file = self.ensure_tfvars(&self.paths.bootstrap)?;
        let env = self.core_env();
        let state_path = self.paths.bootstrap_state_file(&self.env);

        tracing::info!("==> {BOOTSTRAP}");
        terraform::init_local(&self.paths.bootstrap, &state_path, &env)?;
        terraform::apply(&self.paths.bootstrap, &tfvars_file, &env)?;

        let outputs = terraform::output(&self.paths.bootstrap, &env)?;
        BootstrapState::from_outputs(&outputs)
    }
}
