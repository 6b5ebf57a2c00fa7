//! Observability stage: optional log/metrics infrastructure. Deployed on
//! demand; the workload stage picks its state up best-effort.

use super::Orchestrator;
use crate::error::PilotResult;
use crate::stacks::{BootstrapState, OBSERVABILITY};
use crate::terraform;

impl Orchestrator {
    pub fn deploy_observability(&self, bootstrap: Option<&BootstrapState>) -> PilotResult<()> {
        let bootstrap = self.bootstrap_or_load(bootstrap)?;
        let tfvars_file = self.ensure_tfvars(&self.paths.observability)?;
        let env = self.core_env();

        tracing::info!("==> {OBSERVABILITY}");
        terraform::init_remote(
            &self.paths.observability,
            &self.backend(&bootstrap, OBSERVABILITY),
            &env,
        )?;
        terraform::apply(&self.paths.observability, &tfvars_file, &env)
    }
}
