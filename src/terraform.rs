//! Terraform invocation boundary
//!
//! Wraps the external `terraform` tool: backend init (local or remote),
//! apply, and output capture. Remote init and apply run under the retry
//! policies for storage RBAC propagation and transient request conflicts;
//! everything else propagates the original failure.

use std::path::Path;

use crate::classify::classify_failure;
use crate::envctx::TfEnv;
use crate::error::PilotResult;
use crate::exec::{Cmd, Echo};
use crate::outputs::StackOutputs;
use crate::retry::{APPLY, BACKEND_INIT};
use crate::state::state_key;
use crate::stacks::BootstrapState;

/// Remote backend coordinates for one stage's state blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteBackend {
    pub tenant_id: String,
    pub resource_group: String,
    pub storage_account: String,
    pub container: String,
    pub key: String,
}

impl RemoteBackend {
    /// Backend for `stage`, keyed under the bootstrap state prefix.
    pub fn for_stage(bootstrap: &BootstrapState, tenant_id: &str, stage: &str) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            resource_group: bootstrap.resource_group.clone(),
            storage_account: bootstrap.storage_account.clone(),
            container: bootstrap.container.clone(),
            key: state_key(&bootstrap.state_prefix, stage),
        }
    }

    fn args(&self) -> Vec<String> {
        vec![
            "-backend-config=use_azuread_auth=true".to_string(),
            format!("-backend-config=tenant_id={}", self.tenant_id),
            format!("-backend-config=resource_group_name={}", self.resource_group),
            format!("-backend-config=storage_account_name={}", self.storage_account),
            format!("-backend-config=container_name={}", self.container),
            format!("-backend-config=key={}", self.key),
        ]
    }
}

fn terraform(stack_dir: &Path, env: &TfEnv) -> Cmd {
    Cmd::new("terraform")
        .arg(format!("-chdir={}", stack_dir.display()))
        .envs(env.iter())
}

/// `init -reconfigure` against a local state file (bootstrap only).
pub fn init_local(stack_dir: &Path, state_path: &Path, env: &TfEnv) -> PilotResult<()> {
    if let Some(parent) = state_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    terraform(stack_dir, env)
        .args(["init", "-reconfigure"])
        .arg(format!("-backend-config=path={}", state_path.display()))
        .run_captured(Echo::Always)?;
    Ok(())
}

/// `init -reconfigure` against the remote backend, retried while storage
/// RBAC propagation 403s.
pub fn init_remote(stack_dir: &Path, backend: &RemoteBackend, env: &TfEnv) -> PilotResult<()> {
    let cmd = terraform(stack_dir, env)
        .args(["init", "-reconfigure"])
        .args(backend.args());
    BACKEND_INIT.run(classify_failure, || {
        cmd.run_captured(Echo::Always).map(|_| ())
    })?;
    Ok(())
}

/// `apply -auto-approve -var-file=<file>`, retried on transient conflicts.
pub fn apply(stack_dir: &Path, var_file: &Path, env: &TfEnv) -> PilotResult<()> {
    let var_file_name = var_file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| var_file.display().to_string());
    let cmd = terraform(stack_dir, env)
        .args(["apply", "-auto-approve"])
        .arg(format!("-var-file={var_file_name}"));
    APPLY.run(classify_failure, || {
        cmd.run_captured(Echo::Always).map(|_| ())
    })?;
    Ok(())
}

/// `output -json`, parsed into a read-only snapshot.
pub fn output(stack_dir: &Path, env: &TfEnv) -> PilotResult<StackOutputs> {
    let captured = terraform(stack_dir, env)
        .args(["output", "-json"])
        .run_captured(Echo::Never)?;
    StackOutputs::from_json(&captured.stdout)
}
