//! Stack layout and typed cross-stage state
//!
//! The pipeline is a fixed, hand-specified sequence of stages, each a
//! directory of declarative infrastructure with its own backend state.
//! Stage outputs are captured into small typed structs that later stages
//! consume as hard inputs.

use std::path::{Path, PathBuf};

use crate::error::PilotResult;
use crate::outputs::StackOutputs;
use crate::state::state_prefix_from_blob;

pub const BOOTSTRAP: &str = "00-bootstrap";
pub const OBSERVABILITY: &str = "05-observability";
pub const PLATFORM: &str = "10-platform";
pub const FOUNDRY: &str = "15-foundry";
pub const WORKLOAD: &str = "20-workload";

/// Resolved stage directories for one repository checkout.
#[derive(Debug, Clone)]
pub struct StackPaths {
    pub root: PathBuf,
    pub bootstrap: PathBuf,
    pub observability: PathBuf,
    pub foundation: PathBuf,
    pub foundry: PathBuf,
    pub workload: PathBuf,
}

impl StackPaths {
    pub fn resolve(root: &Path, stacks_dir: &Path) -> Self {
        let stacks = root.join(stacks_dir);
        Self {
            root: root.to_path_buf(),
            bootstrap: stacks.join(BOOTSTRAP),
            observability: stacks.join(OBSERVABILITY),
            foundation: stacks.join(PLATFORM),
            foundry: stacks.join(FOUNDRY),
            workload: stacks.join(WORKLOAD),
        }
    }

    /// Local backend state file for the bootstrap stage.
    pub fn bootstrap_state_file(&self, env: &str) -> PathBuf {
        self.bootstrap.join(".state").join(env).join("bootstrap.tfstate")
    }
}

/// Remote-state coordinates produced by the bootstrap stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapState {
    pub resource_group: String,
    pub storage_account: String,
    pub container: String,
    pub state_prefix: String,
}

impl BootstrapState {
    pub fn from_outputs(outputs: &StackOutputs) -> PilotResult<Self> {
        let blob_key = outputs.required("state_blob_key")?;
        Ok(Self {
            resource_group: outputs.required("state_rg_name")?,
            storage_account: outputs.required("storage_account_name")?,
            container: outputs.required("state_container_name")?,
            state_prefix: state_prefix_from_blob(&blob_key),
        })
    }
}

/// Registry, vault and identity coordinates produced by the platform stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundationState {
    pub location: String,
    pub platform_resource_group: String,
    pub acr_name: String,
    pub key_vault_name: String,
    pub aca_identity_id: String,
}

impl FoundationState {
    pub fn from_outputs(outputs: &StackOutputs) -> PilotResult<Self> {
        Ok(Self {
            location: outputs.required("location")?,
            platform_resource_group: outputs.required("platform_resource_group_name")?,
            acr_name: outputs.required("platform_acr_name")?,
            key_vault_name: outputs.optional("key_vault_name"),
            aca_identity_id: outputs.optional("aca_managed_identity_id"),
        })
    }
}

/// Log/metrics endpoints produced by the optional observability stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityState {
    pub location: String,
    pub resource_group: String,
    pub log_analytics_workspace_id: String,
    pub app_insights_connection_string: String,
    pub azure_monitor_workspace_id: String,
    pub prometheus_remote_write_endpoint: String,
}

impl ObservabilityState {
    pub fn from_outputs(outputs: &StackOutputs) -> PilotResult<Self> {
        Ok(Self {
            location: outputs.required("location")?,
            resource_group: outputs.required("observability_rg_name")?,
            log_analytics_workspace_id: outputs.required("log_analytics_workspace_id")?,
            app_insights_connection_string: outputs.optional("app_insights_connection_string"),
            azure_monitor_workspace_id: outputs.required("azure_monitor_workspace_id")?,
            prometheus_remote_write_endpoint: outputs
                .optional("azure_monitor_prometheus_remote_write_endpoint"),
        })
    }
}

/// Whether the optional foundry stage is provisioned, and where its state
/// lives when it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundryState {
    pub provisioned: bool,
    pub state_blob_key: Option<String>,
}

impl FoundryState {
    pub fn absent() -> Self {
        Self {
            provisioned: false,
            state_blob_key: None,
        }
    }

    pub fn provisioned_at(state_blob_key: impl Into<String>) -> Self {
        Self {
            provisioned: true,
            state_blob_key: Some(state_blob_key.into()),
        }
    }
}
