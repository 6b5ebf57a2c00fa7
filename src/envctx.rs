//! Azure identity and child-process environment bindings
//!
//! Cross-stage values reach Terraform through `TF_VAR_*`/`ARM_*` variables
//! in each child invocation's environment. The bindings are carried as an
//! explicit [`TfEnv`] value threaded through the orchestrator and handed to
//! `exec::Cmd`; the orchestrator's own process environment is never mutated.

use std::collections::BTreeMap;

use crate::stacks::{BootstrapState, FoundationState, ObservabilityState};

/// Azure identity for one orchestration run, resolved once up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureContext {
    pub subscription_id: String,
    pub tenant_id: String,
}

/// Environment bindings passed verbatim to every child invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TfEnv {
    vars: BTreeMap<String, String>,
}

impl TfEnv {
    /// Core bindings every stage needs: identity and environment code.
    pub fn core(env_code: &str, ctx: &AzureContext) -> Self {
        let mut env = Self::default();
        env.set("TF_VAR_subscription_id", &ctx.subscription_id);
        env.set("TF_VAR_tenant_id", &ctx.tenant_id);
        env.set("TF_VAR_environment_code", env_code);
        env.set("ARM_SUBSCRIPTION_ID", &ctx.subscription_id);
        env.set("ARM_TENANT_ID", &ctx.tenant_id);
        env
    }

    /// Add the bindings later stages consume from bootstrap + platform
    /// state: remote-state coordinates, registry, vault and identity.
    pub fn with_foundation(
        mut self,
        bootstrap: &BootstrapState,
        foundation: &FoundationState,
    ) -> Self {
        self.set("TF_VAR_location", &foundation.location);
        self.set(
            "TF_VAR_platform_resource_group_name",
            &foundation.platform_resource_group,
        );
        self.set("TF_VAR_platform_acr_name", &foundation.acr_name);
        self.set("TF_VAR_state_resource_group_name", &bootstrap.resource_group);
        self.set("TF_VAR_state_storage_account_name", &bootstrap.storage_account);
        self.set("TF_VAR_state_container_name", &bootstrap.container);
        self.set(
            "TF_VAR_remote_state_resource_group_name",
            &bootstrap.resource_group,
        );
        self.set(
            "TF_VAR_remote_state_storage_account_name",
            &bootstrap.storage_account,
        );
        self.set("TF_VAR_remote_state_container_name", &bootstrap.container);
        self.set(
            "TF_VAR_foundation_state_blob_key",
            &crate::state::state_key(&bootstrap.state_prefix, crate::stacks::PLATFORM),
        );
        self.set("TF_VAR_key_vault_name", &foundation.key_vault_name);
        self.set("TF_VAR_aca_managed_identity_id", &foundation.aca_identity_id);
        self
    }

    /// Add log/metrics endpoints when the observability stage is present.
    pub fn with_observability(mut self, observability: &ObservabilityState) -> Self {
        self.set(
            "TF_VAR_log_analytics_workspace_id",
            &observability.log_analytics_workspace_id,
        );
        self.set(
            "TF_VAR_app_insights_connection_string",
            &observability.app_insights_connection_string,
        );
        self.set(
            "TF_VAR_azure_monitor_workspace_id",
            &observability.azure_monitor_workspace_id,
        );
        self.set(
            "TF_VAR_prometheus_remote_write_endpoint",
            &observability.prometheus_remote_write_endpoint,
        );
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn unset(&mut self, key: &str) {
        self.vars.remove(key);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
