//! Azure identity resolution
//!
//! Identity is delegated to the external `az` CLI; tfpilot resolves the
//! active subscription and tenant once per run and threads them through as
//! an explicit context value.

use crate::envctx::AzureContext;
use crate::error::PilotResult;
use crate::exec::{Cmd, Echo};

/// Resolve the active subscription and tenant from the `az` CLI.
pub fn azure_context() -> PilotResult<AzureContext> {
    Ok(AzureContext {
        subscription_id: account_field("id")?,
        tenant_id: account_field("tenantId")?,
    })
}

fn account_field(query: &str) -> PilotResult<String> {
    let output = Cmd::new("az")
        .args(["account", "show", "--query", query, "-o", "tsv"])
        .run_captured(Echo::OnError)?;
    Ok(output.stdout.trim().to_string())
}
