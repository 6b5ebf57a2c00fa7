//! Provenance-aware secret reconciliation
//!
//! Desired OpenAI secrets are reconciled into the environment's Key Vault.
//! Every write carries a provenance tag: `source=foundry` marks a real
//! provisioned key, `source=pending` a placeholder waiting for one. The
//! decision table never downgrades a real key to a placeholder, and a
//! second run with unchanged inputs writes nothing.

use std::collections::BTreeMap;

use crate::error::PilotResult;
use crate::vault::SecretStore;

/// Value written for secrets that have no provisioned material yet.
pub const PLACEHOLDER_VALUE: &str = "pending-foundry";

/// Fallback secret name when neither provisioned nor expected names exist.
pub const FALLBACK_SECRET_NAME: &str = "azure-openai-key-0";

pub fn foundry_tags() -> BTreeMap<String, String> {
    [("source".to_string(), "foundry".to_string())].into()
}

pub fn placeholder_tags() -> BTreeMap<String, String> {
    [
        ("source".to_string(), "pending".to_string()),
        ("provenance".to_string(), "workload".to_string()),
    ]
    .into()
}

/// Secret names and values the upstream foundry stage provisioned, as two
/// parallel lists read from its outputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionedSecrets {
    pub names: Vec<String>,
    pub values: Vec<String>,
}

/// One reconciliation request.
#[derive(Debug, Clone)]
pub struct SeedRequest<'a> {
    pub vault: &'a str,
    /// Best-effort upstream material; `None` when the foundry stage's state
    /// could not be read.
    pub provisioned: Option<ProvisionedSecrets>,
    pub expected_names: &'a [String],
    pub allow_placeholders: bool,
    pub placeholder_value: &'a str,
}

/// Which names ended up in which bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub seeded: Vec<String>,
    pub placeholders: Vec<String>,
    pub unchanged: Vec<String>,
    pub skipped: Vec<String>,
}

/// Reconcile the desired secrets into the vault.
pub fn seed_secrets(store: &dyn SecretStore, request: &SeedRequest<'_>) -> PilotResult<SeedSummary> {
    let (provisioned_names, provisioned_values) = match &request.provisioned {
        Some(provisioned) => (provisioned.names.clone(), provisioned.values.clone()),
        None => (Vec::new(), Vec::new()),
    };

    let mut candidate_names = if provisioned_names.is_empty() {
        dedupe_preserve_order(request.expected_names)
    } else {
        provisioned_names.clone()
    };
    if candidate_names.is_empty() && request.allow_placeholders {
        candidate_names = vec![FALLBACK_SECRET_NAME.to_string()];
    }
    if candidate_names.is_empty() {
        tracing::info!("no OpenAI secret names to seed; skipping");
        return Ok(SeedSummary::default());
    }

    let has_real_values =
        !provisioned_names.is_empty() && provisioned_names.len() == provisioned_values.len();
    if !provisioned_names.is_empty() && !has_real_values {
        tracing::warn!(
            "provisioned secret name/value counts differ ({} vs {}); treating as unprovisioned",
            provisioned_names.len(),
            provisioned_values.len()
        );
    }

    let desired_tags = if has_real_values {
        foundry_tags()
    } else {
        placeholder_tags()
    };

    let mut summary = SeedSummary::default();
    for (index, name) in candidate_names.iter().enumerate() {
        let desired_value = if has_real_values {
            provisioned_values[index].as_str()
        } else {
            request.placeholder_value
        };

        let existing = store.show(request.vault, name)?;
        let (existing_value, existing_source) = match &existing {
            Some(secret) => (secret.value.as_deref(), secret.source()),
            None => (None, ""),
        };

        if has_real_values
            && existing_source == "foundry"
            && existing_value == Some(desired_value)
        {
            summary.unchanged.push(name.clone());
            continue;
        }
        if !has_real_values && existing_source == "foundry" {
            // Never downgrade a real key to a placeholder.
            summary.skipped.push(name.clone());
            continue;
        }
        if !has_real_values
            && existing_source == "pending"
            && existing_value == Some(desired_value)
        {
            summary.unchanged.push(name.clone());
            continue;
        }

        store.set(request.vault, name, desired_value, &desired_tags)?;
        if has_real_values {
            summary.seeded.push(name.clone());
        } else {
            summary.placeholders.push(name.clone());
        }
    }

    if has_real_values {
        tracing::info!(
            "seeded {} OpenAI secrets into key vault {}",
            summary.seeded.len(),
            request.vault
        );
    } else if request.allow_placeholders {
        tracing::warn!(
            "provisioned OpenAI keys unavailable; wrote {} placeholder secrets to {}",
            summary.placeholders.len(),
            request.vault
        );
    } else {
        tracing::info!("OpenAI placeholders disabled; no secrets written");
    }

    Ok(summary)
}

fn dedupe_preserve_order(names: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut ordered = Vec::new();
    for name in names {
        if seen.insert(name.as_str()) {
            ordered.push(name.clone());
        }
    }
    ordered
}
