//! Remote state blob addressing
//!
//! Every stage's backend state blob key is a pure function of the shared
//! state prefix and the stage name. The bootstrap stage is the exception:
//! its own blob follows the `terraform.tfstate` convention because it is
//! discovered by convention before any other state exists. The two naming
//! schemes are deliberate and must not be unified.

/// Blob key for a stage's backend state: `<prefix>/<stage>.tfstate`, or
/// `<stage>.tfstate` when the prefix is empty. Trailing slashes on the
/// prefix are ignored.
pub fn state_key(prefix: &str, stage: &str) -> String {
    let normalized = prefix.trim_end_matches('/');
    if normalized.is_empty() {
        format!("{stage}.tfstate")
    } else {
        format!("{normalized}/{stage}.tfstate")
    }
}

/// Shared state prefix recovered from the bootstrap stage's own blob key.
///
/// Only a key ending in `/terraform.tfstate` is decomposable; anything else
/// is returned unchanged.
pub fn state_prefix_from_blob(blob_key: &str) -> String {
    match blob_key.strip_suffix("/terraform.tfstate") {
        Some(prefix) => prefix.to_string(),
        None => blob_key.to_string(),
    }
}
