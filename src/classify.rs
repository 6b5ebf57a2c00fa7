//! Transient-error classification
//!
//! Azure and the Terraform azurerm backend report transient conditions only
//! through free-form text, so retry eligibility is decided by substring
//! classification over a failed command's captured output. The marker
//! substrings live here as data; the classifier itself is a pure function so
//! every decision is unit-testable without invoking any external tool.

use crate::exec::CommandFailure;

/// Closed set of retry-relevant error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryKind {
    /// Storage data-plane RBAC has not propagated yet (remote state 403s)
    StorageRbacPropagation,
    /// Transient 409 while another control-plane operation holds the parent
    RequestConflict,
    /// Key Vault data-plane RBAC has not propagated yet
    VaultRbacPropagation,
    /// Hard validation or quota failure; retrying can never succeed
    Fatal,
    /// Nothing recognized; treated as non-retryable
    Unclassified,
}

/// Quota and validation failures. Checked before conflict markers: a 409
/// that co-occurs with one of these is not transient.
const FATAL_MARKERS: &[&str] = &[
    "invalidresourceproperties",
    "invalid resource properties",
    "not supported by the model",
    "insufficientquota",
    "insufficient quota",
    "quota limit",
];

const STORAGE_RBAC_MARKERS: &[&str] = &[
    "authorizationpermissionmismatch",
    "this request is not authorized to perform this operation",
    "status 403",
];

const VAULT_RBAC_MARKERS: &[&str] = &["forbiddenbyrbac", "caller is not authorized"];

const CONFLICT_MARKERS: &[&str] = &[
    "requestconflict",
    "another operation is being performed on the parent resource",
    "status code 409",
    "response 409",
];

/// Markers that disqualify a textual 409 from being treated as transient.
const CONFLICT_EXCLUSIONS: &[&str] = &["response 400", "invalidresource", "insufficientquota"];

/// Classify a failed external command by its captured output.
pub fn classify_failure(failure: &CommandFailure) -> RetryKind {
    classify_text(&failure.output_text())
}

/// Classify captured stderr+stdout text.
pub fn classify_text(text: &str) -> RetryKind {
    let lowered = text.to_lowercase();

    if contains_any(&lowered, FATAL_MARKERS) {
        return RetryKind::Fatal;
    }
    // Vault markers first: a Key Vault 403 would otherwise match the
    // storage "status 403" marker and miss the secret-set retry policy.
    if contains_any(&lowered, VAULT_RBAC_MARKERS)
        || (lowered.contains("forbidden") && lowered.contains("keyvault"))
    {
        return RetryKind::VaultRbacPropagation;
    }
    if contains_any(&lowered, STORAGE_RBAC_MARKERS) {
        return RetryKind::StorageRbacPropagation;
    }
    if contains_any(&lowered, CONFLICT_MARKERS) && !contains_any(&lowered, CONFLICT_EXCLUSIONS) {
        return RetryKind::RequestConflict;
    }
    RetryKind::Unclassified
}

fn contains_any(lowered: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| lowered.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_403_classifies_as_rbac_propagation() {
        let text = "Error: retrieving blob: status 403 AuthorizationPermissionMismatch";
        assert_eq!(classify_text(text), RetryKind::StorageRbacPropagation);
    }

    #[test]
    fn unauthorized_operation_message_is_storage_rbac() {
        let text = "This request is not authorized to perform this operation.";
        assert_eq!(classify_text(text), RetryKind::StorageRbacPropagation);
    }

    #[test]
    fn request_conflict_is_retryable() {
        let text = "polling after CreateOrUpdate: Code=\"RequestConflict\"";
        assert_eq!(classify_text(text), RetryKind::RequestConflict);
    }

    #[test]
    fn parent_resource_conflict_is_retryable() {
        let text = "Another operation is being performed on the parent resource";
        assert_eq!(classify_text(text), RetryKind::RequestConflict);
    }

    #[test]
    fn fatal_wins_over_conflict_even_when_both_present() {
        let text = "Code=\"RequestConflict\" ... InsufficientQuota: exceeded";
        assert_eq!(classify_text(text), RetryKind::Fatal);
    }

    #[test]
    fn conflict_with_validation_400_is_not_retryable() {
        let text = "response 400 Code=\"InvalidResource\" plus response 409 noise";
        assert_eq!(classify_text(text), RetryKind::Unclassified);
    }

    #[test]
    fn quota_limit_is_fatal() {
        assert_eq!(
            classify_text("deployment would exceed the quota limit for this region"),
            RetryKind::Fatal
        );
    }

    #[test]
    fn model_validation_is_fatal() {
        assert_eq!(
            classify_text("The capability is not supported by the model"),
            RetryKind::Fatal
        );
    }

    #[test]
    fn vault_rbac_markers_classify() {
        assert_eq!(
            classify_text("Caller is not authorized to perform action"),
            RetryKind::VaultRbacPropagation
        );
        assert_eq!(
            classify_text("ForbiddenByRbac: access denied"),
            RetryKind::VaultRbacPropagation
        );
        assert_eq!(
            classify_text("(Forbidden) operation on KeyVault rejected"),
            RetryKind::VaultRbacPropagation
        );
    }

    #[test]
    fn unrecognized_text_is_unclassified() {
        assert_eq!(classify_text("segmentation fault"), RetryKind::Unclassified);
        assert_eq!(classify_text(""), RetryKind::Unclassified);
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(
            classify_text("STATUS 403 authorizationPERMISSIONmismatch"),
            RetryKind::StorageRbacPropagation
        );
    }
}
