//! Property tests for transient-error classification.

use proptest::prelude::*;

use tfpilot::{classify_text, RetryKind};

/// Randomize the case of every character in `text`.
fn randomize_case(text: &str, flips: &[bool]) -> String {
    text.chars()
        .zip(flips.iter().cycle())
        .map(|(ch, flip)| {
            if *flip {
                ch.to_ascii_uppercase()
            } else {
                ch.to_ascii_lowercase()
            }
        })
        .collect()
}

proptest! {
    /// PROPERTY: classification is total; arbitrary tool output never
    /// panics.
    #[test]
    fn classify_never_panics(text in ".{0,256}") {
        let _ = classify_text(&text);
    }

    /// PROPERTY: fatal markers win over conflict markers regardless of
    /// surrounding noise or ordering.
    #[test]
    fn fatal_precedence_over_conflict(
        prefix in "[ -~]{0,32}",
        middle in "[ -~]{0,32}",
        suffix in "[ -~]{0,32}",
        conflict_first in any::<bool>(),
    ) {
        let (first, second) = if conflict_first {
            ("RequestConflict", "InsufficientQuota")
        } else {
            ("InsufficientQuota", "RequestConflict")
        };
        let text = format!("{prefix}{first}{middle}{second}{suffix}");
        prop_assert_eq!(classify_text(&text), RetryKind::Fatal);
    }

    /// PROPERTY: storage RBAC markers classify under any casing.
    #[test]
    fn storage_rbac_is_case_insensitive(flips in proptest::collection::vec(any::<bool>(), 1..40)) {
        let text = randomize_case("AuthorizationPermissionMismatch after status 403", &flips);
        prop_assert_eq!(classify_text(&text), RetryKind::StorageRbacPropagation);
    }

    /// PROPERTY: a 409 alongside a validation 400 is never retryable.
    #[test]
    fn conflict_with_400_is_excluded(noise in "[ -~]{0,48}") {
        let text = format!("response 409 {noise} response 400");
        prop_assert_eq!(classify_text(&text), RetryKind::Unclassified);
    }
}
