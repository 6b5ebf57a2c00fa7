//! Property tests for remote state addressing.

use proptest::prelude::*;

use tfpilot::{state_key, state_prefix_from_blob};

fn prefix_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z0-9-]{1,8}(/[a-z0-9-]{1,8}){0,3}").unwrap()
}

fn stage_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[0-9]{2}-[a-z]{1,12}").unwrap()
}

proptest! {
    /// PROPERTY: trailing slashes on the prefix never change the key.
    #[test]
    fn trailing_slash_is_normalized(prefix in prefix_strategy(), stage in stage_strategy()) {
        prop_assert_eq!(
            state_key(&format!("{prefix}/"), &stage),
            state_key(&prefix, &stage)
        );
    }

    /// PROPERTY: every key ends in `<stage>.tfstate`.
    #[test]
    fn keys_end_with_the_stage_name(prefix in prefix_strategy(), stage in stage_strategy()) {
        let key = state_key(&prefix, &stage);
        let suffix = format!("{}.tfstate", stage);
        prop_assert!(key.ends_with(&suffix));
        prop_assert!(key.starts_with(&prefix));
    }

    /// PROPERTY: the bootstrap blob convention inverts back to its prefix.
    #[test]
    fn bootstrap_blob_round_trips(prefix in prefix_strategy()) {
        let blob = format!("{prefix}/terraform.tfstate");
        prop_assert_eq!(state_prefix_from_blob(&blob), prefix);
    }

    /// PROPERTY: stage keys are NOT decomposable; only the bootstrap
    /// convention is. This asymmetry is intentional.
    #[test]
    fn stage_keys_pass_through_prefix_recovery(
        prefix in prefix_strategy(),
        stage in stage_strategy()
    ) {
        let key = state_key(&prefix, &stage);
        prop_assert_eq!(state_prefix_from_blob(&key), key.clone());
    }

    /// PROPERTY: both functions are total over arbitrary input.
    #[test]
    fn addressing_never_panics(text in ".{0,64}") {
        let _ = state_key(&text, "00-bootstrap");
        let _ = state_prefix_from_blob(&text);
    }
}
