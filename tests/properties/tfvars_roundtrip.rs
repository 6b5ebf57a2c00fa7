//! Property tests for the tfvars document model.

use proptest::prelude::*;

use tfpilot::tfvars::{parse_str, render};
use tfpilot::{Document, TfValue};

fn key_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z_][a-z0-9_-]{0,11}").unwrap()
}

fn scalar_strategy() -> impl Strategy<Value = TfValue> {
    prop_oneof![
        any::<bool>().prop_map(TfValue::Bool),
        any::<i64>().prop_map(TfValue::Int),
        any::<f64>()
            .prop_filter("finite", |f| f.is_finite())
            .prop_map(TfValue::Float),
        "(?s).{0,24}".prop_map(TfValue::String),
    ]
}

fn value_strategy() -> impl Strategy<Value = TfValue> + Clone {
    scalar_strategy().prop_recursive(3, 24, 5, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..5).prop_map(TfValue::List),
            document_strategy_of(inner).prop_map(TfValue::Map),
        ]
    })
}

fn document_strategy_of(
    value: impl Strategy<Value = TfValue> + Clone,
) -> impl Strategy<Value = Document> {
    proptest::collection::vec((key_strategy(), value), 0..6)
        .prop_map(|entries| entries.into_iter().collect())
}

fn document_strategy() -> impl Strategy<Value = Document> {
    document_strategy_of(value_strategy())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: `parse_str(render(doc))` reproduces the document for every
    /// value the model can hold, including strings that need escaping and
    /// nested structures.
    #[test]
    fn render_round_trips(doc in document_strategy()) {
        let rendered = render(&doc);
        let reparsed = parse_str(&rendered)
            .map_err(|err| TestCaseError::fail(format!("{err}\n---\n{rendered}")))?;
        prop_assert_eq!(reparsed, doc);
    }

    /// PROPERTY: merging updates U into document D leaves every key of
    /// D not in U unchanged and sets every key of U to U's value.
    #[test]
    fn merge_is_key_preserving(base in document_strategy(), updates in document_strategy()) {
        let mut merged = base.clone();
        merged.merge_update(&updates);

        for (key, value) in base.iter() {
            if updates.get(key).is_none() {
                prop_assert_eq!(merged.get(key), Some(value));
            }
        }
        for (key, value) in updates.iter() {
            prop_assert_eq!(merged.get(key), Some(value));
        }
    }

    /// PROPERTY: merging never loses keys.
    #[test]
    fn merge_never_drops_keys(base in document_strategy(), updates in document_strategy()) {
        let mut merged = base.clone();
        merged.merge_update(&updates);
        for (key, _) in base.iter().chain(updates.iter()) {
            prop_assert!(merged.contains_key(key));
        }
    }

    /// PROPERTY: the parser is total — arbitrary text either parses or
    /// errors, it never panics.
    #[test]
    fn parser_never_panics(text in ".{0,256}") {
        let _ = parse_str(&text);
    }
}
