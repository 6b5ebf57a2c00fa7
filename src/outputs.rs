//! Typed access to a stage's Terraform outputs
//!
//! `terraform output -json` yields `{name: {value: <any>}}`. Outputs are
//! captured once per stage application and read through required/optional
//! accessors; a missing required output is a configuration error naming the
//! output, not a panic.

use serde_json::Value;

use crate::error::{PilotError, PilotResult};

/// Read-only snapshot of one stage's outputs.
#[derive(Debug, Clone, Default)]
pub struct StackOutputs {
    raw: serde_json::Map<String, Value>,
}

impl StackOutputs {
    /// Parse the JSON document printed by `terraform output -json`.
    pub fn from_json(text: &str) -> PilotResult<Self> {
        let raw: serde_json::Map<String, Value> = serde_json::from_str(text)?;
        Ok(Self { raw })
    }

    #[cfg(test)]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(raw) => Self { raw },
            _ => Self::default(),
        }
    }

    fn value(&self, name: &str) -> Option<&Value> {
        match self.raw.get(name)?.get("value") {
            Some(Value::Null) | None => None,
            Some(value) => Some(value),
        }
    }

    /// Output value as text; absent or null is an error naming the output.
    pub fn required(&self, name: &str) -> PilotResult<String> {
        self.value(name)
            .map(value_text)
            .ok_or_else(|| PilotError::MissingOutput {
                name: name.to_string(),
            })
    }

    /// Output value as text, or the empty-string sentinel when absent.
    pub fn optional(&self, name: &str) -> String {
        self.value(name).map(value_text).unwrap_or_default()
    }

    /// List-valued output as strings; absent, null or non-list yields empty.
    pub fn optional_string_list(&self, name: &str) -> Vec<String> {
        match self.value(name) {
            Some(Value::Array(items)) => items.iter().map(value_text).collect(),
            _ => Vec::new(),
        }
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
