//! Deterministic tfvars rendering
//!
//! Booleans render bare, numbers as literals, strings JSON-quoted, lists
//! bracketed on one line, nested maps as brace blocks indented two spaces
//! per level. Output is not byte-identical to hand-authored files but
//! reparses to the same logical document.

use std::fmt::Write;

use super::{Document, TfValue};

/// Render a document to the persisted file form.
pub fn render(doc: &Document) -> String {
    let mut out = String::new();
    for (key, value) in doc.iter() {
        let _ = writeln!(out, "{key} = {}", format_value(value, 0));
    }
    out
}

fn format_value(value: &TfValue, indent: usize) -> String {
    match value {
        TfValue::Bool(true) => "true".to_string(),
        TfValue::Bool(false) => "false".to_string(),
        TfValue::Int(number) => number.to_string(),
        TfValue::Float(number) => format_float(*number),
        TfValue::String(text) => quote_string(text),
        TfValue::List(items) => {
            let inner: Vec<String> = items.iter().map(|item| format_value(item, indent)).collect();
            format!("[{}]", inner.join(", "))
        }
        TfValue::Map(entries) => {
            let pad = "  ".repeat(indent);
            let mut block = String::from("{");
            for (key, value) in entries.iter() {
                let _ = write!(block, "\n{pad}  {key} = {}", format_value(value, indent + 1));
            }
            let _ = write!(block, "\n{pad}}}");
            block
        }
    }
}

fn format_float(number: f64) -> String {
    if number.fract() == 0.0 && number.is_finite() {
        format!("{number:.1}")
    } else {
        number.to_string()
    }
}

fn quote_string(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for ch in text.chars() {
        match ch {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            '\r' => quoted.push_str("\\r"),
            control if (control as u32) < 0x20 => {
                let _ = write!(quoted, "\\u{:04x}", control as u32);
            }
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}
