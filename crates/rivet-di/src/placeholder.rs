//! `%dotted.path%` placeholder syntax shared by classification and
//! interpolation.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

/// Matches a string that is exactly one placeholder, capturing the path.
pub(crate) fn exact_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^%([a-z0-9_.]+)%$").expect("Invalid regex"))
}

/// Matches placeholder occurrences embedded anywhere in a string.
pub(crate) fn embedded_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"%([a-z0-9_.]+)%").expect("Invalid regex"))
}

pub(crate) fn is_exact(text: &str) -> bool {
    exact_re().is_match(text)
}

/// The path inside an exact placeholder. Only valid after [`is_exact`].
pub(crate) fn exact_path(text: &str) -> &str {
    &text[1..text.len() - 1]
}

/// String form of a parameter spliced into surrounding text.
pub(crate) fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
