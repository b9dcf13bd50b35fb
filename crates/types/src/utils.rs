//! Utility functions and helpers

use serde_yaml::Value;

/// Runtime type name of a configuration value, used in error messages
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged",
    }
}

/// String form of a scalar value.
///
/// `true` becomes `"1"`, `false` and `null` become `""`. Sequences, mappings
/// and tagged values have no string form and yield `None`.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(true) => Some("1".to_string()),
        Value::Bool(false) => Some(String::new()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => None,
    }
}

/// Shorten a value for log output
pub fn sanitize_for_logging(s: &str) -> String {
    if s.len() <= 32 {
        s.to_string()
    } else {
        let cut = s
            .char_indices()
            .map(|(i, _)| i)
            .take_while(|i| *i <= 29)
            .last()
            .unwrap_or(0);
        format!("{}...", &s[..cut])
    }
}
