//! Options resolver
//!
//! A small schema for option mappings: ordered defaults, required keys,
//! allowed value kinds and per-key normalizers. Resolution rejects unknown
//! keys, fills defaults, type-checks and then normalizes, in that order.

use serde_yaml::{Mapping, Value};
use std::collections::HashMap;
use types::utils::value_type_name;
use types::OptionsError;

/// Per-key value rewrite applied after type checking
pub type Normalizer = fn(&str, Value) -> Result<Value, OptionsError>;

/// Kind of value an option accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    String,
    Sequence,
    Mapping,
}

impl ValueKind {
    /// Whether `value` is of this kind
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Null => value.is_null(),
            Self::Bool => value.is_bool(),
            Self::Int => value.as_i64().is_some(),
            Self::Float => value.is_f64(),
            Self::String => value.is_string(),
            Self::Sequence => value.is_sequence(),
            Self::Mapping => value.is_mapping(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Sequence => "sequence",
            Self::Mapping => "mapping",
        }
    }
}

/// Schema-driven resolver for option mappings
#[derive(Debug, Clone, Default)]
pub struct OptionsResolver {
    defined: Vec<String>,
    defaults: Mapping,
    required: Vec<String>,
    allowed_kinds: HashMap<String, Vec<ValueKind>>,
    normalizers: HashMap<String, Normalizer>,
}

impl OptionsResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define `key` with a default value
    pub fn with_default(mut self, key: &str, value: Value) -> Self {
        self.define(key);
        self.defaults.insert(Value::from(key), value);
        self
    }

    /// Mark `key` as required in the resolved result
    pub fn with_required(mut self, key: &str) -> Self {
        self.define(key);
        if !self.required.iter().any(|k| k == key) {
            self.required.push(key.to_string());
        }
        self
    }

    /// Restrict `key` to the given kinds
    pub fn with_allowed_kinds(mut self, key: &str, kinds: &[ValueKind]) -> Self {
        self.define(key);
        self.allowed_kinds.insert(key.to_string(), kinds.to_vec());
        self
    }

    /// Rewrite the value of `key` after type checking
    pub fn with_normalizer(mut self, key: &str, normalizer: Normalizer) -> Self {
        self.define(key);
        self.normalizers.insert(key.to_string(), normalizer);
        self
    }

    /// Defined option keys in declaration order
    pub fn defined_options(&self) -> &[String] {
        &self.defined
    }

    pub fn is_required(&self, key: &str) -> bool {
        self.required.iter().any(|k| k == key)
    }

    /// Resolve `options` against the schema.
    ///
    /// The result contains every defined key that has a value or default,
    /// in declaration order.
    pub fn resolve(&self, options: Mapping) -> Result<Mapping, OptionsError> {
        for key in options.keys() {
            let known = key
                .as_str()
                .map(|k| self.defined.iter().any(|d| d == k))
                .unwrap_or(false);
            if !known {
                return Err(OptionsError::UndefinedOption {
                    field: describe_key(key),
                    defined: self.defined_list(),
                });
            }
        }

        let mut resolved = Mapping::new();
        for key in &self.defined {
            let value = options
                .get(key.as_str())
                .or_else(|| self.defaults.get(key.as_str()))
                .cloned();

            let value = match value {
                Some(value) => value,
                None if self.is_required(key) => {
                    return Err(OptionsError::MissingOption { field: key.clone() });
                }
                None => continue,
            };

            self.check_kind(key, &value)?;

            let value = match self.normalizers.get(key) {
                Some(normalize) => normalize(key, value)?,
                None => value,
            };

            resolved.insert(Value::from(key.as_str()), value);
        }

        Ok(resolved)
    }

    fn check_kind(&self, key: &str, value: &Value) -> Result<(), OptionsError> {
        let Some(kinds) = self.allowed_kinds.get(key) else {
            return Ok(());
        };

        if kinds.iter().any(|kind| kind.matches(value)) {
            return Ok(());
        }

        Err(OptionsError::InvalidOptionType {
            field: key.to_string(),
            expected: kinds
                .iter()
                .map(ValueKind::name)
                .collect::<Vec<_>>()
                .join("\" or \""),
            actual: value_type_name(value).to_string(),
        })
    }

    fn define(&mut self, key: &str) {
        if !self.defined.iter().any(|k| k == key) {
            self.defined.push(key.to_string());
        }
    }

    fn defined_list(&self) -> String {
        self.defined
            .iter()
            .map(|k| format!("\"{}\"", k))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn describe_key(key: &Value) -> String {
    match key.as_str() {
        Some(s) => s.to_string(),
        None => serde_yaml::to_string(key)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_else(|_| value_type_name(key).to_string()),
    }
}
