//! Bundle option types

use crate::error::OptionsError;
use crate::utils::value_type_name;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Number, Value};

/// Option key for the enabled flag
pub const OPTION_ENABLED: &str = "enabled";
/// Option key for the activation priority
pub const OPTION_PRIORITY: &str = "priority";
/// Option key for the environment list
pub const OPTION_ENVIRONMENTS: &str = "environments";

/// Ordered map of bundle name to its normalized options
pub type BundleMap = IndexMap<String, BundleOptions>;

/// Normalized options block of a single bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleOptions {
    /// Whether the bundle is activated
    pub enabled: bool,
    /// Activation priority, higher runs first
    pub priority: i64,
    /// Environments the bundle is restricted to; empty means all
    pub environments: Vec<String>,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            priority: 0,
            environments: Vec::new(),
        }
    }
}

impl BundleOptions {
    /// Mapping form with keys in canonical order
    pub fn to_mapping(&self) -> Mapping {
        let mut mapping = Mapping::new();
        mapping.insert(Value::from(OPTION_ENABLED), Value::Bool(self.enabled));
        mapping.insert(
            Value::from(OPTION_PRIORITY),
            Value::Number(Number::from(self.priority)),
        );
        mapping.insert(
            Value::from(OPTION_ENVIRONMENTS),
            Value::Sequence(
                self.environments
                    .iter()
                    .cloned()
                    .map(Value::String)
                    .collect(),
            ),
        );
        mapping
    }

    /// Whether the bundle should be loaded in `environment`
    pub fn is_active_in(&self, environment: &str) -> bool {
        self.environments.is_empty() || self.environments.iter().any(|e| e == environment)
    }
}

/// Raw options as handed in by a caller or read from the tree
#[derive(Debug, Clone, PartialEq)]
pub enum BundleOptionsInput {
    /// Shorthand for `{enabled: value}`
    Flag(bool),
    /// Partial or complete options mapping
    Map(Mapping),
}

impl BundleOptionsInput {
    /// Classify a raw value, rejecting anything but a bool or a mapping
    pub fn from_value(value: Value) -> Result<Self, OptionsError> {
        match value {
            Value::Bool(flag) => Ok(Self::Flag(flag)),
            Value::Mapping(mapping) => Ok(Self::Map(mapping)),
            other => Err(OptionsError::InvalidInput {
                actual: value_type_name(&other).to_string(),
            }),
        }
    }

    /// Expand to mapping form
    pub fn into_mapping(self) -> Mapping {
        match self {
            Self::Flag(enabled) => {
                let mut mapping = Mapping::new();
                mapping.insert(Value::from(OPTION_ENABLED), Value::Bool(enabled));
                mapping
            }
            Self::Map(mapping) => mapping,
        }
    }
}

impl From<bool> for BundleOptionsInput {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

impl From<Mapping> for BundleOptionsInput {
    fn from(mapping: Mapping) -> Self {
        Self::Map(mapping)
    }
}

impl From<&BundleOptions> for BundleOptionsInput {
    fn from(options: &BundleOptions) -> Self {
        Self::Map(options.to_mapping())
    }
}

impl From<BundleOptions> for BundleOptionsInput {
    fn from(options: BundleOptions) -> Self {
        Self::Map(options.to_mapping())
    }
}

impl TryFrom<Value> for BundleOptionsInput {
    type Error = OptionsError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}
