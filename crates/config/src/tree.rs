//! Configuration tree wrapper

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use types::utils::value_type_name;
use types::ConfigError;

/// Name of the section holding per-bundle options
pub const BUNDLE_SECTION: &str = "bundle";

/// Insertion-ordered configuration document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigTree {
    root: Mapping,
}

impl ConfigTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_mapping(root: Mapping) -> Self {
        Self { root }
    }

    /// Top-level value for `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    /// Set a top-level value, returning the previous one
    pub fn insert(&mut self, key: &str, value: Value) -> Option<Value> {
        self.root.insert(Value::from(key), value)
    }

    /// Dotted lookup, e.g. `bundle.BlogBundle.enabled`
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.root.get(segments.next()?)?;
        for segment in segments {
            current = current.as_mapping()?.get(segment)?;
        }
        Some(current)
    }

    /// The bundle section, if present.
    ///
    /// A `null` section counts as absent.
    pub fn bundle_section(&self) -> Result<Option<&Mapping>, ConfigError> {
        match self.root.get(BUNDLE_SECTION) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Mapping(section)) => Ok(Some(section)),
            Some(other) => Err(invalid_section(other)),
        }
    }

    /// The bundle section, created empty when absent
    pub fn bundle_section_mut(&mut self) -> Result<&mut Mapping, ConfigError> {
        let key = Value::from(BUNDLE_SECTION);
        let missing = match self.root.get(&key) {
            None | Some(Value::Null) => true,
            Some(Value::Mapping(_)) => false,
            Some(other) => return Err(invalid_section(other)),
        };
        if missing {
            self.root.insert(key.clone(), Value::Mapping(Mapping::new()));
        }

        match self.root.get_mut(&key) {
            Some(Value::Mapping(section)) => Ok(section),
            _ => Err(ConfigError::InvalidSection {
                section: BUNDLE_SECTION.to_string(),
                actual: "null".to_string(),
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Plain nested mapping view
    pub fn to_mapping(&self) -> &Mapping {
        &self.root
    }

    pub fn into_mapping(self) -> Mapping {
        self.root
    }
}

fn invalid_section(value: &Value) -> ConfigError {
    ConfigError::InvalidSection {
        section: BUNDLE_SECTION.to_string(),
        actual: value_type_name(value).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(yaml: &str) -> ConfigTree {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_missing_bundle_section() {
        let tree = tree("other: 1");
        assert!(tree.bundle_section().unwrap().is_none());
    }

    #[test]
    fn test_null_bundle_section_counts_as_absent() {
        let tree = tree("bundle: ~");
        assert!(tree.bundle_section().unwrap().is_none());
    }

    #[test]
    fn test_bundle_section_must_be_mapping() {
        let mut tree = tree("bundle: [a, b]");
        let err = tree.bundle_section().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSection { actual, .. } if actual == "sequence"));
        assert!(tree.bundle_section_mut().is_err());
    }

    #[test]
    fn test_bundle_section_mut_creates_section() {
        let mut tree = ConfigTree::new();
        tree.bundle_section_mut()
            .unwrap()
            .insert(Value::from("Blog"), Value::Bool(true));
        assert_eq!(tree.get_path("bundle.Blog"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_get_path() {
        let tree = tree("bundle:\n  Blog:\n    enabled: true\n    priority: 4\n");
        assert_eq!(tree.get_path("bundle.Blog.priority"), Some(&Value::from(4)));
        assert!(tree.get_path("bundle.Blog.missing").is_none());
        assert!(tree.get_path("bundle.Blog.priority.deeper").is_none());
        assert!(tree.get("bundle").is_some());
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let tree = tree("zeta: 1\nalpha: 2\nbundle: {}\n");
        let keys: Vec<_> = tree.to_mapping().keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "bundle"]);
    }
}
