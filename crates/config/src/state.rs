//! Bundle state store
//!
//! Reads and writes per-bundle option blocks in the `bundle` section of the
//! extension manager configuration. Every write loads the full tree, merges
//! the new options over the stored entry, normalizes and saves the full tree
//! again.

use crate::accessor::ConfigAccessor;
use crate::resolver::OptionsResolver;
use serde_yaml::{Mapping, Value};
use tracing::{debug, info};
use types::utils::{sanitize_for_logging, value_type_name};
use types::{BundleMap, BundleOptions, BundleOptionsInput, OptionsError, Result};

/// Bundle state on top of a configuration accessor
#[derive(Debug)]
pub struct BundleStateStore<A> {
    config: A,
    resolver: OptionsResolver,
}

impl<A: ConfigAccessor> BundleStateStore<A> {
    /// Create a store with the bundle options schema
    pub fn new(config: A) -> Self {
        Self::with_resolver(config, OptionsResolver::bundle_options())
    }

    /// Create a store with an explicit resolver
    pub fn with_resolver(config: A, resolver: OptionsResolver) -> Self {
        Self { config, resolver }
    }

    pub fn config(&self) -> &A {
        &self.config
    }

    pub fn resolver(&self) -> &OptionsResolver {
        &self.resolver
    }

    /// Merge `options` over the stored entry for `bundle` and save the tree.
    ///
    /// Keys present in `options` win. Nothing is saved when normalization
    /// fails.
    pub fn set_state(&self, bundle: &str, options: impl Into<BundleOptionsInput>) -> Result<()> {
        let mut tree = self.config.load_config()?;
        let section = tree.bundle_section_mut()?;

        let key = find_key(section, bundle).unwrap_or_else(|| Value::from(bundle));
        let mut entry = match section.get(&key) {
            Some(existing) => stored_entry(existing)?,
            None => Mapping::new(),
        };

        let options: BundleOptionsInput = options.into();
        for (field, value) in options.into_mapping() {
            entry.insert(field, value);
        }

        let normalized = self.resolver.normalize_bundle(entry)?;
        section.insert(key, Value::Mapping(normalized.to_mapping()));

        self.config.save_config(&tree)?;

        info!(
            bundle = %sanitize_for_logging(bundle),
            enabled = normalized.enabled,
            priority = normalized.priority,
            "Bundle state saved"
        );
        Ok(())
    }

    /// Stored options for a single bundle, if it has an entry
    pub fn get_state(&self, bundle: &str) -> Result<Option<BundleOptions>> {
        let tree = self.config.load_config()?;
        let Some(section) = tree.bundle_section()? else {
            return Ok(None);
        };

        match find_key(section, bundle).and_then(|key| section.get(&key)) {
            Some(raw) => Ok(Some(self.normalize_raw(raw)?)),
            None => Ok(None),
        }
    }

    /// Enabled bundles in stored order
    pub fn get_enabled_bundles(&self) -> Result<BundleMap> {
        let mut bundles = self.get_bundles_from_config()?;
        bundles.retain(|_, options| options.enabled);
        debug!(count = bundles.len(), "Enabled bundles loaded");
        Ok(bundles)
    }

    /// Names of enabled bundles in stored order
    pub fn get_enabled_bundle_names(&self) -> Result<Vec<String>> {
        Ok(self.get_enabled_bundles()?.into_keys().collect())
    }

    /// All configured bundles, enabled or not, in stored order
    pub fn get_all_bundles(&self) -> Result<BundleMap> {
        self.get_bundles_from_config()
    }

    /// Normalize options with the store's resolver
    pub fn normalize_options(&self, options: impl Into<BundleOptionsInput>) -> Result<BundleOptions> {
        Ok(self.resolver.normalize_bundle(options)?)
    }

    fn get_bundles_from_config(&self) -> Result<BundleMap> {
        let tree = self.config.load_config()?;
        let Some(section) = tree.bundle_section()? else {
            return Ok(BundleMap::new());
        };

        let mut bundles = BundleMap::with_capacity(section.len());
        for (name, raw) in section {
            bundles.insert(bundle_name(name), self.normalize_raw(raw)?);
        }
        Ok(bundles)
    }

    fn normalize_raw(&self, raw: &Value) -> Result<BundleOptions> {
        let input = BundleOptionsInput::from_value(raw.clone())?;
        Ok(self.resolver.normalize_bundle(input)?)
    }
}

/// Stored entry as a mapping; a stored bool counts as `{enabled: value}`
fn stored_entry(value: &Value) -> std::result::Result<Mapping, OptionsError> {
    match value {
        Value::Null => Ok(Mapping::new()),
        Value::Bool(_) | Value::Mapping(_) => {
            Ok(BundleOptionsInput::from_value(value.clone())?.into_mapping())
        }
        other => Err(OptionsError::InvalidInput {
            actual: value_type_name(other).to_string(),
        }),
    }
}

/// Stored key for `bundle`; an exact string key wins over a scalar key
/// with the same string form, e.g. `1:` for bundle "1"
fn find_key(section: &Mapping, bundle: &str) -> Option<Value> {
    if section.contains_key(bundle) {
        return Some(Value::from(bundle));
    }
    section.keys().find(|key| bundle_name(key) == bundle).cloned()
}

fn bundle_name(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => types::utils::scalar_to_string(other)
            .unwrap_or_else(|| value_type_name(other).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::MemoryConfig;
    use crate::tree::ConfigTree;
    use types::BundleStateError;

    fn store(yaml: &str) -> BundleStateStore<MemoryConfig> {
        let tree: ConfigTree = serde_yaml::from_str(yaml).unwrap();
        BundleStateStore::new(MemoryConfig::with_tree(tree))
    }

    fn options(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_set_state_creates_section_and_entry() {
        let store = BundleStateStore::new(MemoryConfig::new());
        store.set_state("BlogBundle", true).unwrap();

        let tree = store.config().snapshot();
        assert_eq!(tree.get_path("bundle.BlogBundle.enabled"), Some(&Value::Bool(true)));
        assert_eq!(tree.get_path("bundle.BlogBundle.priority"), Some(&Value::from(0)));
        assert_eq!(
            tree.get_path("bundle.BlogBundle.environments"),
            Some(&Value::Sequence(vec![]))
        );
        assert_eq!(store.config().save_count(), 1);
    }

    #[test]
    fn test_set_state_merges_over_existing_entry() {
        let store = store(
            "bundle:\n  foo:\n    enabled: false\n    priority: 5\n    environments: [prod]\n",
        );
        store.set_state("foo", options("enabled: true")).unwrap();

        assert_eq!(
            store.get_state("foo").unwrap(),
            Some(BundleOptions {
                enabled: true,
                priority: 5,
                environments: vec!["prod".to_string()],
            })
        );
    }

    #[test]
    fn test_set_state_with_flag_keeps_other_fields() {
        let store = store("bundle:\n  foo:\n    enabled: true\n    priority: 9\n");
        store.set_state("foo", false).unwrap();

        let state = store.get_state("foo").unwrap().unwrap();
        assert!(!state.enabled);
        assert_eq!(state.priority, 9);
    }

    #[test]
    fn test_set_state_expands_stored_shorthand() {
        let store = store("bundle:\n  foo: true\n");
        store.set_state("foo", options("priority: 2")).unwrap();

        let state = store.get_state("foo").unwrap().unwrap();
        assert!(state.enabled);
        assert_eq!(state.priority, 2);
    }

    #[test]
    fn test_set_state_keeps_unrelated_sections() {
        let store = store("areas:\n  reports: true\nbundle:\n  a: true\n");
        store.set_state("b", true).unwrap();

        let tree = store.config().snapshot();
        assert_eq!(tree.get_path("areas.reports"), Some(&Value::Bool(true)));
        assert!(tree.get_path("bundle.a").is_some());
        assert!(tree.get_path("bundle.b").is_some());
    }

    #[test]
    fn test_invalid_options_are_not_saved() {
        let store = store("bundle:\n  foo:\n    enabled: true\n");
        let err = store.set_state("foo", options("enabled: \"yes\"")).unwrap_err();

        assert!(matches!(
            err,
            BundleStateError::Options(OptionsError::InvalidOptionType { ref field, .. }) if field == "enabled"
        ));
        assert_eq!(store.config().save_count(), 0);
        assert!(store.get_state("foo").unwrap().unwrap().enabled);
    }

    #[test]
    fn test_disabling_keeps_the_entry() {
        let store = store("bundle:\n  foo: true\n");
        store.set_state("foo", false).unwrap();
        assert_eq!(store.get_state("foo").unwrap(), Some(BundleOptions::default()));
        assert!(store.get_all_bundles().unwrap().contains_key("foo"));
    }

    #[test]
    fn test_enabled_bundles_are_filtered_in_stored_order() {
        let store = store(
            "bundle:\n  c: {enabled: true, priority: 1}\n  b: {enabled: false}\n  a: true\n",
        );

        let enabled = store.get_enabled_bundles().unwrap();
        assert_eq!(enabled.len(), 2);
        assert!(!enabled.contains_key("b"));
        assert_eq!(store.get_enabled_bundle_names().unwrap(), vec!["c", "a"]);
        assert_eq!(store.get_all_bundles().unwrap().len(), 3);
    }

    #[test]
    fn test_no_bundle_section_means_no_bundles() {
        let store = store("areas: {}\n");
        assert!(store.get_enabled_bundles().unwrap().is_empty());
        assert!(store.get_enabled_bundle_names().unwrap().is_empty());
        assert_eq!(store.get_state("missing").unwrap(), None);
    }

    #[test]
    fn test_invalid_stored_entry_fails_reads() {
        let store = store("bundle:\n  broken: \"yes\"\n");
        let err = store.get_enabled_bundles().unwrap_err();
        assert!(matches!(
            err,
            BundleStateError::Options(OptionsError::InvalidInput { ref actual }) if actual == "string"
        ));
    }

    #[test]
    fn test_invalid_section_fails_writes() {
        let store = store("bundle: [a]\n");
        let err = store.set_state("a", true).unwrap_err();
        assert!(matches!(err, BundleStateError::Config(_)));
        assert_eq!(store.config().save_count(), 0);
    }

    #[test]
    fn test_set_state_reuses_numeric_key() {
        let store = store("bundle:\n  1: {enabled: false, priority: 5, environments: [prod]}\n");
        store.set_state("1", true).unwrap();

        assert_eq!(
            store.get_state("1").unwrap(),
            Some(BundleOptions {
                enabled: true,
                priority: 5,
                environments: vec!["prod".to_string()],
            })
        );
        let tree = store.config().snapshot();
        assert_eq!(tree.bundle_section().unwrap().unwrap().len(), 1);
        assert_eq!(store.get_enabled_bundle_names().unwrap(), vec!["1"]);
    }

    #[test]
    fn test_store_works_through_a_reference() {
        let config = MemoryConfig::new();
        let store = BundleStateStore::new(&config);
        store.set_state("a", true).unwrap();
        assert_eq!(config.save_count(), 1);
    }
}
