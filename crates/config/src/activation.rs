//! Bundle activation order

use types::{BundleMap, BundleOptions};

/// Ordered list of bundles to activate for one environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationPlan {
    pub environment: String,
    pub bundles: Vec<(String, BundleOptions)>,
}

impl ActivationPlan {
    /// Build the plan from enabled bundles.
    ///
    /// Bundles without environments load everywhere. Higher priority comes
    /// first; equal priorities keep stored order.
    pub fn resolve(enabled: &BundleMap, environment: &str) -> Self {
        let mut bundles: Vec<(String, BundleOptions)> = enabled
            .iter()
            .filter(|(_, options)| options.enabled && options.is_active_in(environment))
            .map(|(name, options)| (name.clone(), options.clone()))
            .collect();

        bundles.sort_by(|(_, a), (_, b)| b.priority.cmp(&a.priority));

        Self {
            environment: environment.to_string(),
            bundles,
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.bundles.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(enabled: bool, priority: i64, environments: &[&str]) -> BundleOptions {
        BundleOptions {
            enabled,
            priority,
            environments: environments.iter().map(|e| e.to_string()).collect(),
        }
    }

    fn bundles() -> BundleMap {
        let mut map = BundleMap::new();
        map.insert("Low".to_string(), bundle(true, -5, &[]));
        map.insert("First".to_string(), bundle(true, 0, &[]));
        map.insert("DevTools".to_string(), bundle(true, 10, &["dev", "test"]));
        map.insert("Second".to_string(), bundle(true, 0, &[]));
        map.insert("Off".to_string(), bundle(false, 100, &[]));
        map
    }

    #[test]
    fn test_priority_descending_with_stable_ties() {
        let plan = ActivationPlan::resolve(&bundles(), "dev");
        assert_eq!(plan.names(), vec!["DevTools", "First", "Second", "Low"]);
        assert_eq!(plan.environment, "dev");
    }

    #[test]
    fn test_environment_filter() {
        let plan = ActivationPlan::resolve(&bundles(), "prod");
        assert_eq!(plan.names(), vec!["First", "Second", "Low"]);
        assert_eq!(plan.len(), 3);
    }

    #[test]
    fn test_disabled_bundles_are_skipped() {
        let mut map = BundleMap::new();
        map.insert("Off".to_string(), bundle(false, 1, &[]));
        assert!(ActivationPlan::resolve(&map, "prod").is_empty());
    }
}
