//! Bundle section validation
//!
//! Unlike the store, which fails on the first bad entry, the validator walks
//! the whole `bundle` section and collects every problem.

use crate::resolver::OptionsResolver;
use crate::tree::{ConfigTree, BUNDLE_SECTION};
use serde_yaml::Value;
use std::collections::{HashMap, HashSet};
use types::utils::value_type_name;
use types::{BundleOptions, BundleOptionsInput};

/// Bundle section validator
pub struct StateValidator;

impl StateValidator {
    /// Validate the bundle section of `tree`
    pub fn validate(tree: &ConfigTree, resolver: &OptionsResolver) -> ValidationReport {
        let mut report = ValidationReport::new();

        let section = match tree.bundle_section() {
            Ok(Some(section)) => section,
            Ok(None) => return report,
            Err(e) => {
                report.add_error(BUNDLE_SECTION, &e.to_string());
                return report;
            }
        };

        let mut normalized = Vec::with_capacity(section.len());
        for (key, raw) in section {
            let Some(name) = key.as_str() else {
                report.add_error(
                    BUNDLE_SECTION,
                    &format!("Bundle name must be a string, got {}", value_type_name(key)),
                );
                continue;
            };
            let field = format!("{}.{}", BUNDLE_SECTION, name);

            if name.is_empty() {
                report.add_error(&field, "Bundle name cannot be empty");
            }

            if let Some(options) = Self::validate_entry(&field, raw, resolver, &mut report) {
                normalized.push((name.to_string(), options));
            }
        }

        Self::validate_priorities(&normalized, &mut report);

        report
    }

    fn validate_entry(
        field: &str,
        raw: &Value,
        resolver: &OptionsResolver,
        report: &mut ValidationReport,
    ) -> Option<BundleOptions> {
        if raw.is_bool() {
            report.add_warning(field, "Entry uses bool shorthand, it is expanded on the next write");
        }

        let options = match BundleOptionsInput::from_value(raw.clone())
            .and_then(|input| resolver.normalize_bundle(input))
        {
            Ok(options) => options,
            Err(e) => {
                report.add_error(field, &e.to_string());
                return None;
            }
        };

        let mut seen = HashSet::new();
        for environment in &options.environments {
            if environment.is_empty() {
                report.add_warning(
                    &format!("{}.environments", field),
                    "Empty environment name never matches an environment",
                );
            } else if !seen.insert(environment.as_str()) {
                report.add_warning(
                    &format!("{}.environments", field),
                    &format!("Duplicate environment: {}", environment),
                );
            }
        }

        Some(options)
    }

    fn validate_priorities(bundles: &[(String, BundleOptions)], report: &mut ValidationReport) {
        let mut by_priority: HashMap<i64, Vec<&str>> = HashMap::new();
        for (name, options) in bundles.iter().filter(|(_, o)| o.enabled) {
            by_priority.entry(options.priority).or_default().push(name);
        }

        let mut shared: Vec<_> = by_priority
            .into_iter()
            .filter(|(_, names)| names.len() > 1)
            .collect();
        shared.sort_by(|(a, _), (b, _)| b.cmp(a));

        for (priority, names) in shared {
            report.add_warning(
                BUNDLE_SECTION,
                &format!(
                    "Enabled bundles {} share priority {}, activation order follows stored order",
                    names.join(", "),
                    priority
                ),
            );
        }
    }
}

/// Validation report containing errors and warnings
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

/// A validation issue (error or warning)
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors.push(ValidationIssue {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    pub fn summary(&self) -> String {
        format!("Validation: {} errors, {} warnings", self.errors.len(), self.warnings.len())
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(yaml: &str) -> ValidationReport {
        let tree: ConfigTree = serde_yaml::from_str(yaml).unwrap();
        StateValidator::validate(&tree, &OptionsResolver::bundle_options())
    }

    #[test]
    fn test_clean_section() {
        let report = validate(
            "bundle:\n  a: {enabled: true, priority: 2, environments: [prod]}\n  b: {enabled: true, priority: 1}\n",
        );
        assert!(report.is_valid());
        assert!(!report.has_warnings());
        assert_eq!(report.summary(), "Validation: 0 errors, 0 warnings");
    }

    #[test]
    fn test_missing_section_is_valid() {
        assert!(validate("other: 1\n").is_valid());
    }

    #[test]
    fn test_collects_every_bad_entry() {
        let report = validate("bundle:\n  a: \"yes\"\n  b: {enabled: 1}\n  c: {colour: red}\n  d: true\n");
        assert_eq!(report.errors.len(), 3);
        assert_eq!(report.errors[0].field, "bundle.a");
        assert_eq!(report.errors[1].field, "bundle.b");
        assert_eq!(report.errors[2].field, "bundle.c");
        assert!(report.warnings.iter().any(|w| w.field == "bundle.d"));
    }

    #[test]
    fn test_invalid_section() {
        let report = validate("bundle: 3\n");
        assert!(report.has_errors());
        assert_eq!(report.errors[0].field, "bundle");
    }

    #[test]
    fn test_environment_warnings() {
        let report = validate("bundle:\n  a: {environments: [prod, prod, false]}\n");
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 2);
        assert!(report.warnings.iter().all(|w| w.field == "bundle.a.environments"));
    }

    #[test]
    fn test_shared_priority_warning() {
        let report = validate("bundle:\n  a: true\n  b: {enabled: true}\n  c: {enabled: false}\n");
        let shared: Vec<_> = report
            .warnings
            .iter()
            .filter(|w| w.field == "bundle")
            .collect();
        assert_eq!(shared.len(), 1);
        assert!(shared[0].message.contains("a, b"));
        assert!(shared[0].message.contains("priority 0"));
    }
}
