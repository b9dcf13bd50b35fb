//! Bundle state configuration for the extension manager
//!
//! This crate normalizes per-bundle option blocks, stores them in the
//! `bundle` section of the extension manager configuration tree and answers
//! which bundles are enabled.

pub mod accessor;
pub mod activation;
pub mod options;
pub mod resolver;
pub mod settings;
pub mod state;
pub mod tree;
pub mod validation;

pub use accessor::{ConfigAccessor, MemoryConfig, YamlFileConfig};
pub use activation::ActivationPlan;
pub use options::{normalize_options, normalize_value};
pub use resolver::{Normalizer, OptionsResolver, ValueKind};
pub use settings::{LoggingSettings, Settings, SettingsLoader};
pub use state::BundleStateStore;
pub use tree::{ConfigTree, BUNDLE_SECTION};
pub use validation::{StateValidator, ValidationIssue, ValidationReport};
