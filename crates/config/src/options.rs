//! Bundle options schema and normalization

use crate::resolver::{OptionsResolver, ValueKind};
use serde_yaml::{Mapping, Value};
use tracing::trace;
use types::utils::{scalar_to_string, value_type_name};
use types::{
    BundleOptions, BundleOptionsInput, OptionsError, OPTION_ENABLED, OPTION_ENVIRONMENTS,
    OPTION_PRIORITY,
};

impl OptionsResolver {
    /// Resolver for bundle option blocks
    pub fn bundle_options() -> Self {
        OptionsResolver::new()
            .with_default(OPTION_ENABLED, Value::Bool(false))
            .with_default(OPTION_PRIORITY, Value::from(0))
            .with_default(OPTION_ENVIRONMENTS, Value::Sequence(Vec::new()))
            .with_required(OPTION_ENABLED)
            .with_required(OPTION_PRIORITY)
            .with_required(OPTION_ENVIRONMENTS)
            .with_allowed_kinds(OPTION_ENABLED, &[ValueKind::Bool])
            .with_allowed_kinds(OPTION_PRIORITY, &[ValueKind::Int])
            .with_allowed_kinds(OPTION_ENVIRONMENTS, &[ValueKind::Sequence])
            .with_normalizer(OPTION_ENVIRONMENTS, stringify_environments)
    }

    /// Normalize bundle options with this resolver
    pub fn normalize_bundle(
        &self,
        options: impl Into<BundleOptionsInput>,
    ) -> Result<BundleOptions, OptionsError> {
        let options: BundleOptionsInput = options.into();
        let resolved = self.resolve(options.into_mapping())?;
        trace!(?resolved, "Resolved bundle options");
        bundle_from_resolved(&resolved)
    }
}

/// Normalize bundle options without a store instance
pub fn normalize_options(
    options: impl Into<BundleOptionsInput>,
) -> Result<BundleOptions, OptionsError> {
    OptionsResolver::bundle_options().normalize_bundle(options)
}

/// Normalize a raw configuration value, which must be a bool or a mapping
pub fn normalize_value(value: &Value) -> Result<BundleOptions, OptionsError> {
    normalize_options(BundleOptionsInput::from_value(value.clone())?)
}

fn stringify_environments(key: &str, value: Value) -> Result<Value, OptionsError> {
    let Value::Sequence(items) = value else {
        return Err(OptionsError::InvalidOptionType {
            field: key.to_string(),
            expected: ValueKind::Sequence.name().to_string(),
            actual: value_type_name(&value).to_string(),
        });
    };

    items
        .iter()
        .map(|item| {
            scalar_to_string(item)
                .map(Value::String)
                .ok_or_else(|| OptionsError::InvalidOptionType {
                    field: key.to_string(),
                    expected: "sequence of scalars".to_string(),
                    actual: format!("sequence containing {}", value_type_name(item)),
                })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Sequence)
}

fn bundle_from_resolved(resolved: &Mapping) -> Result<BundleOptions, OptionsError> {
    let enabled = field(resolved, OPTION_ENABLED, ValueKind::Bool)?
        .as_bool()
        .unwrap_or_default();
    let priority = field(resolved, OPTION_PRIORITY, ValueKind::Int)?
        .as_i64()
        .unwrap_or_default();
    let environments = field(resolved, OPTION_ENVIRONMENTS, ValueKind::Sequence)?
        .as_sequence()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    Ok(BundleOptions {
        enabled,
        priority,
        environments,
    })
}

fn field<'a>(resolved: &'a Mapping, key: &str, kind: ValueKind) -> Result<&'a Value, OptionsError> {
    let value = resolved
        .get(key)
        .ok_or_else(|| OptionsError::MissingOption {
            field: key.to_string(),
        })?;

    if !kind.matches(value) {
        return Err(OptionsError::InvalidOptionType {
            field: key.to_string(),
            expected: kind.name().to_string(),
            actual: value_type_name(value).to_string(),
        });
    }

    Ok(value)
}
