//! Error types for the bundle state system

use thiserror::Error;

/// Main error type for bundle state operations
#[derive(Error, Debug)]
pub enum BundleStateError {
    /// Bundle options could not be normalized
    #[error("Invalid bundle options: {0}")]
    Options(#[from] OptionsError),

    /// Configuration tree could not be loaded, saved or navigated
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for bundle state operations
pub type Result<T> = std::result::Result<T, BundleStateError>;

/// Option resolution specific errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    /// Options were neither a bool nor a mapping
    #[error("Expected options as bool or as mapping, but got {actual}")]
    InvalidInput { actual: String },

    /// An option value has the wrong type
    #[error("The option \"{field}\" is expected to be of type \"{expected}\", but is of type \"{actual}\"")]
    InvalidOptionType {
        field: String,
        expected: String,
        actual: String,
    },

    /// An option key is not part of the schema
    #[error("The option \"{field}\" does not exist. Defined options are: {defined}")]
    UndefinedOption { field: String, defined: String },

    /// A required option has neither a value nor a default
    #[error("The required option \"{field}\" is missing")]
    MissingOption { field: String },
}

/// Configuration tree and file specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File could not be read
    #[error("Failed to read configuration {path}: {message}")]
    Read { path: String, message: String },

    /// File could not be written
    #[error("Failed to write configuration {path}: {message}")]
    Write { path: String, message: String },

    /// File content is not a valid configuration document
    #[error("Configuration parse error in {path}: {message}")]
    Parse { path: String, message: String },

    /// Tree could not be serialized
    #[error("Failed to serialize configuration: {0}")]
    Serialize(String),

    /// A setting has an unusable value
    #[error("Configuration validation error: {field}: {message}")]
    Validation { field: String, message: String },

    /// A section exists but is not a mapping
    #[error("Configuration section \"{section}\" must be a mapping, but is of type \"{actual}\"")]
    InvalidSection { section: String, actual: String },
}
