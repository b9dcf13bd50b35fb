//! Shared types for the bundle state system
//!
//! This crate contains the bundle option types and error enums used by the
//! configuration store and the command-line extension manager.

pub mod bundle;
pub mod error;
pub mod utils;

// Re-export commonly used types
pub use bundle::*;
pub use error::{BundleStateError, ConfigError, OptionsError, Result};
