//! Settings for the extension manager tool
//!
//! Layered from an optional YAML file and `BUNDLECTL_`-prefixed environment
//! variables (nested keys separated by `__`).

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use types::ConfigError;

/// Default settings file looked up in the working directory
pub const DEFAULT_SETTINGS_FILE: &str = "bundlectl.yaml";

/// Environment variable prefix for settings overrides
pub const ENV_PREFIX: &str = "BUNDLECTL_";

/// Tool settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Extension manager configuration file
    #[serde(default = "default_config_path")]
    pub config_path: String,
    /// Environment used for activation plans
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_config_path() -> String {
    "var/config/extensions.yaml".to_string()
}

fn default_environment() -> String {
    "prod".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_path: default_config_path(),
            environment: default_environment(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Settings loader that handles YAML files and environment variables
pub struct SettingsLoader;

impl SettingsLoader {
    /// Load settings from an explicit file plus environment variables
    pub fn load<P: AsRef<Path>>(settings_path: P) -> Result<Settings> {
        let settings_path = settings_path.as_ref();

        if !settings_path.exists() {
            return Err(ConfigError::Read {
                path: settings_path.display().to_string(),
                message: "Settings file not found".to_string(),
            }
            .into());
        }

        Self::extract(Self::base().merge(Yaml::file(settings_path)).merge(Self::env()))
    }

    /// Load settings from the default file when present, plus environment variables
    pub fn load_default() -> Result<Settings> {
        Self::extract(
            Self::base()
                .merge(Yaml::file(DEFAULT_SETTINGS_FILE))
                .merge(Self::env()),
        )
    }

    /// Load settings from string (for testing)
    pub fn load_from_str(yaml_content: &str) -> Result<Settings> {
        Self::extract(Self::base().merge(Yaml::string(yaml_content)))
    }

    /// Write the default settings as YAML
    pub fn create_example<P: AsRef<Path>>(path: P) -> Result<()> {
        let yaml_content = serde_yaml::to_string(&Settings::default())
            .context("Failed to serialize default settings")?;

        std::fs::write(path.as_ref(), yaml_content)
            .context("Failed to write example settings file")?;

        Ok(())
    }

    fn base() -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
    }

    fn env() -> Env {
        Env::prefixed(ENV_PREFIX).split("__")
    }

    fn extract(figment: Figment) -> Result<Settings> {
        let settings: Settings = figment
            .extract()
            .context("Failed to parse settings")?;

        Self::validate(&settings)?;
        Ok(settings)
    }

    fn validate(settings: &Settings) -> Result<()> {
        if settings.config_path.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "config_path".to_string(),
                message: "Configuration path cannot be empty".to_string(),
            }
            .into());
        }

        if settings.environment.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "environment".to_string(),
                message: "Environment cannot be empty".to_string(),
            }
            .into());
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&settings.logging.level.as_str()) {
            return Err(ConfigError::Validation {
                field: "logging.level".to_string(),
                message: format!(
                    "Invalid log level: {}. Valid levels: {:?}",
                    settings.logging.level, valid_log_levels
                ),
            }
            .into());
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&settings.logging.format.as_str()) {
            return Err(ConfigError::Validation {
                field: "logging.format".to_string(),
                message: format!(
                    "Invalid log format: {}. Valid formats: {:?}",
                    settings.logging.format, valid_log_formats
                ),
            }
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let settings = SettingsLoader::load_from_str("environment: prod").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.config_path, "var/config/extensions.yaml");
        assert_eq!(settings.environment, "prod");
    }

    #[test]
    fn test_load_from_string() {
        let yaml_content = r#"
config_path: "/srv/app/extensions.yaml"
environment: "dev"
logging:
  level: "debug"
"#;

        let settings = SettingsLoader::load_from_str(yaml_content).unwrap();
        assert_eq!(settings.config_path, "/srv/app/extensions.yaml");
        assert_eq!(settings.environment, "dev");
        assert_eq!(settings.logging.level, "debug");
        assert_eq!(settings.logging.format, "pretty");
    }

    #[test]
    fn test_validation_errors() {
        assert!(SettingsLoader::load_from_str("config_path: \"\"").is_err());
        assert!(SettingsLoader::load_from_str("environment: \" \"").is_err());
        assert!(SettingsLoader::load_from_str("logging:\n  level: loud").is_err());
        assert!(SettingsLoader::load_from_str("logging:\n  format: xml").is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(SettingsLoader::load("/nonexistent/bundlectl.yaml").is_err());
    }

    #[test]
    fn test_create_example_and_load() {
        let temp_file = NamedTempFile::new().unwrap();
        SettingsLoader::create_example(temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("config_path:"));
        assert!(content.contains("logging:"));

        let settings = SettingsLoader::load(temp_file.path()).unwrap();
        assert_eq!(settings.environment, "prod");
    }
}
