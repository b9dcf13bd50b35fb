//! bundlectl - command-line bundle state manager

use anyhow::{Context, Result};
use clap::Parser;
use config::{LoggingSettings, Settings, SettingsLoader, YamlFileConfig};
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod cli;

use app::Application;
use cli::Cli;

fn main() -> Result<()> {
    // Load .env file if it exists
    let dotenv_result = dotenv::dotenv();

    let cli = Cli::parse();

    let mut settings = match &cli.settings {
        Some(path) => SettingsLoader::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => SettingsLoader::load_default().context("Failed to load settings")?,
    };
    apply_overrides(&mut settings, &cli);

    init_logging(&settings.logging)?;

    if let Err(e) = dotenv_result {
        if !e.not_found() {
            warn!("Could not load .env file: {}", e);
        }
    }

    debug!(
        config_path = %settings.config_path,
        environment = %settings.environment,
        "Settings loaded"
    );

    let app = Application::new(
        YamlFileConfig::new(&settings.config_path),
        settings.environment.clone(),
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    app.run(cli.command, &mut out)
}

/// Command-line flags win over settings file and environment
fn apply_overrides(settings: &mut Settings, cli: &Cli) {
    if let Some(path) = &cli.config {
        settings.config_path = path.display().to_string();
    }
    if let Some(environment) = &cli.environment {
        settings.environment = environment.clone();
    }
}

/// Initialize logging on stderr so command output stays clean
fn init_logging(logging: &LoggingSettings) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(env_filter);

    match logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to initialize JSON logging")?;
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to initialize pretty logging")?;
        }
    }

    debug!(level = %logging.level, format = %logging.format, "Logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_settings() {
        let cli = Cli::parse_from(["bundlectl", "-c", "/tmp/ext.yaml", "-e", "dev", "check"]);
        let mut settings = Settings::default();
        apply_overrides(&mut settings, &cli);
        assert_eq!(settings.config_path, "/tmp/ext.yaml");
        assert_eq!(settings.environment, "dev");
    }

    #[test]
    fn test_no_overrides_keep_settings() {
        let cli = Cli::parse_from(["bundlectl", "check"]);
        let mut settings = Settings::default();
        apply_overrides(&mut settings, &cli);
        assert_eq!(settings, Settings::default());
    }
}
