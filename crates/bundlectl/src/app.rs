//! Command execution on top of the bundle state store

use crate::cli::Command;
use anyhow::{bail, Context, Result};
use config::{
    ActivationPlan, BundleStateStore, ConfigAccessor, SettingsLoader, StateValidator,
};
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::io::Write;
use std::path::Path;
use tracing::info;
use types::{BundleOptions, BundleOptionsInput, OPTION_ENABLED, OPTION_ENVIRONMENTS, OPTION_PRIORITY};

/// Activation plan as printed by `plan --json`
#[derive(Debug, Serialize)]
struct PlanOutput<'a> {
    environment: &'a str,
    bundles: Vec<&'a str>,
}

/// Extension manager application
pub struct Application<A> {
    store: BundleStateStore<A>,
    environment: String,
}

impl<A: ConfigAccessor> Application<A> {
    pub fn new(config: A, environment: impl Into<String>) -> Self {
        Self {
            store: BundleStateStore::new(config),
            environment: environment.into(),
        }
    }

    pub fn store(&self) -> &BundleStateStore<A> {
        &self.store
    }

    /// Execute one command, writing its report to `out`
    pub fn run<W: Write>(&self, command: Command, out: &mut W) -> Result<()> {
        match command {
            Command::Enable {
                name,
                priority,
                environments,
            } => {
                let mut options = Mapping::new();
                options.insert(Value::from(OPTION_ENABLED), Value::Bool(true));
                if let Some(priority) = priority {
                    options.insert(Value::from(OPTION_PRIORITY), Value::from(priority));
                }
                if !environments.is_empty() {
                    options.insert(
                        Value::from(OPTION_ENVIRONMENTS),
                        Value::Sequence(environments.into_iter().map(Value::String).collect()),
                    );
                }
                self.update(&name, options.into(), out)
            }
            Command::Disable { name } => self.update(&name, false.into(), out),
            Command::Set { name, options } => {
                let raw: Value = serde_yaml::from_str(&options)
                    .with_context(|| format!("Options for {} are not valid YAML", name))?;
                let input = BundleOptionsInput::from_value(raw)
                    .with_context(|| format!("Failed to set options for {}", name))?;
                self.update(&name, input, out)
            }
            Command::Show { name } => match self.store.get_state(&name)? {
                Some(options) => {
                    writeln!(out, "{}", format_bundle(&name, &options))?;
                    Ok(())
                }
                None => bail!("Bundle {} has no stored state", name),
            },
            Command::List { all, json } => self.list(all, json, out),
            Command::Plan { target, json } => {
                let environment = target.unwrap_or_else(|| self.environment.clone());
                self.plan(&environment, json, out)
            }
            Command::Check => self.check(out),
            Command::InitSettings { path } => self.init_settings(&path, out),
        }
    }

    fn update<W: Write>(&self, name: &str, input: BundleOptionsInput, out: &mut W) -> Result<()> {
        if name.trim().is_empty() {
            bail!("Bundle name cannot be empty");
        }

        self.store
            .set_state(name, input)
            .with_context(|| format!("Failed to update bundle {}", name))?;

        let options = self
            .store
            .get_state(name)?
            .context("Bundle state missing after save")?;
        writeln!(out, "{}", format_bundle(name, &options))?;
        Ok(())
    }

    fn list<W: Write>(&self, all: bool, json: bool, out: &mut W) -> Result<()> {
        let bundles = if all {
            self.store.get_all_bundles()?
        } else {
            self.store.get_enabled_bundles()?
        };

        if json {
            writeln!(out, "{}", serde_json::to_string_pretty(&bundles)?)?;
            return Ok(());
        }

        if bundles.is_empty() {
            writeln!(out, "No bundles")?;
        }
        for (name, options) in &bundles {
            writeln!(out, "{}", format_bundle(name, options))?;
        }
        Ok(())
    }

    fn plan<W: Write>(&self, environment: &str, json: bool, out: &mut W) -> Result<()> {
        let enabled = self.store.get_enabled_bundles()?;
        let plan = ActivationPlan::resolve(&enabled, environment);
        info!(environment, count = plan.len(), "Activation plan resolved");

        if json {
            let output = PlanOutput {
                environment: &plan.environment,
                bundles: plan.names(),
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
            return Ok(());
        }

        for (position, (name, options)) in plan.bundles.iter().enumerate() {
            writeln!(out, "{:>3}. {} (priority {})", position + 1, name, options.priority)?;
        }
        Ok(())
    }

    fn check<W: Write>(&self, out: &mut W) -> Result<()> {
        let tree = self.store.config().load_config()?;
        let report = StateValidator::validate(&tree, self.store.resolver());

        for issue in &report.errors {
            writeln!(out, "error: {}: {}", issue.field, issue.message)?;
        }
        for issue in &report.warnings {
            writeln!(out, "warning: {}: {}", issue.field, issue.message)?;
        }
        writeln!(out, "{}", report.summary())?;

        if report.has_errors() {
            bail!("Bundle configuration is invalid");
        }
        Ok(())
    }

    fn init_settings<W: Write>(&self, path: &Path, out: &mut W) -> Result<()> {
        if path.exists() {
            bail!("Refusing to overwrite {}", path.display());
        }
        SettingsLoader::create_example(path)?;
        writeln!(out, "Wrote {}", path.display())?;
        Ok(())
    }
}

fn format_bundle(name: &str, options: &BundleOptions) -> String {
    let environments = if options.environments.is_empty() {
        "all".to_string()
    } else {
        options.environments.join(",")
    };
    format!(
        "{} enabled={} priority={} environments={}",
        name, options.enabled, options.priority, environments
    )
}
