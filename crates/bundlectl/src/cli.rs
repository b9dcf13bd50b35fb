//! Command-line interface definition

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Manage bundle state in the extension manager configuration
#[derive(Debug, Parser)]
#[command(name = "bundlectl", version, about)]
pub struct Cli {
    /// Settings file (defaults to ./bundlectl.yaml when present)
    #[arg(short, long, global = true)]
    pub settings: Option<PathBuf>,

    /// Extension manager configuration file, overrides the settings
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Environment used for activation plans, overrides the settings
    #[arg(short, long, global = true)]
    pub environment: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Enable a bundle, keeping its other stored options
    Enable {
        name: String,
        /// Activation priority
        #[arg(long, allow_negative_numbers = true)]
        priority: Option<i64>,
        /// Restrict the bundle to an environment (repeatable)
        #[arg(long = "env")]
        environments: Vec<String>,
    },
    /// Disable a bundle, keeping its entry
    Disable { name: String },
    /// Merge a YAML options document (or a bool) into a bundle entry
    Set { name: String, options: String },
    /// Show the stored options of a bundle
    Show { name: String },
    /// List enabled bundles
    List {
        /// Include disabled bundles
        #[arg(long)]
        all: bool,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the activation order for an environment
    Plan {
        /// Environment to plan for
        #[arg(value_name = "ENVIRONMENT")]
        target: Option<String>,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate every stored bundle entry
    Check,
    /// Write a settings file with default values
    InitSettings { path: PathBuf },
}
