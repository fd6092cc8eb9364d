//! CLI command definitions.
//!
//! Each subcommand maps to one question asked of the ghost blog stack for a
//! single account and region.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ghost_conf::{ConfigurationRegistry, LayeredSource, SettingsKey};
use tracing::debug;

pub mod order;
pub mod path_for;
pub mod synth;

/// ghost - compose the ghost blog infrastructure stack
#[derive(Parser)]
#[command(name = "ghost")]
#[command(version, about = "Compose the ghost blog infrastructure stack")]
#[command(long_about = r#"
ghost composes the ghost blog stack (network, cluster, database, load
balancer, DNS, certificates, container service) for one account and region,
and reports the resources it would declare and the parameters it would
publish.

COMMANDS:
  synth     → Compose the stack and print the synthesis manifest
  order     → Print the units in construction order
  path-for  → Print the parameter path a suffix is published under

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Configuration error
  4 - Import lookup failure
  5 - Composition error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compose the stack and print the synthesis manifest
    Synth(synth::SynthArgs),

    /// Print the units in construction order
    Order(order::OrderArgs),

    /// Print the parameter path for one or more suffixes
    #[command(name = "path-for")]
    PathFor(path_for::PathForArgs),
}

/// Deployment target and the settings file describing it.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Target account id
    #[arg(long, env = "GHOST_ACCOUNT", default_value = "000000000000")]
    pub account: String,

    /// Target region
    #[arg(long, env = "GHOST_REGION", default_value = "us-east-1")]
    pub region: String,

    /// Layered settings file (base `settings` plus per-target overrides)
    #[arg(short, long, env = "GHOST_CONFIG")]
    pub config: Option<PathBuf>,
}

impl TargetArgs {
    pub fn key(&self) -> SettingsKey {
        SettingsKey::new(&self.account, &self.region)
    }

    /// Registry backed by the settings file, or by defaults when none is given.
    pub fn registry(&self) -> Result<ConfigurationRegistry> {
        match &self.config {
            Some(path) => {
                debug!("Loading settings from {}", path.display());
                let source = LayeredSource::from_file(path)
                    .with_context(|| format!("Failed to load settings from {}", path.display()))?;
                Ok(ConfigurationRegistry::new(source))
            }
            None => Ok(ConfigurationRegistry::with_defaults()),
        }
    }
}
