//! Command-line interface for modgraph.
//!
//! # Available Commands
//!
//! - `plan` - classify a dependency graph into modules and print the plan
//! - `validate` - check the configuration, reporting patterns that do not
//!   compile as regular expressions
//! - `modules` - list the configured module descriptors
//!
//! # Global Options
//!
//! - `-v`/`--verbose` - debug logging
//! - `-q`/`--quiet` - errors only
//! - `-c`/`--config <FILE>` - configuration file, `modgraph.toml` by default
//!
//! Logging goes to stderr so that `--format json` output on stdout stays
//! machine readable. `RUST_LOG` overrides the level chosen by the flags.
//!
//! # Examples
//!
//! ```bash
//! modgraph plan --graph graph.toml
//! modgraph -c modules.toml plan --graph graph.toml --format json
//! modgraph validate --strict
//! modgraph --verbose modules
//! ```

mod modules;
mod plan;
mod validate;

pub use modules::ModulesCommand;
pub use plan::{PlanCommand, render_text};
pub use validate::ValidateCommand;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{DEFAULT_CONFIG_FILE, ModgraphConfig};

/// Output format of commands that print reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with colors
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Runtime configuration derived from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter directive; `None` keeps the default of `info`
    pub log_level: Option<String>,

    /// Explicit configuration file path
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Create a new CLI configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the global tracing subscriber.
    ///
    /// `RUST_LOG` takes precedence over [`log_level`](Self::log_level). Calling
    /// this more than once is harmless; only the first subscriber is installed.
    pub fn init_logging(&self) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(self.log_level.as_deref().unwrap_or("info"))
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    /// Loads the configuration.
    ///
    /// An explicit path must exist. Without one, `modgraph.toml` in the current
    /// directory is used if present, else the defaults.
    pub async fn load_config(&self) -> Result<ModgraphConfig> {
        match &self.config_path {
            Some(path) => ModgraphConfig::load_from(path).await,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if tokio::fs::try_exists(default_path).await.unwrap_or(false) {
                    ModgraphConfig::load_from(default_path).await
                } else {
                    info!("No {} found, using default configuration", DEFAULT_CONFIG_FILE);
                    Ok(ModgraphConfig::default())
                }
            }
        }
    }
}

/// Classifies Maven-style artifacts into runtime modules.
#[derive(Parser)]
#[command(
    name = "modgraph",
    about = "Classify a dependency graph into runtime modules",
    version,
    long_about = "modgraph classifies the artifacts of a resolved dependency graph into \
                  named, slotted modules and computes each module's dependencies."
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file.
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a dependency graph and print the module plan
    Plan(PlanCommand),

    /// Validate the configuration
    Validate(ValidateCommand),

    /// List the configured modules
    Modules(ModulesCommand),
}

impl Cli {
    /// Execute the CLI with the configuration derived from its flags.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Maps the global flags to a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            Some("info".to_string())
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
        }
    }

    /// Execute the CLI with an explicit runtime configuration.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();
        let settings = config.load_config().await?;

        match self.command {
            Commands::Plan(cmd) => cmd.execute(&settings).await,
            Commands::Validate(cmd) => cmd.execute(&settings),
            Commands::Modules(cmd) => cmd.execute(&settings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_config_levels() {
        let cli = Cli::parse_from(["modgraph", "--verbose", "modules"]);
        assert_eq!(cli.build_config().log_level.as_deref(), Some("debug"));

        let cli = Cli::parse_from(["modgraph", "-q", "modules"]);
        assert_eq!(cli.build_config().log_level.as_deref(), Some("error"));

        let cli = Cli::parse_from(["modgraph", "modules"]);
        assert_eq!(cli.build_config().log_level.as_deref(), Some("info"));
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["modgraph", "-v", "-q", "modules"]).is_err());
    }

    #[test]
    fn test_config_path_is_global() {
        let cli = Cli::parse_from(["modgraph", "validate", "--config", "custom.toml"]);
        assert_eq!(cli.build_config().config_path, Some(PathBuf::from("custom.toml")));
    }

    #[tokio::test]
    async fn test_explicit_missing_config_fails() {
        let config = CliConfig {
            config_path: Some(PathBuf::from("/nonexistent/modgraph.toml")),
            ..CliConfig::new()
        };
        assert!(config.load_config().await.is_err());
    }
}
