//! The `validate` command.
//!
//! Loading the configuration already rejects malformed TOML and unnamed
//! modules. This command additionally reports every pattern that does not
//! compile as a regular expression. Such patterns still work as literal
//! comparisons, so they are warnings unless `--strict` is given.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::OutputFormat;
use crate::config::ModgraphConfig;

/// Validate the configuration.
#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// Treat invalid patterns as errors
    #[arg(long)]
    pub strict: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl ValidateCommand {
    /// Runs the command.
    pub fn execute(self, config: &ModgraphConfig) -> Result<()> {
        let descriptors = config.descriptors()?;
        let issues = config.invalid_patterns()?;
        let valid = issues.is_empty() || !self.strict;

        match self.format {
            OutputFormat::Text => {
                for issue in &issues {
                    println!("{} Invalid pattern {}", "⚠".yellow(), issue);
                }
                if valid {
                    println!(
                        "{} Configuration is valid ({} module(s), {} global exclude(s))",
                        "✓".green(),
                        descriptors.len(),
                        config.excludes.len()
                    );
                }
            }
            OutputFormat::Json => {
                let report = serde_json::json!({
                    "valid": valid,
                    "modules": descriptors.len(),
                    "invalid_patterns": issues,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }

        if !valid && let Some(first) = issues.first() {
            return Err(anyhow::Error::from(first.to_error())
                .context(format!("{} invalid pattern(s) in strict mode", issues.len())));
        }
        Ok(())
    }
}
