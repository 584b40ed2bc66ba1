//! The `modules` command: lists configured module descriptors in
//! classification order.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::OutputFormat;
use crate::config::ModgraphConfig;
use crate::module::ModuleDescriptor;

/// List the configured modules.
#[derive(Args, Debug)]
pub struct ModulesCommand {
    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl ModulesCommand {
    /// Runs the command.
    pub fn execute(self, config: &ModgraphConfig) -> Result<()> {
        let descriptors = config.descriptors()?;

        match self.format {
            OutputFormat::Text => {
                if descriptors.is_empty() {
                    println!("No modules configured");
                    return Ok(());
                }
                for descriptor in &descriptors {
                    println!("{}", describe(descriptor));
                }
            }
            OutputFormat::Json => {
                let list: Vec<_> = descriptors.iter().map(summary).collect();
                println!("{}", serde_json::to_string_pretty(&list)?);
            }
        }
        Ok(())
    }
}

fn describe(descriptor: &ModuleDescriptor) -> String {
    let mut line = descriptor.to_string().bold().to_string();

    let mut notes = Vec::new();
    if descriptor.is_skipped() {
        notes.push("skip".to_string());
    }
    if descriptor.directives().inherit_slot {
        notes.push("inherit-slot".to_string());
    }
    let rules = descriptor.matcher().includes().len() + descriptor.matcher().excludes().len();
    notes.push(format!("{rules} rule(s)"));
    if !descriptor.static_dependencies().is_empty() {
        notes.push(format!("{} static dependency(ies)", descriptor.static_dependencies().len()));
    }

    line.push_str(&format!(" ({})", notes.join(", ")));
    line
}

fn summary(descriptor: &ModuleDescriptor) -> serde_json::Value {
    serde_json::json!({
        "name": descriptor.name(),
        "slot": descriptor.slot(),
        "skip": descriptor.is_skipped(),
        "inherit_slot": descriptor.directives().inherit_slot,
        "includes": descriptor.matcher().includes().len(),
        "excludes": descriptor.matcher().excludes().len(),
        "static_dependencies": descriptor
            .static_dependencies()
            .iter()
            .map(|d| d.name.as_str())
            .collect::<Vec<_>>(),
    })
}
