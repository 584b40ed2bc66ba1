//! The `plan` command.
//!
//! Loads a dependency graph, runs the module planner and prints the resulting
//! [`ModulePlan`] as text or JSON.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::fmt::Write;
use std::path::PathBuf;

use super::OutputFormat;
use crate::config::{GraphInput, ModgraphConfig};
use crate::module::{DependencyOrigin, Services};
use crate::planner::{ModulePlan, ModulePlanner};

/// Classify a dependency graph into modules.
#[derive(Args, Debug)]
pub struct PlanCommand {
    /// Dependency graph file (roots and per-artifact dependencies)
    #[arg(short, long, value_name = "FILE")]
    pub graph: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl PlanCommand {
    /// Runs the command.
    pub async fn execute(self, config: &ModgraphConfig) -> Result<()> {
        let input = GraphInput::load_from(&self.graph).await?;
        let roots = input
            .roots()
            .with_context(|| format!("Invalid root in {}", self.graph.display()))?;
        let graph = input.to_graph().with_context(|| {
            format!("Invalid artifact entry in {}", self.graph.display())
        })?;

        let planner = ModulePlanner::from_config(config, graph)?;
        let plan = planner.plan(&roots)?;

        match self.format {
            OutputFormat::Text => print!("{}", render_text(&plan)),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
        }
        Ok(())
    }
}

/// Renders a plan for terminals.
pub fn render_text(plan: &ModulePlan) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} module(s), slot strategy {}, default slot {}",
        plan.modules.len(),
        plan.slot_strategy,
        plan.default_slot
    );

    for module in &plan.modules {
        let _ = writeln!(out);
        let heading = format!("{}:{}", module.name, module.slot);
        if module.synthetic {
            let _ = writeln!(out, "{} {}", heading.bold(), "(synthesized)".dimmed());
        } else {
            let _ = writeln!(out, "{}", heading.bold());
        }

        for member in &module.members {
            let _ = writeln!(out, "  member {member}");
        }
        for dependency in &module.dependencies {
            let mut attributes = Vec::new();
            if dependency.origin == DependencyOrigin::Static {
                attributes.push("static".to_string());
            }
            if dependency.export {
                attributes.push("export".to_string());
            }
            if dependency.optional {
                attributes.push("optional".to_string());
            }
            if dependency.services != Services::None {
                attributes.push(format!("services={}", dependency.services));
            }

            let target = format!("{}:{}", dependency.name, dependency.slot);
            if attributes.is_empty() {
                let _ = writeln!(out, "  depends {}", target.cyan());
            } else {
                let _ = writeln!(out, "  depends {} [{}]", target.cyan(), attributes.join(", "));
            }
        }
        if let Some(main_class) = &module.fragments.main_class {
            let _ = writeln!(out, "  main-class {main_class}");
        }
    }

    let mismatches = plan.slot_mismatches();
    if !mismatches.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", "Slot mismatches".yellow());
        for (module, dependency) in mismatches {
            let _ = writeln!(
                out,
                "  {}:{} -> {}:{}",
                module.name, module.slot, dependency.name, dependency.slot
            );
        }
    }

    if !plan.pruned.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", "Pruned".yellow());
        for pruned in &plan.pruned {
            let _ = writeln!(out, "  {} ({})", pruned.coordinates, pruned.policy);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{ModuleFragments, ResolvedModuleDependency};
    use crate::planner::{PlannedModule, PrunedArtifact};
    use crate::slot::SlotStrategy;

    #[test]
    fn test_render_text() {
        colored::control::set_override(false);

        let plan = ModulePlan {
            default_slot: "main".to_string(),
            slot_strategy: SlotStrategy::Main,
            modules: vec![PlannedModule {
                name: "app".to_string(),
                slot: "main".to_string(),
                synthetic: false,
                members: vec!["org:app:1.0".to_string()],
                dependencies: vec![ResolvedModuleDependency {
                    name: "javax.api".to_string(),
                    slot: "main".to_string(),
                    export: true,
                    optional: false,
                    services: Services::Import,
                    origin: DependencyOrigin::Static,
                }],
                fragments: ModuleFragments::default(),
            }],
            pruned: vec![PrunedArtifact {
                coordinates: "junit:junit:4.13".to_string(),
                policy: "exclusion".to_string(),
            }],
        };

        let text = render_text(&plan);
        assert!(text.starts_with("1 module(s), slot strategy main, default slot main"));
        assert!(text.contains("app:main\n"));
        assert!(text.contains("  member org:app:1.0"));
        assert!(text.contains("  depends javax.api:main [static, export, services=import]"));
        assert!(text.contains("  junit:junit:4.13 (exclusion)"));
        assert!(!text.contains("Slot mismatches"));
    }
}
