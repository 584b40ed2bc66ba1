//! modgraph - classify a dependency graph into runtime modules
//!
//! modgraph takes the resolved dependency graph of a Maven-style project and
//! groups its artifacts into named, slotted runtime modules. Each module gets a
//! dependency list computed from the dependencies of its member artifacts, so
//! that a module system can load them with correct visibility.
//!
//! # Architecture Overview
//!
//! A run goes through four stages:
//!
//! 1. **Collection** - the [`resolver`] walks the graph from the root
//!    dependencies, consulting pruning policies (global excludes, per-edge
//!    exclusions, skipped modules, optional and test-scoped edges) before every
//!    edge
//! 2. **Classification** - every collected artifact is assigned to a module by
//!    the ordered module descriptors in [`module`], falling back to a module
//!    named after the artifact's coordinates
//! 3. **Aggregation** - each module's dependency list is computed from its
//!    static declarations and its members' direct dependencies, collapsed to
//!    one edge per target module
//! 4. **Slotting** - module and dependency slots are derived through the
//!    [`slot`] strategy
//!
//! [`planner`] ties the stages together and produces a serializable plan.
//!
//! # Core Modules
//!
//! - [`core`] - artifacts, dependencies and error handling
//! - [`pattern`] - identifier patterns with capture groups
//! - [`clusion`] - include/exclude rule sets over artifacts and module names
//! - [`slot`] - slot strategies
//! - [`module`] - module descriptors, the classifier and dependency aggregation
//! - [`resolver`] - the artifact graph, pruning policies and collection
//! - [`config`] - `modgraph.toml` and dependency graph files
//! - [`planner`] - the end-to-end pipeline
//! - [`cli`] - the `modgraph` command line
//!
//! # Example
//!
//! ```rust
//! use modgraph_cli::config::{GraphInput, ModgraphConfig};
//! use modgraph_cli::planner::ModulePlanner;
//!
//! let config = ModgraphConfig::from_toml_str(r#"
//! [[module]]
//! name = "app"
//! [[module.include]]
//! group-id = "org\\.example"
//! "#).unwrap();
//!
//! let input = GraphInput::from_toml_str(r#"
//! roots = ["org.example:web:1.0.0"]
//!
//! [[artifact]]
//! coordinates = "org.example:web:1.0.0"
//! dependencies = ["org.slf4j:slf4j-api:1.7.36"]
//! "#).unwrap();
//!
//! let planner = ModulePlanner::from_config(&config, input.to_graph().unwrap()).unwrap();
//! let plan = planner.plan(&input.roots().unwrap()).unwrap();
//!
//! assert_eq!(plan.modules[0].name, "app");
//! assert_eq!(plan.modules[0].dependencies[0].name, "org.slf4j.slf4j-api");
//! ```

pub mod cli;
pub mod clusion;
pub mod config;
pub mod core;
pub mod module;
pub mod pattern;
pub mod planner;
pub mod resolver;
pub mod slot;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
