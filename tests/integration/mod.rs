//! Integration test suite for modgraph
//!
//! End-to-end tests of the library pipeline and the `modgraph` binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **config_loading**: Loading configuration and graph files from disk
//! - **modules**: `modules` command
//! - **pipeline**: Collection, classification and aggregation through the library
//! - **plan**: `plan` command output and failures
//! - **validate**: `validate` command

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod config_loading;
mod modules;
mod pipeline;
mod plan;
mod validate;
