//! Core types and error handling for modgraph
//!
//! This module holds the value types every other part of the crate speaks in:
//! artifacts, dependency edges, and the error types.
//!
//! # Core Types
//!
//! - [`Artifact`] - immutable artifact identity (coordinates plus resolved file)
//! - [`Dependency`] - a graph edge with scope, optional flag and exclusions
//! - [`ModgraphError`] / [`ErrorContext`] - strongly-typed errors and their CLI rendering

pub mod artifact;
pub mod error;

pub use artifact::{Artifact, DEFAULT_EXTENSION, Dependency, Exclusion, Scope};
pub use error::{ErrorContext, ModgraphError, user_friendly_error};
