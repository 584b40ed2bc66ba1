//! Test utilities for modgraph
//!
//! Helpers shared by unit and integration tests: logging setup, artifact and
//! dependency shorthands, and fixture files.
//!
//! # Example
//!
//! ```rust,no_run
//! use modgraph_cli::test_utils::{ConfigFixture, GraphFixture};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let config = ConfigFixture::basic().write_to(dir.path()).unwrap();
//! let graph = GraphFixture::basic().write_to(dir.path()).unwrap();
//! ```

pub mod fixtures;

pub use fixtures::{ConfigFixture, GraphFixture};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::core::{Artifact, Dependency};

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call installs a subscriber. `level` wins over `RUST_LOG`;
/// without either, tests run silently.
///
/// ```bash
/// RUST_LOG=modgraph_cli=trace cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Parses `group:artifact[:extension[:classifier]]:version`.
///
/// # Panics
///
/// On malformed coordinates.
pub fn artifact(coordinates: &str) -> Artifact {
    coordinates
        .parse()
        .unwrap_or_else(|e| panic!("invalid test coordinates '{coordinates}': {e}"))
}

/// A compile-scoped, non-optional dependency on `coordinates`.
///
/// # Panics
///
/// On malformed coordinates.
pub fn dependency(coordinates: &str) -> Dependency {
    Dependency::new(artifact(coordinates))
}
