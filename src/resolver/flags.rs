//! Rejection flags for pruned artifacts.
//!
//! Artifacts are value identities and stay immutable; a rejection decided while
//! the graph is traversed is recorded in this side table instead, keyed by
//! artifact identity. Anything that later inspects the collected dependency list
//! consults the same table, so traversal-time and collection-time decisions agree.

use std::collections::HashMap;

use crate::core::{Artifact, Dependency};

/// Side table of rejected artifact identities with the policy that rejected them.
#[derive(Debug, Clone, Default)]
pub struct RejectionFlags {
    flagged: HashMap<Artifact, String>,
}

impl RejectionFlags {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flags an artifact as rejected. The first recorded reason is kept.
    pub fn flag(&mut self, artifact: &Artifact, reason: impl Into<String>) {
        self.flagged.entry(artifact.clone()).or_insert_with(|| reason.into());
    }

    /// Whether the dependency's artifact was rejected.
    pub fn is_flagged(&self, dependency: &Dependency) -> bool {
        self.flagged.contains_key(&dependency.artifact)
    }

    /// Whether the dependency's artifact was rejected by the named policy.
    pub fn is_flagged_by(&self, dependency: &Dependency, policy: &str) -> bool {
        self.reason(&dependency.artifact) == Some(policy)
    }

    /// The reason an artifact was rejected.
    pub fn reason(&self, artifact: &Artifact) -> Option<&str> {
        self.flagged.get(artifact).map(String::as_str)
    }

    /// Number of flagged artifacts.
    pub fn len(&self) -> usize {
        self.flagged.len()
    }

    /// Whether nothing was flagged.
    pub fn is_empty(&self) -> bool {
        self.flagged.is_empty()
    }

    /// Flagged artifacts with their reasons, sorted by artifact.
    pub fn sorted(&self) -> Vec<(&Artifact, &str)> {
        let mut entries: Vec<_> =
            self.flagged.iter().map(|(artifact, reason)| (artifact, reason.as_str())).collect();
        entries.sort();
        entries
    }
}
