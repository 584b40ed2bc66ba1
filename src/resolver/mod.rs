//! Dependency resolution with graph pruning.
//!
//! The [`Resolver`] trait is the seam to whatever knows the dependency graph.
//! It answers two questions:
//!
//! - [`Resolver::resolve_direct`] - the direct dependencies of one artifact,
//!   asked while aggregating module dependencies. Failures here are recoverable;
//!   callers log them and treat the artifact as having no dependencies.
//! - [`Resolver::resolve_all`] - the pruned transitive closure of the root set.
//!   Failures here abort the run.
//!
//! [`GraphResolver`] implements both over an in-memory [`ArtifactGraph`],
//! pruning with a [`DependencyTraverser`] per question: the collection traverser
//! decides what is collected from the roots, the direct traverser what a member
//! depends on.
//!
//! # Module Organization
//!
//! - [`graph`] - the artifact graph (petgraph)
//! - [`traverser`] - ordered pruning policies
//! - [`flags`] - side table of rejected artifacts
//! - [`collector`] - depth-first collection with post-collection filtering

pub mod collector;
pub mod flags;
pub mod graph;
pub mod traverser;

pub use collector::{Collection, DependencyCollector};
pub use flags::RejectionFlags;
pub use graph::{ArtifactGraph, DependencyEdge};
pub use traverser::{
    DependencyTraverser, PruningPolicy, PruningSettings, TraversalContext, Verdict,
};

use tracing::trace;

use crate::core::{Dependency, ModgraphError};

/// Source of dependency information.
pub trait Resolver {
    /// Direct dependencies of `dependency`'s artifact.
    ///
    /// # Errors
    ///
    /// Fails if the artifact cannot be resolved.
    fn resolve_direct(&self, dependency: &Dependency) -> Result<Vec<Dependency>, ModgraphError>;

    /// The roots and their pruned transitive dependencies, with the rejection
    /// flags recorded while pruning.
    ///
    /// # Errors
    ///
    /// Fails with [`ModgraphError::RootResolutionFailed`] if the roots cannot be resolved.
    fn collect(&self, roots: &[Dependency]) -> Result<Collection, ModgraphError>;

    /// The roots and their pruned transitive dependencies.
    ///
    /// # Errors
    ///
    /// Same as [`collect`](Self::collect).
    fn resolve_all(&self, roots: &[Dependency]) -> Result<Vec<Dependency>, ModgraphError> {
        self.collect(roots).map(|collection| collection.dependencies)
    }
}

/// [`Resolver`] over an in-memory [`ArtifactGraph`].
#[derive(Debug)]
pub struct GraphResolver {
    graph: ArtifactGraph,
    collection: DependencyTraverser,
    direct: DependencyTraverser,
}

impl GraphResolver {
    /// A resolver that prunes nothing.
    pub fn new(graph: ArtifactGraph) -> Self {
        Self {
            graph,
            collection: DependencyTraverser::new(),
            direct: DependencyTraverser::new(),
        }
    }

    /// Sets the traverser used by [`Resolver::collect`].
    #[must_use]
    pub fn with_collection_traverser(mut self, traverser: DependencyTraverser) -> Self {
        self.collection = traverser;
        self
    }

    /// Sets the traverser used by [`Resolver::resolve_direct`].
    #[must_use]
    pub fn with_direct_traverser(mut self, traverser: DependencyTraverser) -> Self {
        self.direct = traverser;
        self
    }

    /// The underlying graph.
    pub fn graph(&self) -> &ArtifactGraph {
        &self.graph
    }
}

impl Resolver for GraphResolver {
    fn resolve_direct(&self, dependency: &Dependency) -> Result<Vec<Dependency>, ModgraphError> {
        let children = self.graph.direct_dependencies(&dependency.artifact).ok_or_else(|| {
            ModgraphError::ArtifactNotFound {
                coordinates: dependency.artifact.to_string(),
            }
        })?;

        let ancestors = std::slice::from_ref(dependency);
        let context = TraversalContext::new(ancestors);
        let accepted: Vec<Dependency> = children
            .into_iter()
            .filter(|child| self.direct.evaluate(child, &context).is_accepted())
            .collect();

        trace!("{} has {} direct dependencies", dependency.artifact, accepted.len());
        Ok(accepted)
    }

    fn collect(&self, roots: &[Dependency]) -> Result<Collection, ModgraphError> {
        DependencyCollector::new(&self.graph, &self.collection).collect(roots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Artifact, Exclusion, Scope};

    fn artifact(id: &str) -> Artifact {
        Artifact::new("org", id, "1.0")
    }

    fn resolver() -> GraphResolver {
        let mut graph = ArtifactGraph::new();
        graph.add_dependency(&artifact("app"), &Dependency::new(artifact("lib")));
        graph.add_dependency(
            &artifact("app"),
            &Dependency::new(artifact("mock")).with_scope(Scope::Test),
        );
        graph.add_dependency(&artifact("lib"), &Dependency::new(artifact("util")));

        let settings = PruningSettings {
            ignore_test_scope: true,
            ..Default::default()
        };
        GraphResolver::new(graph).with_direct_traverser(DependencyTraverser::for_direct(&settings))
    }

    #[test]
    fn test_resolve_direct_prunes_transitive_test_scope() {
        let direct = resolver().resolve_direct(&Dependency::new(artifact("app"))).unwrap();
        assert_eq!(direct, vec![Dependency::new(artifact("lib"))]);
    }

    #[test]
    fn test_resolve_direct_honors_member_exclusions() {
        let member = Dependency::new(artifact("lib")).with_exclusion(Exclusion::new("org", "util"));
        assert!(resolver().resolve_direct(&member).unwrap().is_empty());
    }

    #[test]
    fn test_resolve_direct_unknown_artifact() {
        let result = resolver().resolve_direct(&Dependency::new(artifact("ghost")));
        assert!(matches!(result, Err(ModgraphError::ArtifactNotFound { .. })));
    }

    #[test]
    fn test_resolve_all_returns_closure() {
        let all = resolver().resolve_all(&[Dependency::new(artifact("app"))]).unwrap();
        let ids: Vec<_> = all.iter().map(|d| d.artifact.artifact_id.as_str()).collect();
        assert_eq!(ids, vec!["app", "lib", "util", "mock"]);
    }
}
