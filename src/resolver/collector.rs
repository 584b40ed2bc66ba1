//! Transitive dependency collection.
//!
//! Collection walks the graph depth first from the roots, asking the
//! [`DependencyTraverser`] about every edge before descending. Accepted
//! artifacts are collected once, in pre-order, the first path to reach an
//! artifact deciding its edge attributes.
//!
//! Because collection is eager, an artifact may already be collected through
//! one path before a flagging policy rejects it on another. The post-collection
//! filter removes every flagged artifact, so the final list never contains an
//! artifact that any flagging policy rejected.

use std::collections::HashSet;
use tracing::{debug, trace};

use super::flags::RejectionFlags;
use super::graph::ArtifactGraph;
use super::traverser::{DependencyTraverser, TraversalContext, Verdict};
use crate::core::{Artifact, Dependency, ModgraphError};

/// Result of a collection run.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    /// Collected dependencies, flagged artifacts removed
    pub dependencies: Vec<Dependency>,
    /// Artifacts rejected by flagging policies
    pub flags: RejectionFlags,
}

/// Collects the pruned transitive closure of a root set.
#[derive(Debug)]
pub struct DependencyCollector<'a> {
    graph: &'a ArtifactGraph,
    traverser: &'a DependencyTraverser,
}

struct CollectState {
    collected: Vec<Dependency>,
    seen: HashSet<Artifact>,
    flags: RejectionFlags,
}

impl<'a> DependencyCollector<'a> {
    /// Creates a collector over `graph` pruned by `traverser`.
    pub fn new(graph: &'a ArtifactGraph, traverser: &'a DependencyTraverser) -> Self {
        Self {
            graph,
            traverser,
        }
    }

    /// Collects the roots and everything reachable from them.
    ///
    /// # Errors
    ///
    /// [`ModgraphError::RootResolutionFailed`] if a root artifact is unknown.
    pub fn collect(&self, roots: &[Dependency]) -> Result<Collection, ModgraphError> {
        if let Some(missing) = roots.iter().find(|root| !self.graph.contains(&root.artifact)) {
            return Err(ModgraphError::RootResolutionFailed {
                reason: format!("artifact '{}' is not in the dependency graph", missing.artifact),
                coordinates: Some(missing.artifact.to_string()),
            });
        }

        let mut state = CollectState {
            collected: Vec::new(),
            seen: HashSet::new(),
            flags: RejectionFlags::new(),
        };
        let mut ancestors = Vec::new();
        for root in roots {
            self.visit(root, self.traverser, &mut ancestors, &mut state);
        }

        let CollectState {
            mut collected,
            flags,
            ..
        } = state;
        let before = collected.len();
        collected.retain(|dependency| !flags.is_flagged(dependency));
        if collected.len() != before {
            debug!(
                "Removed {} collected artifact(s) rejected on another path",
                before - collected.len()
            );
        }

        debug!("Collected {} dependencies, {} artifact(s) flagged", collected.len(), flags.len());
        Ok(Collection {
            dependencies: collected,
            flags,
        })
    }

    fn visit(
        &self,
        dependency: &Dependency,
        traverser: &DependencyTraverser,
        ancestors: &mut Vec<Dependency>,
        state: &mut CollectState,
    ) {
        let verdict = traverser.evaluate(dependency, &TraversalContext::new(ancestors));
        if let Verdict::Reject {
            policy,
            flag,
        } = verdict
        {
            if flag {
                state.flags.flag(&dependency.artifact, policy);
            }
            return;
        }

        if !state.seen.insert(dependency.artifact.clone()) {
            trace!("Already collected {}", dependency.artifact);
            return;
        }
        state.collected.push(dependency.clone());

        let children = self.graph.direct_dependencies(&dependency.artifact).unwrap_or_default();
        let child_traverser = traverser.derive_child();
        ancestors.push(dependency.clone());
        for child in &children {
            self.visit(child, child_traverser, ancestors, state);
        }
        ancestors.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clusion::{ArtifactClusion, ArtifactMatcher};
    use crate::core::{Exclusion, Scope};
    use crate::resolver::traverser::PruningSettings;

    fn artifact(group: &str, id: &str) -> Artifact {
        Artifact::new(group, id, "1.0")
    }

    fn ids(collection: &Collection) -> Vec<String> {
        collection.dependencies.iter().map(|d| d.artifact.artifact_id.clone()).collect()
    }

    /// app -> (a -> c, b -> c, junit [test])
    fn sample_graph() -> ArtifactGraph {
        let mut graph = ArtifactGraph::new();
        let app = artifact("org", "app");
        graph.add_dependency(&app, &Dependency::new(artifact("org", "a")));
        graph.add_dependency(&app, &Dependency::new(artifact("org", "b")));
        graph.add_dependency(
            &app,
            &Dependency::new(artifact("junit", "junit")).with_scope(Scope::Test),
        );
        graph.add_dependency(&artifact("org", "a"), &Dependency::new(artifact("org", "c")));
        graph.add_dependency(&artifact("org", "b"), &Dependency::new(artifact("org", "c")));
        graph
    }

    #[test]
    fn test_collects_depth_first_once() {
        let graph = sample_graph();
        let traverser = DependencyTraverser::new();
        let collection = DependencyCollector::new(&graph, &traverser)
            .collect(&[Dependency::new(artifact("org", "app"))])
            .unwrap();

        assert_eq!(ids(&collection), vec!["app", "a", "c", "b", "junit"]);
        assert!(collection.flags.is_empty());
    }

    #[test]
    fn test_transitive_test_scope_is_pruned_without_flag() {
        let graph = sample_graph();
        let traverser = DependencyTraverser::for_direct(&PruningSettings {
            ignore_test_scope: true,
            ..Default::default()
        });
        let collection = DependencyCollector::new(&graph, &traverser)
            .collect(&[Dependency::new(artifact("org", "app"))])
            .unwrap();

        assert_eq!(ids(&collection), vec!["app", "a", "c", "b"]);
        assert!(collection.flags.is_empty());
    }

    #[test]
    fn test_excluded_artifact_is_flagged_and_absent() {
        let graph = sample_graph();
        let traverser = DependencyTraverser::for_direct(&PruningSettings {
            excludes: ArtifactMatcher::new(vec![], vec![ArtifactClusion::new(None, Some("c"))]),
            ..Default::default()
        });
        let collection = DependencyCollector::new(&graph, &traverser)
            .collect(&[Dependency::new(artifact("org", "app"))])
            .unwrap();

        assert!(!ids(&collection).contains(&"c".to_string()));
        assert_eq!(collection.flags.reason(&artifact("org", "c")), Some("exclusion"));
    }

    #[test]
    fn test_rejection_on_later_path_removes_collected_artifact() {
        // a -> c is collected first, then b excludes c
        let mut graph = ArtifactGraph::new();
        let app = artifact("org", "app");
        graph.add_dependency(&app, &Dependency::new(artifact("org", "a")));
        graph.add_dependency(
            &app,
            &Dependency::new(artifact("org", "b")).with_exclusion(Exclusion::new("org", "c")),
        );
        graph.add_dependency(&artifact("org", "a"), &Dependency::new(artifact("org", "c")));
        graph.add_dependency(&artifact("org", "b"), &Dependency::new(artifact("org", "c")));

        let traverser = DependencyTraverser::for_direct(&PruningSettings::default());
        let collection =
            DependencyCollector::new(&graph, &traverser).collect(&[Dependency::new(app)]).unwrap();

        assert_eq!(ids(&collection), vec!["app", "a", "b"]);
        let c = Dependency::new(artifact("org", "c"));
        assert!(collection.flags.is_flagged(&c));
    }

    #[test]
    fn test_cycles_terminate() {
        let mut graph = ArtifactGraph::new();
        graph.add_dependency(&artifact("g", "x"), &Dependency::new(artifact("g", "y")));
        graph.add_dependency(&artifact("g", "y"), &Dependency::new(artifact("g", "x")));

        let traverser = DependencyTraverser::new();
        let collection = DependencyCollector::new(&graph, &traverser)
            .collect(&[Dependency::new(artifact("g", "x"))])
            .unwrap();
        assert_eq!(ids(&collection), vec!["x", "y"]);
    }

    #[test]
    fn test_unknown_root_fails() {
        let graph = sample_graph();
        let traverser = DependencyTraverser::new();
        let result = DependencyCollector::new(&graph, &traverser)
            .collect(&[Dependency::new(artifact("org", "missing"))]);

        match result {
            Err(ModgraphError::RootResolutionFailed {
                coordinates,
                ..
            }) => assert_eq!(coordinates.as_deref(), Some("org:missing:1.0")),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
