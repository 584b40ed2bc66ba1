//! In-memory artifact dependency graph.
//!
//! [`ArtifactGraph`] stores an already resolved dependency graph: nodes are
//! artifacts, edges carry the scope, optional flag and exclusions of the
//! declaring dependency. It stands in for a repository-backed resolver and is
//! what [`GraphResolver`](super::GraphResolver) answers queries from.
//!
//! Cycles are permitted (real dependency graphs contain them); traversals guard
//! against revisiting nodes, and [`ArtifactGraph::detect_cycles`] reports them.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

use crate::core::{Artifact, Dependency, Exclusion, Scope};

/// Edge attributes copied from the declaring dependency.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DependencyEdge {
    /// Scope of the edge
    pub scope: Scope,
    /// Whether the edge is optional
    pub optional: bool,
    /// Exclusions declared on the edge
    pub exclusions: Vec<Exclusion>,
}

impl From<&Dependency> for DependencyEdge {
    fn from(dependency: &Dependency) -> Self {
        Self {
            scope: dependency.scope,
            optional: dependency.optional,
            exclusions: dependency.exclusions.clone(),
        }
    }
}

/// Color states for cycle detection using DFS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Directed graph of artifacts and their declared dependencies.
#[derive(Debug, Default)]
pub struct ArtifactGraph {
    graph: DiGraph<Artifact, DependencyEdge>,
    node_map: HashMap<Artifact, NodeIndex>,
}

impl ArtifactGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an artifact without dependencies if it is not known yet.
    pub fn add_artifact(&mut self, artifact: Artifact) -> NodeIndex {
        if let Some(&index) = self.node_map.get(&artifact) {
            index
        } else {
            let index = self.graph.add_node(artifact.clone());
            self.node_map.insert(artifact, index);
            index
        }
    }

    /// Declares that `from` depends on `dependency`.
    ///
    /// Both ends become known artifacts. Re-declaring an existing edge keeps the
    /// first declaration.
    pub fn add_dependency(&mut self, from: &Artifact, dependency: &Dependency) {
        let from_idx = self.add_artifact(from.clone());
        let to_idx = self.add_artifact(dependency.artifact.clone());

        if !self.graph.contains_edge(from_idx, to_idx) {
            self.graph.add_edge(from_idx, to_idx, DependencyEdge::from(dependency));
        }
    }

    /// Whether the artifact is known.
    pub fn contains(&self, artifact: &Artifact) -> bool {
        self.node_map.contains_key(artifact)
    }

    /// Direct dependencies of a known artifact in declaration order.
    ///
    /// Returns `None` for unknown artifacts.
    pub fn direct_dependencies(&self, artifact: &Artifact) -> Option<Vec<Dependency>> {
        let &index = self.node_map.get(artifact)?;

        // petgraph yields outgoing edges newest first
        let mut dependencies: Vec<Dependency> = self
            .graph
            .edges(index)
            .map(|edge| {
                let weight = edge.weight();
                Dependency {
                    artifact: self.graph[edge.target()].clone(),
                    scope: weight.scope,
                    optional: weight.optional,
                    exclusions: weight.exclusions.clone(),
                }
            })
            .collect();
        dependencies.reverse();
        Some(dependencies)
    }

    /// Number of known artifacts.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of dependency edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Finds a dependency cycle, returned as the artifacts along it with the
    /// first artifact repeated at the end.
    pub fn detect_cycles(&self) -> Option<Vec<Artifact>> {
        let mut colors: HashMap<NodeIndex, Color> =
            self.graph.node_indices().map(|node| (node, Color::White)).collect();
        let mut path: Vec<NodeIndex> = Vec::new();

        for node in self.graph.node_indices() {
            if matches!(colors.get(&node), Some(Color::White))
                && let Some(cycle) = self.dfs_visit(node, &mut colors, &mut path)
            {
                return Some(cycle.into_iter().map(|idx| self.graph[idx].clone()).collect());
            }
        }

        None
    }

    fn dfs_visit(
        &self,
        node: NodeIndex,
        colors: &mut HashMap<NodeIndex, Color>,
        path: &mut Vec<NodeIndex>,
    ) -> Option<Vec<NodeIndex>> {
        colors.insert(node, Color::Gray);
        path.push(node);

        for neighbor in self.graph.neighbors(node) {
            match colors.get(&neighbor) {
                Some(Color::Gray) => {
                    let start = path.iter().position(|&n| n == neighbor).unwrap_or(0);
                    let mut cycle = path[start..].to_vec();
                    cycle.push(neighbor);
                    return Some(cycle);
                }
                Some(Color::White) => {
                    if let Some(cycle) = self.dfs_visit(neighbor, colors, path) {
                        return Some(cycle);
                    }
                }
                _ => {}
            }
        }

        path.pop();
        colors.insert(node, Color::Black);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(id: &str) -> Artifact {
        Artifact::new("g", id, "1.0")
    }

    #[test]
    fn test_direct_dependencies_keep_declaration_order() {
        let mut graph = ArtifactGraph::new();
        let root = artifact("root");
        graph.add_dependency(&root, &Dependency::new(artifact("b")));
        graph.add_dependency(&root, &Dependency::new(artifact("a")).with_optional(true));
        graph.add_dependency(&root, &Dependency::new(artifact("c")).with_scope(Scope::Test));

        let deps = graph.direct_dependencies(&root).unwrap();
        let ids: Vec<_> = deps.iter().map(|d| d.artifact.artifact_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert!(deps[1].optional);
        assert_eq!(deps[2].scope, Scope::Test);
    }

    #[test]
    fn test_unknown_artifact_has_no_answer() {
        let graph = ArtifactGraph::new();
        assert!(graph.direct_dependencies(&artifact("missing")).is_none());
    }

    #[test]
    fn test_leaf_is_known() {
        let mut graph = ArtifactGraph::new();
        graph.add_dependency(&artifact("root"), &Dependency::new(artifact("leaf")));

        assert!(graph.contains(&artifact("leaf")));
        assert_eq!(graph.direct_dependencies(&artifact("leaf")).unwrap().len(), 0);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_duplicate_edge_keeps_first() {
        let mut graph = ArtifactGraph::new();
        let root = artifact("root");
        graph.add_dependency(&root, &Dependency::new(artifact("a")));
        graph.add_dependency(&root, &Dependency::new(artifact("a")).with_optional(true));

        let deps = graph.direct_dependencies(&root).unwrap();
        assert_eq!(deps.len(), 1);
        assert!(!deps[0].optional);
    }

    #[test]
    fn test_cycle_detection() {
        let mut graph = ArtifactGraph::new();
        graph.add_dependency(&artifact("a"), &Dependency::new(artifact("b")));
        graph.add_dependency(&artifact("b"), &Dependency::new(artifact("c")));
        assert!(graph.detect_cycles().is_none());

        graph.add_dependency(&artifact("c"), &Dependency::new(artifact("a")));
        let cycle = graph.detect_cycles().unwrap();
        assert_eq!(cycle.first(), cycle.last());
        assert_eq!(cycle.len(), 4);
    }
}
