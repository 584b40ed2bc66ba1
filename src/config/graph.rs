//! Dependency graph input.
//!
//! The graph file lists the root dependencies and, per artifact, its direct
//! dependencies. Dependencies are either plain coordinate strings or tables
//! with scope, optional flag and exclusions:
//!
//! ```toml
//! roots = [
//!     "org.example:app:1.0.0",
//!     { coordinates = "junit:junit:4.13.2", scope = "test" },
//! ]
//!
//! [[artifact]]
//! coordinates = "org.example:app:1.0.0"
//! dependencies = [
//!     "org.slf4j:slf4j-api:1.7.36",
//!     { coordinates = "commons-io:commons-io:2.11.0", optional = true, exclusions = ["*:*"] },
//! ]
//! ```
//!
//! Artifacts only referenced as dependencies are leaves.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

use crate::core::{Artifact, Dependency, Exclusion, ModgraphError, Scope};
use crate::resolver::ArtifactGraph;

/// A dependency as written in the graph file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DependencySpec {
    /// Coordinates only; compile scope, not optional, no exclusions
    Simple(String),
    /// Coordinates with edge attributes
    Detailed(DetailedDependency),
}

/// The table form of [`DependencySpec`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DetailedDependency {
    /// `group:artifact[:extension[:classifier]]:version`
    pub coordinates: String,
    /// Edge scope
    #[serde(default)]
    pub scope: Scope,
    /// Optional edge
    #[serde(default)]
    pub optional: bool,
    /// `group:artifact` exclusions, `*` allowed on either side
    #[serde(default)]
    pub exclusions: Vec<String>,
}

impl DependencySpec {
    /// The coordinate string.
    pub fn coordinates(&self) -> &str {
        match self {
            DependencySpec::Simple(coordinates) => coordinates,
            DependencySpec::Detailed(detailed) => &detailed.coordinates,
        }
    }

    /// Parses into a [`Dependency`].
    ///
    /// # Errors
    ///
    /// [`ModgraphError::InvalidCoordinates`] for malformed coordinates or exclusions.
    pub fn to_dependency(&self) -> Result<Dependency, ModgraphError> {
        let artifact: Artifact = self.coordinates().parse()?;
        match self {
            DependencySpec::Simple(_) => Ok(Dependency::new(artifact)),
            DependencySpec::Detailed(detailed) => {
                let mut dependency = Dependency::new(artifact)
                    .with_scope(detailed.scope)
                    .with_optional(detailed.optional);
                for exclusion in &detailed.exclusions {
                    dependency = dependency.with_exclusion(exclusion.parse::<Exclusion>()?);
                }
                Ok(dependency)
            }
        }
    }
}

/// `[[artifact]]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArtifactEntry {
    /// Artifact coordinates
    pub coordinates: String,
    /// Direct dependencies in declaration order
    #[serde(default)]
    pub dependencies: Vec<DependencySpec>,
}

/// Root dependencies plus the artifact graph.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct GraphInput {
    /// Root dependencies
    #[serde(default)]
    pub roots: Vec<DependencySpec>,
    /// Artifacts and their direct dependencies
    #[serde(default, rename = "artifact")]
    pub artifacts: Vec<ArtifactEntry>,
}

impl GraphInput {
    /// Loads a graph file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read dependency graph from {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse dependency graph from {}", path.display()))
    }

    /// Parses graph text.
    ///
    /// # Errors
    ///
    /// [`ModgraphError::TomlError`] for malformed documents.
    pub fn from_toml_str(content: &str) -> Result<Self, ModgraphError> {
        Ok(toml::from_str(content)?)
    }

    /// The parsed root dependencies.
    ///
    /// # Errors
    ///
    /// [`ModgraphError::InvalidCoordinates`] for malformed entries.
    pub fn roots(&self) -> Result<Vec<Dependency>, ModgraphError> {
        self.roots.iter().map(DependencySpec::to_dependency).collect()
    }

    /// Builds the artifact graph.
    ///
    /// # Errors
    ///
    /// [`ModgraphError::InvalidCoordinates`] for malformed entries.
    pub fn to_graph(&self) -> Result<ArtifactGraph, ModgraphError> {
        let mut graph = ArtifactGraph::new();
        for entry in &self.artifacts {
            let artifact: Artifact = entry.coordinates.parse()?;
            graph.add_artifact(artifact.clone());
            for spec in &entry.dependencies {
                graph.add_dependency(&artifact, &spec.to_dependency()?);
            }
        }
        Ok(graph)
    }
}
