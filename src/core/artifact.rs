//! Artifact identities and dependency edges.
//!
//! An [`Artifact`] is an immutable value identified by its coordinates
//! (`groupId`, `artifactId`, `version`, `classifier`, `extension`) plus the
//! resolved file, when one is known. Two artifacts are the same artifact for
//! classification purposes iff all of those fields are equal, which is exactly
//! what the derived `Eq`/`Hash` implementations compare.
//!
//! A [`Dependency`] is an edge to an artifact carrying a [`Scope`], the optional
//! flag and the set of [`Exclusion`]s declared on that edge.
//!
//! # Coordinates
//!
//! Artifacts parse from and display as colon-separated coordinates:
//!
//! ```rust
//! use modgraph_cli::core::Artifact;
//!
//! let jar: Artifact = "org.slf4j:slf4j-api:1.7.36".parse().unwrap();
//! assert_eq!(jar.extension, "jar");
//!
//! let sources: Artifact = "org.slf4j:slf4j-api:jar:sources:1.7.36".parse().unwrap();
//! assert_eq!(sources.classifier, "sources");
//! assert_eq!(sources.to_string(), "org.slf4j:slf4j-api:jar:sources:1.7.36");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::core::ModgraphError;

/// Extension used when coordinates do not name one.
pub const DEFAULT_EXTENSION: &str = "jar";

/// An immutable artifact identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Artifact {
    /// Group identifier, e.g. `org.slf4j`
    pub group_id: String,
    /// Artifact identifier, e.g. `slf4j-api`
    pub artifact_id: String,
    /// Version string as published; not necessarily semver
    pub version: String,
    /// Classifier, empty when absent
    pub classifier: String,
    /// Packaging extension, `jar` by default
    pub extension: String,
    /// Resolved file, once the resolver has one
    pub file: Option<PathBuf>,
}

impl Artifact {
    /// Create a `jar` artifact without classifier or file.
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            classifier: String::new(),
            extension: DEFAULT_EXTENSION.to_string(),
            file: None,
        }
    }

    /// Returns a copy with the given classifier.
    #[must_use]
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = classifier.into();
        self
    }

    /// Returns a copy with the given extension.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Returns a copy bound to a resolved file.
    #[must_use]
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// `groupId:artifactId`, the version-less key used by exclusions.
    pub fn management_key(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.classifier.is_empty() {
            if self.extension == DEFAULT_EXTENSION {
                write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
            } else {
                write!(
                    f,
                    "{}:{}:{}:{}",
                    self.group_id, self.artifact_id, self.extension, self.version
                )
            }
        } else {
            write!(
                f,
                "{}:{}:{}:{}:{}",
                self.group_id, self.artifact_id, self.extension, self.classifier, self.version
            )
        }
    }
}

impl FromStr for Artifact {
    type Err = ModgraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        let invalid = |reason: &str| ModgraphError::InvalidCoordinates {
            coordinates: s.to_string(),
            reason: reason.to_string(),
        };

        if parts.iter().any(|p| p.trim().is_empty()) {
            return Err(invalid("empty coordinate segment"));
        }

        let artifact = match parts.as_slice() {
            [group, artifact, version] => Artifact::new(*group, *artifact, *version),
            [group, artifact, extension, version] => {
                Artifact::new(*group, *artifact, *version).with_extension(*extension)
            }
            [group, artifact, extension, classifier, version] => {
                Artifact::new(*group, *artifact, *version)
                    .with_extension(*extension)
                    .with_classifier(*classifier)
            }
            _ => return Err(invalid("expected 3 to 5 colon-separated segments")),
        };

        Ok(artifact)
    }
}

/// Dependency scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Available everywhere; the default
    #[default]
    Compile,
    /// Supplied by the runtime container
    Provided,
    /// Needed only at runtime
    Runtime,
    /// Needed only by tests
    Test,
    /// Supplied by the system
    System,
}

impl Scope {
    /// Scopes that do not propagate below the root level.
    #[must_use]
    pub const fn is_non_transitive(self) -> bool {
        matches!(self, Scope::Test | Scope::Provided)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Compile => write!(f, "compile"),
            Scope::Provided => write!(f, "provided"),
            Scope::Runtime => write!(f, "runtime"),
            Scope::Test => write!(f, "test"),
            Scope::System => write!(f, "system"),
        }
    }
}

/// A `groupId:artifactId` pair excluded below a dependency edge.
///
/// Either coordinate may be `*` to match anything.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Exclusion {
    /// Group identifier or `*`
    pub group_id: String,
    /// Artifact identifier or `*`
    pub artifact_id: String,
}

impl Exclusion {
    /// Create an exclusion.
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
        }
    }

    /// Whether this exclusion removes `artifact`.
    pub fn excludes(&self, artifact: &Artifact) -> bool {
        (self.group_id == "*" || self.group_id == artifact.group_id)
            && (self.artifact_id == "*" || self.artifact_id == artifact.artifact_id)
    }
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}

impl FromStr for Exclusion {
    type Err = ModgraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once(':') {
            Some((group, artifact)) if !group.is_empty() && !artifact.is_empty() => {
                Ok(Exclusion::new(group, artifact))
            }
            _ => Err(ModgraphError::InvalidCoordinates {
                coordinates: s.to_string(),
                reason: "exclusions are written groupId:artifactId".to_string(),
            }),
        }
    }
}

/// A dependency edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dependency {
    /// Target artifact
    pub artifact: Artifact,
    /// Scope of the edge
    pub scope: Scope,
    /// Whether the edge is optional
    pub optional: bool,
    /// Exclusions applied to everything below this edge
    pub exclusions: Vec<Exclusion>,
}

impl Dependency {
    /// A compile-scoped, non-optional edge without exclusions.
    pub fn new(artifact: Artifact) -> Self {
        Self {
            artifact,
            scope: Scope::Compile,
            optional: false,
            exclusions: Vec::new(),
        }
    }

    /// Returns a copy with the given scope.
    #[must_use]
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Returns a copy with the optional flag set.
    #[must_use]
    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Returns a copy with an additional exclusion.
    #[must_use]
    pub fn with_exclusion(mut self, exclusion: Exclusion) -> Self {
        self.exclusions.push(exclusion);
        self
    }

    /// Whether any exclusion on this edge removes `artifact`.
    pub fn excludes(&self, artifact: &Artifact) -> bool {
        self.exclusions.iter().any(|e| e.excludes(artifact))
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.artifact, self.scope)?;
        if self.optional {
            write!(f, " optional")?;
        }
        Ok(())
    }
}
