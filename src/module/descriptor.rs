//! Module descriptors.
//!
//! A [`ModuleDescriptor`] is the unit artifacts are classified into. It is either
//! declared in configuration, synthesized for an artifact no rule claims, or
//! cloned from a declared template whose name contains group references
//! (`$1`, `$g1`, ...) that the matching rule's captures fill in.
//!
//! Descriptors are value-identified by `(name, slot)`: two descriptors with the
//! same name and declared slot are the same module, whatever their rules.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::clusion::{ArtifactClusion, ArtifactMatcher, ModuleMatcher};
use crate::core::{Artifact, ModgraphError};
use crate::pattern::{IdPattern, MatchContext};

/// How a module dependency treats service loader files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Services {
    /// Services are not visible across the edge
    #[default]
    None,
    /// Services of the target are imported
    Import,
    /// Services are imported and re-exported
    Export,
}

impl fmt::Display for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Services::None => write!(f, "none"),
            Services::Import => write!(f, "import"),
            Services::Export => write!(f, "export"),
        }
    }
}

/// Processing directives of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Directives {
    /// The module only exists as a naming target; it never collects members.
    pub skip: bool,
    /// Dependencies of this module default to this module's slot.
    pub inherit_slot: bool,
}

/// Attributes of a module dependency; `None` means "not specified here".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DependencyAttributes {
    /// Re-export the target to dependents
    pub export: Option<bool>,
    /// Service visibility
    pub services: Option<Services>,
    /// Optional edge
    pub optional: Option<bool>,
    /// Explicit target slot
    pub slot: Option<String>,
}

/// Attributes applied to every dependency whose target module name matches.
#[derive(Debug, Clone, Default)]
pub struct DependencyOverride {
    /// Target module names the override applies to
    pub matcher: ModuleMatcher,
    /// Attributes to apply
    pub attributes: DependencyAttributes,
}

/// A dependency declared directly on a module rather than resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticDependency {
    /// Target module name
    pub name: String,
    /// Declared attributes
    pub attributes: DependencyAttributes,
}

impl StaticDependency {
    /// A static dependency without attributes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: DependencyAttributes::default(),
        }
    }
}

/// Descriptor content passed through to the module writer unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ModuleFragments {
    /// Module properties
    pub properties: BTreeMap<String, String>,
    /// Entry point class
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_class: Option<String>,
    /// Exported resource paths
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exports: Vec<String>,
}

/// A module: name, slot, classification rules and dependency declarations.
#[derive(Debug, Clone)]
pub struct ModuleDescriptor {
    name: String,
    slot: Option<String>,
    directives: Directives,
    matcher: ArtifactMatcher,
    overrides: Vec<DependencyOverride>,
    static_dependencies: Vec<StaticDependency>,
    fragments: ModuleFragments,
    synthetic: bool,
}

impl ModuleDescriptor {
    /// Starts building a descriptor.
    pub fn builder(name: impl Into<String>) -> ModuleDescriptorBuilder {
        ModuleDescriptorBuilder::new(name)
    }

    /// Synthesizes the module for an artifact that no rule claims.
    ///
    /// The name is the `groupId` when it equals the `artifactId` or already ends
    /// with `.artifactId`, otherwise `groupId.artifactId`.
    ///
    /// ```rust
    /// use modgraph_cli::core::Artifact;
    /// use modgraph_cli::module::ModuleDescriptor;
    ///
    /// let module = ModuleDescriptor::synthesize(&Artifact::new("de.smartics.test", "test-artifact", "1"));
    /// assert_eq!(module.name(), "de.smartics.test.test-artifact");
    ///
    /// let module = ModuleDescriptor::synthesize(&Artifact::new("org.example.lib", "lib", "1"));
    /// assert_eq!(module.name(), "org.example.lib");
    /// ```
    pub fn synthesize(artifact: &Artifact) -> Self {
        let group = &artifact.group_id;
        let id = &artifact.artifact_id;
        let name = if group == id || group.ends_with(&format!(".{id}")) {
            group.clone()
        } else {
            format!("{group}.{id}")
        };

        Self {
            name,
            slot: None,
            directives: Directives::default(),
            matcher: ArtifactMatcher::default(),
            overrides: Vec::new(),
            static_dependencies: Vec::new(),
            fragments: ModuleFragments::default(),
            synthetic: true,
        }
    }

    /// Copy of this descriptor with its name templated from `context`'s captures.
    #[must_use]
    pub fn instantiate(&self, context: &MatchContext) -> Self {
        let mut clone = self.clone();
        clone.name = context.translate_name(&self.name);
        clone
    }

    /// Module name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared slot, if any.
    pub fn slot(&self) -> Option<&str> {
        self.slot.as_deref()
    }

    /// Processing directives.
    pub fn directives(&self) -> Directives {
        self.directives
    }

    /// Whether the module is a naming target only.
    pub fn is_skipped(&self) -> bool {
        self.directives.skip
    }

    /// Whether the module was synthesized rather than declared.
    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    /// Artifact classification rules.
    pub fn matcher(&self) -> &ArtifactMatcher {
        &self.matcher
    }

    /// Applies the classification rules to an artifact.
    pub fn match_artifact(&self, artifact: &Artifact) -> MatchContext {
        self.matcher.match_artifact(artifact)
    }

    /// Per-target dependency overrides in declaration order.
    pub fn overrides(&self) -> &[DependencyOverride] {
        &self.overrides
    }

    /// The attributes of the first override whose matcher accepts `target`.
    pub fn override_for(&self, target: &str) -> Option<&DependencyAttributes> {
        self.overrides.iter().find(|o| o.matcher.is_matched(target)).map(|o| &o.attributes)
    }

    /// Statically declared dependencies.
    pub fn static_dependencies(&self) -> &[StaticDependency] {
        &self.static_dependencies
    }

    /// Pass-through descriptor fragments.
    pub fn fragments(&self) -> &ModuleFragments {
        &self.fragments
    }

    /// Every pattern that failed to compile, with a description of where.
    pub fn invalid_patterns(&self) -> Vec<(String, &IdPattern)> {
        let mut invalid: Vec<(String, &IdPattern)> = self
            .matcher
            .invalid_patterns()
            .map(|p| (format!("module '{}' artifact rule", self.name), p))
            .collect();

        for (index, o) in self.overrides.iter().enumerate() {
            invalid.extend(o.matcher.invalid_patterns().map(|p| {
                (format!("module '{}' apply-to-dependencies #{index}", self.name), p)
            }));
        }

        invalid
    }
}

impl PartialEq for ModuleDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.slot == other.slot
    }
}

impl Eq for ModuleDescriptor {}

impl Hash for ModuleDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.slot.hash(state);
    }
}

impl fmt::Display for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.slot {
            Some(slot) => write!(f, "{}:{}", self.name, slot),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Builder for [`ModuleDescriptor`].
///
/// ```rust
/// use modgraph_cli::module::{ModuleDescriptor, Services};
///
/// let module = ModuleDescriptor::builder("org.slf4j")
///     .slot("1.7")
///     .include(Some("org\\.slf4j"), None)
///     .exclude(None, Some("slf4j-simple"))
///     .static_dependency("javax.api")
///     .build()
///     .unwrap();
///
/// assert_eq!(module.slot(), Some("1.7"));
/// assert_eq!(module.static_dependencies().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ModuleDescriptorBuilder {
    name: String,
    slot: Option<String>,
    directives: Directives,
    includes: Vec<ArtifactClusion>,
    excludes: Vec<ArtifactClusion>,
    overrides: Vec<DependencyOverride>,
    static_dependencies: Vec<StaticDependency>,
    fragments: ModuleFragments,
}

impl ModuleDescriptorBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slot: None,
            directives: Directives::default(),
            includes: Vec::new(),
            excludes: Vec::new(),
            overrides: Vec::new(),
            static_dependencies: Vec::new(),
            fragments: ModuleFragments::default(),
        }
    }

    /// Declared slot; blank slots are treated as undeclared.
    pub fn slot(mut self, slot: impl Into<String>) -> Self {
        let slot = slot.into();
        self.slot = (!slot.trim().is_empty()).then_some(slot);
        self
    }

    /// Marks the module as a naming target only.
    pub fn skip(mut self, skip: bool) -> Self {
        self.directives.skip = skip;
        self
    }

    /// Makes dependencies default to this module's slot.
    pub fn inherit_slot(mut self, inherit: bool) -> Self {
        self.directives.inherit_slot = inherit;
        self
    }

    /// Adds an include rule.
    pub fn include(mut self, group_id: Option<&str>, artifact_id: Option<&str>) -> Self {
        self.includes.push(ArtifactClusion::new(group_id, artifact_id));
        self
    }

    /// Adds an exclude rule.
    pub fn exclude(mut self, group_id: Option<&str>, artifact_id: Option<&str>) -> Self {
        self.excludes.push(ArtifactClusion::new(group_id, artifact_id));
        self
    }

    /// Adds a static dependency without attributes.
    pub fn static_dependency(self, name: impl Into<String>) -> Self {
        self.static_dependency_with(StaticDependency::new(name))
    }

    /// Adds a fully specified static dependency.
    pub fn static_dependency_with(mut self, dependency: StaticDependency) -> Self {
        self.static_dependencies.push(dependency);
        self
    }

    /// Adds a per-target dependency override.
    pub fn apply_to_dependencies(
        mut self,
        matcher: ModuleMatcher,
        attributes: DependencyAttributes,
    ) -> Self {
        self.overrides.push(DependencyOverride {
            matcher,
            attributes,
        });
        self
    }

    /// Adds a module property.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fragments.properties.insert(key.into(), value.into());
        self
    }

    /// Sets the entry point class.
    pub fn main_class(mut self, class: impl Into<String>) -> Self {
        self.fragments.main_class = Some(class.into());
        self
    }

    /// Adds an exported resource path.
    pub fn export_path(mut self, path: impl Into<String>) -> Self {
        self.fragments.exports.push(path.into());
        self
    }

    /// Finishes the descriptor.
    ///
    /// # Errors
    ///
    /// Fails with [`ModgraphError::ConfigError`] if the name is blank.
    pub fn build(self) -> Result<ModuleDescriptor, ModgraphError> {
        if self.name.trim().is_empty() {
            return Err(ModgraphError::ConfigError {
                message: "module name must not be blank".to_string(),
            });
        }

        Ok(ModuleDescriptor {
            name: self.name.trim().to_string(),
            slot: self.slot,
            directives: self.directives,
            matcher: ArtifactMatcher::new(self.includes, self.excludes),
            overrides: self.overrides,
            static_dependencies: self.static_dependencies,
            fragments: self.fragments,
            synthetic: false,
        })
    }
}
