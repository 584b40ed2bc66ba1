//! Configuration loading.
//!
//! Two TOML documents drive a run:
//!
//! - `modgraph.toml` ([`ModgraphConfig`]) - global settings, global dependency
//!   excludes and the ordered module descriptors
//! - the dependency graph ([`GraphInput`]) - root dependencies and every
//!   artifact's direct dependencies
//!
//! # `modgraph.toml`
//!
//! ```toml
//! default-slot = "main"
//! slot-strategy = "version-major"
//! ignore-optional-dependencies = false
//! ignore-test-scope = true
//!
//! [[exclude]]
//! group-id = "junit"
//!
//! [[module]]
//! name = "$g1.services"
//! inherit-slot = true
//! properties = { "jboss.api" = "private" }
//!
//! [[module.include]]
//! group-id = "(de.smartics.test)"
//! artifact-id = "service-.*"
//!
//! [[module.dependency]]
//! name = "javax.api"
//! services = "import"
//!
//! [[module.apply-to-dependencies]]
//! include = ["org\\.slf4j.*"]
//! export = true
//! ```
//!
//! Patterns are literal identifiers or regular expressions that must match the
//! whole input. A pattern that is not a valid regular expression is compared
//! literally and reported by [`ModgraphConfig::invalid_patterns`].

pub mod graph;

pub use graph::{ArtifactEntry, DependencySpec, DetailedDependency, GraphInput};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tokio::fs;

use crate::clusion::{ArtifactClusion, ArtifactMatcher, ModuleMatcher};
use crate::core::ModgraphError;
use crate::module::{
    AggregationSettings, DependencyAttributes, ModuleDescriptor, Services, StaticDependency,
};
use crate::resolver::PruningSettings;
use crate::slot::{MAIN_SLOT, SlotStrategy};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "modgraph.toml";

/// Settings and module descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ModgraphConfig {
    /// Slot used when nothing more specific applies
    #[serde(default = "default_slot")]
    pub default_slot: String,

    /// Slot calculation policy
    #[serde(default)]
    pub slot_strategy: SlotStrategy,

    /// Prune optional edges and ignore them during aggregation
    #[serde(default)]
    pub ignore_optional_dependencies: bool,

    /// Prune `test` and `provided` edges below the roots
    #[serde(default = "default_true")]
    pub ignore_test_scope: bool,

    /// Global dependency excludes
    #[serde(default, rename = "exclude")]
    pub excludes: Vec<ClusionConfig>,

    /// Module descriptors in classification order
    #[serde(default, rename = "module")]
    pub modules: Vec<ModuleConfig>,
}

fn default_slot() -> String {
    MAIN_SLOT.to_string()
}

const fn default_true() -> bool {
    true
}

impl Default for ModgraphConfig {
    fn default() -> Self {
        Self {
            default_slot: default_slot(),
            slot_strategy: SlotStrategy::default(),
            ignore_optional_dependencies: false,
            ignore_test_scope: true,
            excludes: Vec::new(),
            modules: Vec::new(),
        }
    }
}

/// An artifact rule: both patterns optional, absent ones do not constrain.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClusionConfig {
    /// `groupId` pattern
    pub group_id: Option<String>,
    /// `artifactId` pattern
    pub artifact_id: Option<String>,
}

impl ClusionConfig {
    fn to_clusion(&self) -> ArtifactClusion {
        ArtifactClusion::new(self.group_id.as_deref(), self.artifact_id.as_deref())
    }
}

/// Dependency attributes shared by static declarations and overrides.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AttributesConfig {
    /// Re-export the target
    pub export: Option<bool>,
    /// Service visibility
    pub services: Option<Services>,
    /// Optional edge
    pub optional: Option<bool>,
    /// Target slot
    pub slot: Option<String>,
}

impl From<&AttributesConfig> for DependencyAttributes {
    fn from(config: &AttributesConfig) -> Self {
        Self {
            export: config.export,
            services: config.services,
            optional: config.optional,
            slot: config.slot.clone(),
        }
    }
}

/// `[[module.dependency]]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StaticDependencyConfig {
    /// Target module name
    pub name: String,
    /// Declared attributes
    #[serde(flatten)]
    pub attributes: AttributesConfig,
}

/// `[[module.apply-to-dependencies]]`
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApplyToDependenciesConfig {
    /// Target module name patterns; empty matches every target
    #[serde(default)]
    pub include: Vec<String>,
    /// Target module name patterns excluded from the override
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Attributes to apply
    #[serde(flatten)]
    pub attributes: AttributesConfig,
}

/// `[[module]]`
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ModuleConfig {
    /// Module name, possibly a template with `$N`/`$gN` references
    pub name: Option<String>,
    /// Declared slot
    pub slot: Option<String>,
    /// Naming target only
    #[serde(default)]
    pub skip: bool,
    /// Dependencies default to this module's slot
    #[serde(default)]
    pub inherit_slot: bool,
    /// Entry point class
    pub main_class: Option<String>,
    /// Exported resource paths
    #[serde(default)]
    pub exports: Vec<String>,
    /// Module properties
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    /// Include rules
    #[serde(default)]
    pub include: Vec<ClusionConfig>,
    /// Exclude rules
    #[serde(default)]
    pub exclude: Vec<ClusionConfig>,
    /// Static dependencies
    #[serde(default)]
    pub dependency: Vec<StaticDependencyConfig>,
    /// Per-target dependency overrides
    #[serde(default)]
    pub apply_to_dependencies: Vec<ApplyToDependenciesConfig>,
}

impl ModuleConfig {
    /// Builds the descriptor; `index` is the module's position in the file.
    ///
    /// # Errors
    ///
    /// [`ModgraphError::MissingModuleName`] if the name is absent or blank.
    pub fn to_descriptor(&self, index: usize) -> Result<ModuleDescriptor, ModgraphError> {
        let name = self
            .name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .ok_or(ModgraphError::MissingModuleName {
                index,
            })?;

        let mut builder =
            ModuleDescriptor::builder(name).skip(self.skip).inherit_slot(self.inherit_slot);
        if let Some(slot) = &self.slot {
            builder = builder.slot(slot.as_str());
        }
        for rule in &self.include {
            builder = builder.include(rule.group_id.as_deref(), rule.artifact_id.as_deref());
        }
        for rule in &self.exclude {
            builder = builder.exclude(rule.group_id.as_deref(), rule.artifact_id.as_deref());
        }
        for dependency in &self.dependency {
            builder = builder.static_dependency_with(StaticDependency {
                name: dependency.name.clone(),
                attributes: DependencyAttributes::from(&dependency.attributes),
            });
        }
        for apply in &self.apply_to_dependencies {
            builder = builder.apply_to_dependencies(
                ModuleMatcher::from_patterns(&apply.include, &apply.exclude),
                DependencyAttributes::from(&apply.attributes),
            );
        }
        for (key, value) in &self.properties {
            builder = builder.property(key.as_str(), value.as_str());
        }
        if let Some(class) = &self.main_class {
            builder = builder.main_class(class.as_str());
        }
        for path in &self.exports {
            builder = builder.export_path(path.as_str());
        }

        builder.build()
    }
}

/// A pattern that did not compile as a regular expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternIssue {
    /// Where the pattern is declared
    pub location: String,
    /// Pattern source
    pub pattern: String,
    /// Compiler message
    pub reason: String,
}

impl PatternIssue {
    /// The issue as a hard error.
    pub fn to_error(&self) -> ModgraphError {
        ModgraphError::InvalidPattern {
            pattern: self.pattern.clone(),
            location: self.location.clone(),
            reason: self.reason.clone(),
        }
    }
}

impl fmt::Display for PatternIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' in {}: {}", self.pattern, self.location, self.reason)
    }
}

impl ModgraphConfig {
    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, is not valid TOML, or declares a
    /// module without a name.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// [`ModgraphError::TomlError`] for malformed documents and
    /// [`ModgraphError::MissingModuleName`] for unnamed modules.
    pub fn from_toml_str(content: &str) -> Result<Self, ModgraphError> {
        let config: Self = toml::from_str(content)?;

        if let Some(index) = config
            .modules
            .iter()
            .position(|m| m.name.as_deref().is_none_or(|name| name.trim().is_empty()))
        {
            return Err(ModgraphError::MissingModuleName {
                index,
            });
        }

        Ok(config)
    }

    /// Module descriptors in declaration order.
    ///
    /// # Errors
    ///
    /// [`ModgraphError::MissingModuleName`] for unnamed modules.
    pub fn descriptors(&self) -> Result<Vec<ModuleDescriptor>, ModgraphError> {
        self.modules.iter().enumerate().map(|(index, m)| m.to_descriptor(index)).collect()
    }

    /// The global excludes as a deny-only rule set.
    pub fn global_excludes(&self) -> ArtifactMatcher {
        let excludes = self.excludes.iter().map(ClusionConfig::to_clusion).collect();
        ArtifactMatcher::new(Vec::new(), excludes)
    }

    /// Settings for the pruning traversers.
    pub fn pruning_settings(&self) -> PruningSettings {
        PruningSettings {
            excludes: self.global_excludes(),
            ignore_optional: self.ignore_optional_dependencies,
            ignore_test_scope: self.ignore_test_scope,
        }
    }

    /// Settings for module dependency aggregation.
    pub fn aggregation_settings(&self) -> AggregationSettings {
        AggregationSettings {
            default_slot: self.default_slot.clone(),
            slot_strategy: self.slot_strategy,
            ignore_optional: self.ignore_optional_dependencies,
        }
    }

    /// Every pattern in the configuration that failed to compile.
    ///
    /// # Errors
    ///
    /// [`ModgraphError::MissingModuleName`] for unnamed modules.
    pub fn invalid_patterns(&self) -> Result<Vec<PatternIssue>, ModgraphError> {
        let mut issues: Vec<PatternIssue> = self
            .global_excludes()
            .invalid_patterns()
            .map(|pattern| PatternIssue {
                location: "global exclude".to_string(),
                pattern: pattern.source().to_string(),
                reason: pattern.invalid_reason().unwrap_or_default().to_string(),
            })
            .collect();

        for descriptor in self.descriptors()? {
            issues.extend(descriptor.invalid_patterns().into_iter().map(|(location, pattern)| {
                PatternIssue {
                    location,
                    pattern: pattern.source().to_string(),
                    reason: pattern.invalid_reason().unwrap_or_default().to_string(),
                }
            }));
        }

        Ok(issues)
    }
}
