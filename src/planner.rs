//! End-to-end module planning.
//!
//! [`ModulePlanner`] runs the whole pipeline for a root dependency set:
//!
//! 1. Collect the pruned transitive closure of the roots. Failure here is fatal
//!    and reported as [`ModgraphError::RootResolutionFailed`]
//! 2. Classify every collected dependency into its module
//! 3. Aggregate each module's dependency list
//! 4. Resolve each module's slot from its first member
//!
//! The result is a [`ModulePlan`], a serializable report of modules, their
//! members and dependencies, and the artifacts pruned on the way.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::ModgraphConfig;
use crate::core::{Dependency, ModgraphError};
use crate::module::{
    AggregationSettings, DependencyOrigin, ModuleDependencyAggregator, ModuleDescriptor,
    ModuleFragments, ModuleMap, ResolvedModuleDependency,
};
use crate::resolver::{ArtifactGraph, Collection, DependencyTraverser, GraphResolver, Resolver};
use crate::slot::SlotStrategy;

/// A planned module.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedModule {
    /// Module name
    pub name: String,
    /// Resolved slot
    pub slot: String,
    /// Created for an artifact no rule claimed
    pub synthetic: bool,
    /// Member coordinates in classification order
    pub members: Vec<String>,
    /// Static dependencies, then resolved ones, each sorted by name
    pub dependencies: Vec<ResolvedModuleDependency>,
    /// Descriptor fragments
    #[serde(flatten)]
    pub fragments: ModuleFragments,
}

/// An artifact rejected by a flagging pruning policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrunedArtifact {
    /// Artifact coordinates
    pub coordinates: String,
    /// Name of the rejecting policy
    pub policy: String,
}

/// The outcome of a planning run.
#[derive(Debug, Clone, Serialize)]
pub struct ModulePlan {
    /// Global default slot
    pub default_slot: String,
    /// Slot policy in effect
    pub slot_strategy: SlotStrategy,
    /// Modules in first-classification order
    pub modules: Vec<PlannedModule>,
    /// Pruned artifacts sorted by coordinates
    pub pruned: Vec<PrunedArtifact>,
}

impl ModulePlan {
    /// Looks up a module by name.
    pub fn module(&self, name: &str) -> Option<&PlannedModule> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Resolved edges naming a planned module under a slot no planned module has.
    ///
    /// Edge slots follow the artifact an edge resolved through while module slots
    /// follow the module's first member; under `version-major` they differ when
    /// a module's members disagree on their major version.
    pub fn slot_mismatches(&self) -> Vec<(&PlannedModule, &ResolvedModuleDependency)> {
        let mut mismatches = Vec::new();
        for module in &self.modules {
            for dependency in &module.dependencies {
                if dependency.origin != DependencyOrigin::Resolved {
                    continue;
                }
                let slots: Vec<&str> = self
                    .modules
                    .iter()
                    .filter(|m| m.name == dependency.name)
                    .map(|m| m.slot.as_str())
                    .collect();
                if !slots.is_empty() && !slots.contains(&dependency.slot.as_str()) {
                    mismatches.push((module, dependency));
                }
            }
        }
        mismatches
    }
}

/// Runs classification and aggregation against a resolver.
pub struct ModulePlanner<R: Resolver> {
    resolver: R,
    descriptors: Vec<ModuleDescriptor>,
    settings: AggregationSettings,
}

impl ModulePlanner<GraphResolver> {
    /// A planner over an in-memory graph, pruned as `config` describes.
    ///
    /// # Errors
    ///
    /// [`ModgraphError::MissingModuleName`] for unnamed modules.
    pub fn from_config(
        config: &ModgraphConfig,
        graph: ArtifactGraph,
    ) -> Result<Self, ModgraphError> {
        let descriptors = config.descriptors()?;
        let pruning = config.pruning_settings();

        if let Some(cycle) = graph.detect_cycles() {
            let path: Vec<String> = cycle.iter().map(ToString::to_string).collect();
            warn!("Dependency cycle: {}", path.join(" -> "));
        }

        let shared: Vec<Arc<ModuleDescriptor>> =
            descriptors.iter().cloned().map(Arc::new).collect();
        let resolver = GraphResolver::new(graph)
            .with_collection_traverser(DependencyTraverser::for_collection(&pruning, shared))
            .with_direct_traverser(DependencyTraverser::for_direct(&pruning));

        Ok(Self::new(resolver, descriptors, config.aggregation_settings()))
    }
}

impl<R: Resolver> ModulePlanner<R> {
    /// Creates a planner.
    pub fn new(
        resolver: R,
        descriptors: Vec<ModuleDescriptor>,
        settings: AggregationSettings,
    ) -> Self {
        Self {
            resolver,
            descriptors,
            settings,
        }
    }

    /// Collects the roots and classifies every collected dependency.
    ///
    /// # Errors
    ///
    /// [`ModgraphError::RootResolutionFailed`] if the roots cannot be resolved.
    pub fn classify(
        &self,
        roots: &[Dependency],
    ) -> Result<(ModuleMap, Collection), ModgraphError> {
        info!("Resolving {} root dependencies", roots.len());
        let collection = self.resolver.collect(roots).map_err(root_failure)?;

        let mut map = ModuleMap::new(self.descriptors.iter().cloned());
        for dependency in &collection.dependencies {
            map.classify(dependency);
        }
        debug!(
            "Classified {} artifacts into {} modules",
            map.classified_count(),
            map.entries().len()
        );

        Ok((map, collection))
    }

    /// Runs the full pipeline.
    ///
    /// # Errors
    ///
    /// [`ModgraphError::RootResolutionFailed`] if the roots cannot be resolved.
    pub fn plan(&self, roots: &[Dependency]) -> Result<ModulePlan, ModgraphError> {
        let (mut map, collection) = self.classify(roots)?;
        let aggregator = ModuleDependencyAggregator::new(&self.resolver, &self.settings)
            .with_flags(&collection.flags);

        let mut modules = Vec::new();
        // aggregation may classify new artifacts, which appends entries
        let mut index = 0;
        while index < map.entries().len() {
            let module = Arc::clone(&map.entries()[index].module);
            let dependencies = aggregator.aggregate(&mut map, &module);
            modules.push(self.planned_module(&map, &module, dependencies));
            index += 1;
        }

        let pruned = collection
            .flags
            .sorted()
            .into_iter()
            .map(|(artifact, policy)| PrunedArtifact {
                coordinates: artifact.to_string(),
                policy: policy.to_string(),
            })
            .collect();

        let plan = ModulePlan {
            default_slot: self.settings.default_slot.clone(),
            slot_strategy: self.settings.slot_strategy,
            modules,
            pruned,
        };
        for (module, dependency) in plan.slot_mismatches() {
            debug!(
                "{}:{} depends on {}:{}, which is planned under another slot",
                module.name, module.slot, dependency.name, dependency.slot
            );
        }

        info!("Planned {} modules", plan.modules.len());
        Ok(plan)
    }

    fn planned_module(
        &self,
        map: &ModuleMap,
        module: &ModuleDescriptor,
        dependencies: Vec<ResolvedModuleDependency>,
    ) -> PlannedModule {
        let members = map.members_of(module);
        let slot = self.settings.slot_strategy.calc_slot(
            &self.settings.default_slot,
            module.slot(),
            members.first().map(|d| &d.artifact),
        );

        PlannedModule {
            name: module.name().to_string(),
            slot,
            synthetic: module.is_synthetic(),
            members: members.iter().map(|d| d.artifact.to_string()).collect(),
            dependencies,
            fragments: module.fragments().clone(),
        }
    }
}

/// Every root resolution failure is reported as [`ModgraphError::RootResolutionFailed`].
fn root_failure(error: ModgraphError) -> ModgraphError {
    match error {
        ModgraphError::RootResolutionFailed {
            ..
        } => error,
        ModgraphError::ArtifactNotFound {
            coordinates,
        } => ModgraphError::RootResolutionFailed {
            reason: format!("artifact '{coordinates}' cannot be resolved"),
            coordinates: Some(coordinates),
        },
        other => ModgraphError::RootResolutionFailed {
            reason: other.to_string(),
            coordinates: None,
        },
    }
}
