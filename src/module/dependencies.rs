//! Module dependency aggregation.
//!
//! A module's dependency list combines two sources:
//!
//! - **Static** dependencies declared on the descriptor
//! - **Resolved** dependencies: for every member artifact, its direct
//!   dependencies are resolved and classified, and the owning modules become
//!   dependencies of this module
//!
//! Rules applied per owning module:
//!
//! 1. A module never depends on itself (compared by name)
//! 2. Resolved edges are keyed by target module name; when an optional edge and
//!    a non-optional edge target the same module, the non-optional one wins
//! 3. A static declaration suppresses any resolved edge with the same target
//! 4. Attributes come from the first matching `apply-to-dependencies` override,
//!    then from the declaration or the underlying dependency, then defaults
//! 5. The result is the static entries sorted by name followed by the resolved
//!    entries sorted by name
//!
//! Failing to resolve one member's direct dependencies is logged and the member
//! contributes nothing; aggregation carries on.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{DependencyAttributes, ModuleDescriptor, ModuleMap, Services};
use crate::core::Dependency;
use crate::resolver::{RejectionFlags, Resolver};
use crate::slot::{MAIN_SLOT, SlotStrategy};

/// Global settings that feed attribute resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationSettings {
    /// Slot used when neither a declaration nor the owner supplies one
    pub default_slot: String,
    /// Slot calculation policy
    pub slot_strategy: SlotStrategy,
    /// Drop optional edges
    pub ignore_optional: bool,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            default_slot: MAIN_SLOT.to_string(),
            slot_strategy: SlotStrategy::Main,
            ignore_optional: false,
        }
    }
}

/// Where a module dependency came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyOrigin {
    /// Declared on the descriptor
    Static,
    /// Derived from member artifacts
    Resolved,
}

/// A module dependency with all attributes resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedModuleDependency {
    /// Target module name
    pub name: String,
    /// Target slot
    pub slot: String,
    /// Re-exported to dependents
    pub export: bool,
    /// Optional edge
    pub optional: bool,
    /// Service visibility
    pub services: Services,
    /// Static or resolved
    pub origin: DependencyOrigin,
}

/// Computes per-module dependency lists.
pub struct ModuleDependencyAggregator<'a, R: Resolver + ?Sized> {
    resolver: &'a R,
    settings: &'a AggregationSettings,
    flags: Option<&'a RejectionFlags>,
}

impl<'a, R: Resolver + ?Sized> ModuleDependencyAggregator<'a, R> {
    /// Creates an aggregator.
    pub fn new(resolver: &'a R, settings: &'a AggregationSettings) -> Self {
        Self {
            resolver,
            settings,
            flags: None,
        }
    }

    /// Ignores resolved dependencies on artifacts excluded during collection.
    ///
    /// Artifacts rejected only because their module is skipped stay targets:
    /// the edge to the skipped module is kept, its artifacts are not collected.
    #[must_use]
    pub fn with_flags(mut self, flags: &'a RejectionFlags) -> Self {
        self.flags = Some(flags);
        self
    }

    /// The dependency list of `module`.
    ///
    /// Direct dependencies not classified yet are classified on the way, which
    /// may add modules to `map`.
    pub fn aggregate(
        &self,
        map: &mut ModuleMap,
        module: &ModuleDescriptor,
    ) -> Vec<ResolvedModuleDependency> {
        let statics = self.static_dependencies(map, module);
        let resolved = self.resolved_targets(map, module);

        let mut result = Vec::with_capacity(statics.len() + resolved.len());
        for (name, (target, dependency)) in resolved {
            if statics.contains_key(&name) {
                debug!("Static dependency '{}' of '{}' shadows resolved edge", name, module);
                continue;
            }
            result.push(self.resolve_edge(module, &target, &dependency));
        }
        statics.into_values().chain(result).collect()
    }

    fn static_dependencies(
        &self,
        map: &ModuleMap,
        module: &ModuleDescriptor,
    ) -> BTreeMap<String, ResolvedModuleDependency> {
        let mut statics = BTreeMap::new();
        for declared in module.static_dependencies() {
            if statics.contains_key(&declared.name) {
                continue;
            }

            let fallback = module.override_for(&declared.name);
            let attribute = |pick: fn(&DependencyAttributes) -> Option<bool>| {
                pick(&declared.attributes).or_else(|| fallback.and_then(pick)).unwrap_or(false)
            };
            let target_slot =
                map.descriptors().iter().find(|d| d.name() == declared.name).and_then(|d| d.slot());
            let slot = non_blank(declared.attributes.slot.as_deref())
                .or_else(|| fallback.and_then(|f| non_blank(f.slot.as_deref())))
                .map_or_else(
                    || {
                        let base = self.base_slot(module);
                        self.settings.slot_strategy.calc_slot(base, target_slot, None)
                    },
                    str::to_string,
                );

            statics.insert(
                declared.name.clone(),
                ResolvedModuleDependency {
                    name: declared.name.clone(),
                    slot,
                    export: attribute(|a| a.export),
                    optional: attribute(|a| a.optional),
                    services: declared
                        .attributes
                        .services
                        .or_else(|| fallback.and_then(|f| f.services))
                        .unwrap_or_default(),
                    origin: DependencyOrigin::Static,
                },
            );
        }
        statics
    }

    fn resolved_targets(
        &self,
        map: &mut ModuleMap,
        module: &ModuleDescriptor,
    ) -> BTreeMap<String, (Arc<ModuleDescriptor>, Dependency)> {
        let members = map.members_of(module).to_vec();
        let mut targets: BTreeMap<String, (Arc<ModuleDescriptor>, Dependency)> = BTreeMap::new();

        for member in &members {
            let direct = match self.resolver.resolve_direct(member) {
                Ok(direct) => direct,
                Err(e) => {
                    warn!(
                        "Cannot resolve dependencies of {} in module '{}': {}",
                        member.artifact, module, e
                    );
                    continue;
                }
            };

            for dependency in direct {
                if self.settings.ignore_optional && dependency.optional {
                    continue;
                }
                if self.flags.is_some_and(|flags| flags.is_flagged_by(&dependency, "exclusion")) {
                    continue;
                }

                let target = map.module_for(&dependency);
                if target.name() == module.name() {
                    continue;
                }

                let replace = targets
                    .get(target.name())
                    .is_none_or(|(_, existing)| existing.optional && !dependency.optional);
                if replace {
                    targets.insert(target.name().to_string(), (target, dependency));
                }
            }
        }

        targets
    }

    fn resolve_edge(
        &self,
        module: &ModuleDescriptor,
        target: &ModuleDescriptor,
        dependency: &Dependency,
    ) -> ResolvedModuleDependency {
        let overrides = module.override_for(target.name());
        let slot = overrides.and_then(|o| non_blank(o.slot.as_deref())).map_or_else(
            || {
                self.settings.slot_strategy.calc_slot(
                    self.base_slot(module),
                    target.slot(),
                    Some(&dependency.artifact),
                )
            },
            str::to_string,
        );

        ResolvedModuleDependency {
            name: target.name().to_string(),
            slot,
            export: overrides.and_then(|o| o.export).unwrap_or(false),
            optional: overrides.and_then(|o| o.optional).unwrap_or(dependency.optional),
            services: overrides.and_then(|o| o.services).unwrap_or_default(),
            origin: DependencyOrigin::Resolved,
        }
    }

    /// The owner's slot when it asks for inheritance, else the global default.
    fn base_slot<'m>(&'m self, module: &'m ModuleDescriptor) -> &'m str {
        if module.directives().inherit_slot
            && let Some(slot) = non_blank(module.slot())
        {
            return slot;
        }
        &self.settings.default_slot
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
