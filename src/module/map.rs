//! Artifact classification into modules.
//!
//! [`ModuleMap`] decides, for every resolved dependency, which module owns it.
//! Classification is memoized by artifact identity: once an artifact has been
//! classified, every identity-equal artifact maps to the same module without the
//! rules being evaluated again, and it is recorded as a member at most once.
//!
//! # Algorithm
//!
//! 1. Look the artifact up in the memo and return the module on a hit
//! 2. Scan declared descriptors in order; the first whose rules match wins.
//!    If the match captured groups, the artifact goes to a copy of the
//!    descriptor whose name is templated from the captures
//! 3. With no match, synthesize a module from `groupId`/`artifactId`
//! 4. Canonicalize the module by identity (`name`, `slot`) so that every path
//!    to the same module shares one instance
//! 5. Record membership unless the module is skipped, then memoize
//!
//! Descriptors without include rules never claim artifacts during the scan
//! (they would otherwise claim all of them); they are still reachable as the
//! canonical instance of a synthesized module with the same identity.
//!
//! # Concurrency
//!
//! `ModuleMap` is a single-writer structure: classification takes `&mut self`.
//! Callers that generate module output in parallel share it through
//! [`SharedModuleMap`], which serializes every call.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};

use super::ModuleDescriptor;
use crate::core::{Artifact, Dependency, ModgraphError};
use crate::pattern::MatchContext;

/// A module together with its member dependencies in first-insertion order.
#[derive(Debug, Clone)]
pub struct ModuleMembers {
    /// The owning module
    pub module: Arc<ModuleDescriptor>,
    /// Member dependencies, one per artifact identity
    pub dependencies: Vec<Dependency>,
}

/// Memoizing artifact-to-module classifier.
#[derive(Debug, Default)]
pub struct ModuleMap {
    /// Declared descriptors in declaration order
    descriptors: Vec<Arc<ModuleDescriptor>>,
    /// Every module known so far, in creation order
    modules: Vec<Arc<ModuleDescriptor>>,
    /// Canonical instance per module identity
    canonical: HashSet<Arc<ModuleDescriptor>>,
    /// Modules with members, in first-insertion order
    entries: Vec<ModuleMembers>,
    entry_index: HashMap<Arc<ModuleDescriptor>, usize>,
    /// Artifact identity to owning module
    memo: HashMap<Artifact, Arc<ModuleDescriptor>>,
}

impl ModuleMap {
    /// Creates a classifier over declared descriptors.
    ///
    /// When two descriptors share an identity the first one is canonical.
    pub fn new(descriptors: impl IntoIterator<Item = ModuleDescriptor>) -> Self {
        let mut map = Self::default();
        for descriptor in descriptors {
            let descriptor = map.canonicalize(Arc::new(descriptor));
            map.descriptors.push(descriptor);
        }
        map
    }

    /// Declared descriptors in declaration order.
    pub fn descriptors(&self) -> &[Arc<ModuleDescriptor>] {
        &self.descriptors
    }

    /// Every known module: declared, cloned from templates, and synthesized.
    pub fn modules(&self) -> &[Arc<ModuleDescriptor>] {
        &self.modules
    }

    /// Classifies a dependency and returns its owning module.
    ///
    /// Idempotent for identity-equal artifacts.
    pub fn classify(&mut self, dependency: &Dependency) -> Arc<ModuleDescriptor> {
        if let Some(module) = self.memo.get(&dependency.artifact) {
            trace!("Memo hit for {} -> {}", dependency.artifact, module);
            return Arc::clone(module);
        }

        let module = self.canonicalize(self.select(&dependency.artifact));

        if module.is_skipped() {
            debug!("Classified {} into skipped module {}", dependency.artifact, module);
        } else {
            debug!("Classified {} into {}", dependency.artifact, module);
            self.add_member(&module, dependency);
        }

        self.memo.insert(dependency.artifact.clone(), Arc::clone(&module));
        module
    }

    /// The module of an already classified dependency.
    pub fn find(&self, dependency: &Dependency) -> Option<Arc<ModuleDescriptor>> {
        self.memo.get(&dependency.artifact).cloned()
    }

    /// The module of a dependency, classifying it first if needed.
    pub fn module_for(&mut self, dependency: &Dependency) -> Arc<ModuleDescriptor> {
        match self.find(dependency) {
            Some(module) => module,
            None => self.classify(dependency),
        }
    }

    /// The module of a dependency that must already be classified.
    ///
    /// # Errors
    ///
    /// [`ModgraphError::ModuleNotFound`] if the dependency was never classified.
    pub fn require(&self, dependency: &Dependency) -> Result<Arc<ModuleDescriptor>, ModgraphError> {
        self.find(dependency).ok_or_else(|| ModgraphError::ModuleNotFound {
            coordinates: dependency.artifact.to_string(),
        })
    }

    /// Member dependencies of a module; empty for unknown or skipped modules.
    pub fn members_of(&self, module: &ModuleDescriptor) -> &[Dependency] {
        self.entry_index
            .get(module)
            .map_or(&[], |&index| self.entries[index].dependencies.as_slice())
    }

    /// Modules with members, in first-insertion order.
    pub fn entries(&self) -> &[ModuleMembers] {
        &self.entries
    }

    /// Owned projection of [`entries`](Self::entries) for downstream writers.
    pub fn to_map(&self) -> Vec<ModuleMembers> {
        self.entries.clone()
    }

    /// Number of distinct classified artifacts.
    pub fn classified_count(&self) -> usize {
        self.memo.len()
    }

    fn select(&self, artifact: &Artifact) -> Arc<ModuleDescriptor> {
        if let Some((descriptor, context)) = declared_owner(&self.descriptors, artifact) {
            if context.has_group_match() {
                let instance = descriptor.instantiate(&context);
                trace!(
                    "Rule of '{}' captured groups for {}, templated name '{}'",
                    descriptor.name(),
                    artifact,
                    instance.name()
                );
                return Arc::new(instance);
            }
            return Arc::clone(descriptor);
        }

        trace!("No declared module claims {}, synthesizing", artifact);
        Arc::new(ModuleDescriptor::synthesize(artifact))
    }

    fn canonicalize(&mut self, module: Arc<ModuleDescriptor>) -> Arc<ModuleDescriptor> {
        if let Some(existing) = self.canonical.get(&module) {
            return Arc::clone(existing);
        }
        self.canonical.insert(Arc::clone(&module));
        self.modules.push(Arc::clone(&module));
        module
    }

    fn add_member(&mut self, module: &Arc<ModuleDescriptor>, dependency: &Dependency) {
        let index = match self.entry_index.get(module) {
            Some(&index) => index,
            None => {
                self.entries.push(ModuleMembers {
                    module: Arc::clone(module),
                    dependencies: Vec::new(),
                });
                self.entry_index.insert(Arc::clone(module), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };

        let members = &mut self.entries[index].dependencies;
        if !members.iter().any(|m| m.artifact == dependency.artifact) {
            members.push(dependency.clone());
        }
    }
}

/// The first declared descriptor whose include rules claim `artifact`.
pub fn declared_owner<'a>(
    descriptors: &'a [Arc<ModuleDescriptor>],
    artifact: &Artifact,
) -> Option<(&'a Arc<ModuleDescriptor>, MatchContext)> {
    descriptors.iter().filter(|d| d.matcher().has_includes()).find_map(|descriptor| {
        let context = descriptor.match_artifact(artifact);
        context.is_matched().then_some((descriptor, context))
    })
}

/// Whether `artifact` would be classified into a skipped module.
///
/// Evaluated without touching a [`ModuleMap`], so pruning can ask before the
/// artifact is collected.
pub fn is_owned_by_skipped(descriptors: &[Arc<ModuleDescriptor>], artifact: &Artifact) -> bool {
    match declared_owner(descriptors, artifact) {
        Some((descriptor, _)) => descriptor.is_skipped(),
        None => {
            let synthetic = ModuleDescriptor::synthesize(artifact);
            descriptors.iter().any(|d| d.is_skipped() && d.as_ref() == &synthetic)
        }
    }
}

/// A [`ModuleMap`] shared between threads; every call holds the lock for its duration.
#[derive(Debug, Clone, Default)]
pub struct SharedModuleMap {
    inner: Arc<Mutex<ModuleMap>>,
}

impl SharedModuleMap {
    /// Wraps a classifier.
    pub fn new(map: ModuleMap) -> Self {
        Self {
            inner: Arc::new(Mutex::new(map)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ModuleMap> {
        // Classification never leaves the map half-updated, so a poisoned lock is usable
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// See [`ModuleMap::classify`].
    pub fn classify(&self, dependency: &Dependency) -> Arc<ModuleDescriptor> {
        self.lock().classify(dependency)
    }

    /// See [`ModuleMap::find`].
    pub fn find(&self, dependency: &Dependency) -> Option<Arc<ModuleDescriptor>> {
        self.lock().find(dependency)
    }

    /// See [`ModuleMap::to_map`].
    pub fn to_map(&self) -> Vec<ModuleMembers> {
        self.lock().to_map()
    }

    /// Runs `f` with exclusive access to the classifier.
    pub fn with<T>(&self, f: impl FnOnce(&mut ModuleMap) -> T) -> T {
        f(&mut self.lock())
    }
}
