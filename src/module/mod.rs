//! Modules: descriptors, artifact classification and dependency aggregation.
//!
//! - [`descriptor`] - what a module is and how it is declared
//! - [`map`] - the memoizing classifier that assigns artifacts to modules
//! - [`dependencies`] - per-module dependency lists merged from static
//!   declarations and resolved edges

pub mod dependencies;
pub mod descriptor;
pub mod map;

pub use dependencies::{
    AggregationSettings, DependencyOrigin, ModuleDependencyAggregator, ResolvedModuleDependency,
};
pub use descriptor::{
    DependencyAttributes, DependencyOverride, Directives, ModuleDescriptor,
    ModuleDescriptorBuilder, ModuleFragments, Services, StaticDependency,
};
pub use map::{ModuleMap, ModuleMembers, SharedModuleMap, declared_owner, is_owned_by_skipped};
