//! Graph pruning during dependency expansion.
//!
//! A [`DependencyTraverser`] is an ordered list of named pruning policies. For
//! every candidate edge the policies are evaluated in order; the first one that
//! rejects stops evaluation and the edge is pruned together with everything
//! below it. An edge is kept only if every policy accepts it.
//!
//! The traverser carries no per-depth state. Child edges are evaluated with the
//! same policy list; depth-dependent policies read the ancestor chain from the
//! [`TraversalContext`] instead.
//!
//! # Standard policies
//!
//! | Policy | Rejects | Flags |
//! |---|---|---|
//! | `exclusion` | globally excluded artifacts and artifacts excluded by an ancestor edge | yes |
//! | `skip-module` | artifacts owned by a skipped module | yes |
//! | `optional` | optional edges, when optional dependencies are ignored | no |
//! | `transitive-scope` | `test`/`provided` edges below the roots | no |
//!
//! Flagging policies reject the artifact itself rather than one path to it, so
//! their rejections are recorded in [`RejectionFlags`](super::RejectionFlags) and
//! honored after collection.

use std::fmt;
use std::sync::Arc;
use tracing::trace;

use crate::clusion::ArtifactMatcher;
use crate::core::Dependency;
use crate::module::{ModuleDescriptor, is_owned_by_skipped};

/// The chain of edges leading to a candidate, root first.
#[derive(Debug, Clone, Copy)]
pub struct TraversalContext<'a> {
    /// Ancestor edges, root first; empty for root edges
    pub ancestors: &'a [Dependency],
}

impl<'a> TraversalContext<'a> {
    /// Context for root edges.
    pub fn root() -> Self {
        Self {
            ancestors: &[],
        }
    }

    /// Context below the given ancestor chain.
    pub fn new(ancestors: &'a [Dependency]) -> Self {
        Self {
            ancestors,
        }
    }

    /// Number of edges above the candidate.
    pub fn depth(&self) -> usize {
        self.ancestors.len()
    }

    /// Whether the candidate is a root edge.
    pub fn is_root(&self) -> bool {
        self.ancestors.is_empty()
    }
}

/// Outcome of evaluating a candidate edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Every policy accepted the edge
    Accept,
    /// A policy rejected the edge
    Reject {
        /// Name of the rejecting policy
        policy: &'static str,
        /// Whether the rejection must be recorded as a flag on the artifact
        flag: bool,
    },
}

impl Verdict {
    /// Whether the edge is kept.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accept)
    }
}

type Predicate = Box<dyn Fn(&Dependency, &TraversalContext<'_>) -> bool + Send + Sync>;

/// One named pruning predicate; the predicate returns `true` to accept.
pub struct PruningPolicy {
    name: &'static str,
    flags_rejections: bool,
    accepts: Predicate,
}

impl PruningPolicy {
    /// Wraps an accepting predicate.
    pub fn new(
        name: &'static str,
        flags_rejections: bool,
        accepts: impl Fn(&Dependency, &TraversalContext<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            flags_rejections,
            accepts: Box::new(accepts),
        }
    }

    /// Policy name used in logs and rejection flags.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Rejects artifacts matched by the global excludes or by an exclusion
    /// declared on any ancestor edge.
    pub fn exclusion(global_excludes: ArtifactMatcher) -> Self {
        Self::new("exclusion", true, move |dependency, context| {
            let artifact = &dependency.artifact;
            !global_excludes.is_excluded(artifact)
                && !context.ancestors.iter().any(|ancestor| ancestor.excludes(artifact))
        })
    }

    /// Rejects artifacts that classify into a skipped module.
    pub fn skip_module(descriptors: Vec<Arc<ModuleDescriptor>>) -> Self {
        Self::new("skip-module", true, move |dependency, _| {
            !is_owned_by_skipped(&descriptors, &dependency.artifact)
        })
    }

    /// Rejects every optional edge.
    pub fn optional() -> Self {
        Self::new("optional", false, |dependency, _| !dependency.optional)
    }

    /// Rejects `test` and `provided` edges that are not roots.
    pub fn transitive_scope() -> Self {
        Self::new("transitive-scope", false, |dependency, context| {
            context.is_root() || !dependency.scope.is_non_transitive()
        })
    }
}

impl fmt::Debug for PruningPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PruningPolicy")
            .field("name", &self.name)
            .field("flags_rejections", &self.flags_rejections)
            .finish_non_exhaustive()
    }
}

/// Settings that select and parameterize the standard policies.
#[derive(Debug, Clone, Default)]
pub struct PruningSettings {
    /// Global excludes (only the exclude rules are consulted)
    pub excludes: ArtifactMatcher,
    /// Prune optional edges
    pub ignore_optional: bool,
    /// Prune `test`/`provided` edges below the roots
    pub ignore_test_scope: bool,
}

/// Ordered list of pruning policies.
#[derive(Debug, Default)]
pub struct DependencyTraverser {
    policies: Vec<PruningPolicy>,
}

impl DependencyTraverser {
    /// A traverser that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a policy; policies run in insertion order.
    #[must_use]
    pub fn with_policy(mut self, policy: PruningPolicy) -> Self {
        self.policies.push(policy);
        self
    }

    /// Policies for collecting the transitive graph from the roots.
    pub fn for_collection(
        settings: &PruningSettings,
        descriptors: Vec<Arc<ModuleDescriptor>>,
    ) -> Self {
        let traverser = Self::new()
            .with_policy(PruningPolicy::exclusion(settings.excludes.clone()))
            .with_policy(PruningPolicy::skip_module(descriptors));
        traverser.with_edge_policies(settings)
    }

    /// Policies for direct dependency queries of module members.
    ///
    /// Skipped modules stay visible here: depending on one is legitimate, only
    /// collecting its artifacts is not.
    pub fn for_direct(settings: &PruningSettings) -> Self {
        Self::new()
            .with_policy(PruningPolicy::exclusion(settings.excludes.clone()))
            .with_edge_policies(settings)
    }

    fn with_edge_policies(mut self, settings: &PruningSettings) -> Self {
        if settings.ignore_optional {
            self = self.with_policy(PruningPolicy::optional());
        }
        if settings.ignore_test_scope {
            self = self.with_policy(PruningPolicy::transitive_scope());
        }
        self
    }

    /// Policy names in evaluation order.
    pub fn policy_names(&self) -> Vec<&'static str> {
        self.policies.iter().map(PruningPolicy::name).collect()
    }

    /// Evaluates a candidate edge; the first rejecting policy decides.
    pub fn evaluate(&self, dependency: &Dependency, context: &TraversalContext<'_>) -> Verdict {
        for policy in &self.policies {
            if !(policy.accepts)(dependency, context) {
                trace!(
                    "Policy '{}' pruned {} at depth {}",
                    policy.name,
                    dependency.artifact,
                    context.depth()
                );
                return Verdict::Reject {
                    policy: policy.name,
                    flag: policy.flags_rejections,
                };
            }
        }
        Verdict::Accept
    }

    /// The traverser for a child edge, which is this one.
    pub fn derive_child(&self) -> &Self {
        self
    }
}
