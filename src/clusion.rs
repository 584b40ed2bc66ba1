//! Inclusion and exclusion rules ("clusions").
//!
//! A clusion is one rule of an include or exclude list. Artifact-level rules
//! constrain `groupId` and/or `artifactId`; module-level rules constrain a module
//! name. A sub-pattern that is absent from the rule does not constrain, so a rule
//! may name only a group, only an artifact, or both.
//!
//! Rule sets ([`ArtifactMatcher`], [`ModuleMatcher`]) evaluate in two steps:
//!
//! 1. **Include** - with no include rules every candidate is included;
//!    otherwise the first include rule (declaration order) that matches decides
//! 2. **Exclude** - any matching exclude rule rejects the candidate, whatever
//!    the include outcome
//!
//! The returned [`MatchContext`] carries the captures of the deciding include
//! rule so its groups can template module names.
//!
//! # Examples
//!
//! ```rust
//! use modgraph_cli::clusion::{ArtifactClusion, ArtifactMatcher};
//! use modgraph_cli::core::Artifact;
//!
//! let matcher = ArtifactMatcher::new(
//!     vec![ArtifactClusion::new(None, Some(".*"))],
//!     vec![ArtifactClusion::new(None, Some("^test-.*$"))],
//! );
//!
//! assert!(matcher.is_matched(&Artifact::new("g", "core", "1.0")));
//! assert!(!matcher.is_matched(&Artifact::new("g", "test-foo", "1.0")));
//! ```

use std::fmt;

use crate::core::Artifact;
use crate::pattern::{IdPattern, MatchContext, match_optional};

/// An artifact-level rule on `groupId` and `artifactId`.
#[derive(Debug, Clone, Default)]
pub struct ArtifactClusion {
    group_id: Option<IdPattern>,
    artifact_id: Option<IdPattern>,
}

impl ArtifactClusion {
    /// Compiles a rule; blank or missing identifiers do not constrain.
    pub fn new(group_id: Option<&str>, artifact_id: Option<&str>) -> Self {
        Self {
            group_id: group_id.and_then(IdPattern::compile),
            artifact_id: artifact_id.and_then(IdPattern::compile),
        }
    }

    /// The compiled `groupId` pattern, if any.
    pub fn group_id(&self) -> Option<&IdPattern> {
        self.group_id.as_ref()
    }

    /// The compiled `artifactId` pattern, if any.
    pub fn artifact_id(&self) -> Option<&IdPattern> {
        self.artifact_id.as_ref()
    }

    /// Applies the rule to an artifact.
    pub fn match_artifact(&self, artifact: &Artifact) -> MatchContext {
        MatchContext::double(
            self.group_id.as_ref().map(|p| p.match_input(&artifact.group_id)),
            self.artifact_id.as_ref().map(|p| p.match_input(&artifact.artifact_id)),
        )
    }

    /// Patterns of this rule that failed to compile.
    pub fn invalid_patterns(&self) -> impl Iterator<Item = &IdPattern> {
        self.group_id.iter().chain(self.artifact_id.iter()).filter(|p| p.is_invalid())
    }
}

impl fmt::Display for ArtifactClusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let group = self.group_id.as_ref().map_or("*", IdPattern::source);
        let artifact = self.artifact_id.as_ref().map_or("*", IdPattern::source);
        write!(f, "{group}:{artifact}")
    }
}

/// A module-level rule on the module name.
#[derive(Debug, Clone, Default)]
pub struct ModuleClusion {
    name: Option<IdPattern>,
}

impl ModuleClusion {
    /// Compiles a rule; a blank name does not constrain.
    pub fn new(name: &str) -> Self {
        Self {
            name: IdPattern::compile(name),
        }
    }

    /// The compiled name pattern, if any.
    pub fn name(&self) -> Option<&IdPattern> {
        self.name.as_ref()
    }

    /// Applies the rule to a module name.
    pub fn match_name(&self, name: &str) -> MatchContext {
        let rule = self.name.as_ref().map_or("", IdPattern::source).to_string();
        MatchContext::single(match_optional(self.name.as_ref(), name), rule)
    }
}

impl fmt::Display for ModuleClusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name.as_ref().map_or("*", IdPattern::source))
    }
}

/// Shared include-then-exclude evaluation.
fn evaluate<R>(
    includes: &[R],
    excludes: &[R],
    mut apply: impl FnMut(&R) -> MatchContext,
) -> MatchContext {
    let included = if includes.is_empty() {
        MatchContext::matched_by_default()
    } else {
        match includes.iter().map(&mut apply).find(MatchContext::is_matched) {
            Some(context) => context,
            None => return MatchContext::unmatched(),
        }
    };

    if excludes.iter().map(&mut apply).any(|context| context.is_matched()) {
        return MatchContext::delegating(false, included);
    }

    included
}

/// Ordered include/exclude rules on artifacts.
#[derive(Debug, Clone, Default)]
pub struct ArtifactMatcher {
    includes: Vec<ArtifactClusion>,
    excludes: Vec<ArtifactClusion>,
}

impl ArtifactMatcher {
    /// Creates a rule set.
    pub fn new(includes: Vec<ArtifactClusion>, excludes: Vec<ArtifactClusion>) -> Self {
        Self {
            includes,
            excludes,
        }
    }

    /// Include rules in declaration order.
    pub fn includes(&self) -> &[ArtifactClusion] {
        &self.includes
    }

    /// Exclude rules in declaration order.
    pub fn excludes(&self) -> &[ArtifactClusion] {
        &self.excludes
    }

    /// Whether any include rule is declared.
    pub fn has_includes(&self) -> bool {
        !self.includes.is_empty()
    }

    /// Evaluates the rules against `artifact`.
    pub fn match_artifact(&self, artifact: &Artifact) -> MatchContext {
        evaluate(&self.includes, &self.excludes, |rule| rule.match_artifact(artifact))
    }

    /// Shorthand for `match_artifact(artifact).is_matched()`.
    pub fn is_matched(&self, artifact: &Artifact) -> bool {
        self.match_artifact(artifact).is_matched()
    }

    /// Whether any exclude rule matches, ignoring includes.
    ///
    /// Used where the rule set is a pure deny list, e.g. global dependency excludes.
    pub fn is_excluded(&self, artifact: &Artifact) -> bool {
        self.excludes.iter().any(|rule| rule.match_artifact(artifact).is_matched())
    }

    /// Patterns in any rule that failed to compile.
    pub fn invalid_patterns(&self) -> impl Iterator<Item = &IdPattern> {
        self.includes.iter().chain(self.excludes.iter()).flat_map(ArtifactClusion::invalid_patterns)
    }
}

/// Ordered include/exclude rules on module names.
#[derive(Debug, Clone, Default)]
pub struct ModuleMatcher {
    includes: Vec<ModuleClusion>,
    excludes: Vec<ModuleClusion>,
}

impl ModuleMatcher {
    /// Creates a rule set.
    pub fn new(includes: Vec<ModuleClusion>, excludes: Vec<ModuleClusion>) -> Self {
        Self {
            includes,
            excludes,
        }
    }

    /// Builds a rule set from name pattern strings.
    pub fn from_patterns<S: AsRef<str>>(includes: &[S], excludes: &[S]) -> Self {
        Self::new(
            includes.iter().map(|s| ModuleClusion::new(s.as_ref())).collect(),
            excludes.iter().map(|s| ModuleClusion::new(s.as_ref())).collect(),
        )
    }

    /// Evaluates the rules against a module name.
    pub fn match_name(&self, name: &str) -> MatchContext {
        evaluate(&self.includes, &self.excludes, |rule| rule.match_name(name))
    }

    /// Shorthand for `match_name(name).is_matched()`.
    pub fn is_matched(&self, name: &str) -> bool {
        self.match_name(name).is_matched()
    }

    /// Patterns in any rule that failed to compile.
    pub fn invalid_patterns(&self) -> impl Iterator<Item = &IdPattern> {
        self.includes
            .iter()
            .chain(self.excludes.iter())
            .filter_map(ModuleClusion::name)
            .filter(|p| p.is_invalid())
    }
}
