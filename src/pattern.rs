//! Identifier pattern matching for artifact classification.
//!
//! Module rules name artifacts by `groupId`/`artifactId` patterns and modules by
//! name patterns. Every pattern is written as a regular expression and matched
//! against the *whole* candidate string; capture groups are kept so that a
//! matching rule can template the name of the module it produces.
//!
//! # Pattern States
//!
//! A compiled [`IdPattern`] is always in one of three states (see
//! [`CompiledPattern`]):
//!
//! - **Literal** - the source has no regex metacharacters, so an exact string
//!   comparison is equivalent to a full regex match and cheaper
//! - **Regex** - a compiled, fully anchored regular expression
//! - **Invalid** - the source failed to compile; the pattern degrades to exact
//!   literal comparison against its source text and the failure stays observable
//!   through [`IdPattern::invalid_reason`]
//!
//! Blank identifiers do not compile to a pattern at all ([`IdPattern::compile`]
//! returns `None`), and an absent pattern matches every input.
//!
//! # Name Templating
//!
//! A [`MatchContext`] substitutes captured groups into a template:
//!
//! - `$1` .. `$n` - groups captured by the `artifactId` (or module name) pattern
//! - `$g1` .. `$gn` - groups captured by the `groupId` pattern
//!
//! ```rust
//! use modgraph_cli::pattern::{IdPattern, MatchContext};
//!
//! let group = IdPattern::compile("(de\\.smartics)\\.(.*)").unwrap();
//! let artifact = IdPattern::compile("service-(.*)").unwrap();
//!
//! let context = MatchContext::double(
//!     Some(group.match_input("de.smartics.test")),
//!     Some(artifact.match_input("service-billing")),
//! );
//!
//! assert!(context.is_matched());
//! assert_eq!(context.translate_name("$g1.$g2.$1"), "de.smartics.test.billing");
//! ```

use regex::Regex;
use std::fmt;
use tracing::{trace, warn};

/// Compiled state of an [`IdPattern`].
#[derive(Debug, Clone)]
pub enum CompiledPattern {
    /// Exact comparison against the source text.
    Literal,
    /// Anchored regular expression.
    Regex(Regex),
    /// Source failed to compile; compared literally.
    Invalid {
        /// Compiler message
        reason: String,
    },
}

/// A compiled identifier pattern.
///
/// Cloning is cheap: compiled regular expressions share their program.
#[derive(Debug, Clone)]
pub struct IdPattern {
    source: String,
    compiled: CompiledPattern,
}

impl IdPattern {
    /// Compiles an identifier into a pattern.
    ///
    /// Returns `None` for blank identifiers. An identifier that is not a valid
    /// regular expression still yields a pattern, in the
    /// [`CompiledPattern::Invalid`] state, and a warning is logged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use modgraph_cli::pattern::IdPattern;
    ///
    /// assert!(IdPattern::compile("   ").is_none());
    ///
    /// let broken = IdPattern::compile("commons-[").unwrap();
    /// assert!(broken.is_invalid());
    /// assert!(broken.match_input("commons-[").matched);
    /// assert!(!broken.match_input("commons-io").matched);
    /// ```
    pub fn compile(id: &str) -> Option<Self> {
        if id.trim().is_empty() {
            return None;
        }

        let compiled = if is_plain_identifier(id) {
            CompiledPattern::Literal
        } else {
            // Validate the bare source first so that wrapping cannot repair it
            match Regex::new(id).and_then(|_| Regex::new(&format!("^(?:{id})$"))) {
                Ok(regex) => CompiledPattern::Regex(regex),
                Err(e) => {
                    let reason = e.to_string();
                    warn!("Pattern '{id}' is not a valid regular expression, matching literally");
                    trace!("Regex compile error for '{id}': {reason}");
                    CompiledPattern::Invalid {
                        reason,
                    }
                }
            }
        };

        Some(Self {
            source: id.to_string(),
            compiled,
        })
    }

    /// The source text the pattern was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The compiled state.
    pub fn state(&self) -> &CompiledPattern {
        &self.compiled
    }

    /// Whether the source failed to compile as a regular expression.
    pub fn is_invalid(&self) -> bool {
        matches!(self.compiled, CompiledPattern::Invalid { .. })
    }

    /// The compiler message for an invalid pattern.
    pub fn invalid_reason(&self) -> Option<&str> {
        match &self.compiled {
            CompiledPattern::Invalid {
                reason,
            } => Some(reason),
            _ => None,
        }
    }

    /// Matches `input` in full and returns the captured groups.
    ///
    /// Groups that did not participate in the match are captured as empty
    /// strings so group numbering stays stable for templating.
    pub fn match_input(&self, input: &str) -> PatternMatch {
        match &self.compiled {
            CompiledPattern::Literal
            | CompiledPattern::Invalid {
                ..
            } => PatternMatch {
                matched: self.source == input,
                groups: Vec::new(),
            },
            CompiledPattern::Regex(regex) => match regex.captures(input) {
                Some(captures) => PatternMatch {
                    matched: true,
                    groups: captures
                        .iter()
                        .skip(1)
                        .map(|group| group.map_or_else(String::new, |m| m.as_str().to_string()))
                        .collect(),
                },
                None => PatternMatch::no_match(),
            },
        }
    }
}

impl fmt::Display for IdPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Outcome of matching one [`IdPattern`] against one input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PatternMatch {
    /// Whether the whole input matched
    pub matched: bool,
    /// Captured groups `1..=n`
    pub groups: Vec<String>,
}

impl PatternMatch {
    /// A failed match.
    pub fn no_match() -> Self {
        Self::default()
    }

    /// The result of an absent pattern: matches, captures nothing.
    pub fn wildcard() -> Self {
        Self {
            matched: true,
            groups: Vec::new(),
        }
    }
}

/// Matches `input` against an optional pattern; an absent pattern is a wildcard.
pub fn match_optional(pattern: Option<&IdPattern>, input: &str) -> PatternMatch {
    pattern.map_or_else(PatternMatch::wildcard, |p| p.match_input(input))
}

/// The result of applying one or more rules to one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchContext {
    /// One pattern against one string, e.g. a module name rule.
    Single {
        /// Verdict
        matched: bool,
        /// Groups captured by the pattern
        groups: Vec<String>,
        /// Source of the deciding rule, empty if none
        rule: String,
    },
    /// Independent `groupId` and `artifactId` sub-matches.
    Double {
        /// Verdict
        matched: bool,
        /// `groupId` sub-match groups, `None` if the rule had no `groupId` pattern
        group_id: Option<Vec<String>>,
        /// `artifactId` sub-match groups, `None` if the rule had no `artifactId` pattern
        artifact_id: Option<Vec<String>>,
    },
    /// A verdict that overrides another context's, keeping its captures.
    Delegating {
        /// Verdict
        matched: bool,
        /// The context whose captures are exposed
        inner: Box<MatchContext>,
    },
}

impl MatchContext {
    /// A negative verdict without captures.
    pub fn unmatched() -> Self {
        MatchContext::Single {
            matched: false,
            groups: Vec::new(),
            rule: String::new(),
        }
    }

    /// A positive verdict without captures, used when no include rule constrains.
    pub fn matched_by_default() -> Self {
        MatchContext::Single {
            matched: true,
            groups: Vec::new(),
            rule: String::new(),
        }
    }

    /// Wraps a single pattern outcome.
    pub fn single(result: PatternMatch, rule: impl Into<String>) -> Self {
        MatchContext::Single {
            matched: result.matched,
            groups: result.groups,
            rule: rule.into(),
        }
    }

    /// Combines `groupId` and `artifactId` outcomes; `None` means the rule had no
    /// such pattern and does not constrain.
    pub fn double(group_id: Option<PatternMatch>, artifact_id: Option<PatternMatch>) -> Self {
        let matched = group_id.as_ref().is_none_or(|m| m.matched)
            && artifact_id.as_ref().is_none_or(|m| m.matched);

        MatchContext::Double {
            matched,
            group_id: group_id.map(|m| m.groups),
            artifact_id: artifact_id.map(|m| m.groups),
        }
    }

    /// Overrides the verdict of `inner` while exposing its captures.
    pub fn delegating(matched: bool, inner: MatchContext) -> Self {
        MatchContext::Delegating {
            matched,
            inner: Box::new(inner),
        }
    }

    /// The verdict.
    pub fn is_matched(&self) -> bool {
        match self {
            MatchContext::Single {
                matched,
                ..
            }
            | MatchContext::Double {
                matched,
                ..
            }
            | MatchContext::Delegating {
                matched,
                ..
            } => *matched,
        }
    }

    /// Whether any capture group is available for templating.
    pub fn has_group_match(&self) -> bool {
        match self {
            MatchContext::Single {
                groups,
                ..
            } => !groups.is_empty(),
            MatchContext::Double {
                group_id,
                artifact_id,
                ..
            } => {
                group_id.as_ref().is_some_and(|g| !g.is_empty())
                    || artifact_id.as_ref().is_some_and(|g| !g.is_empty())
            }
            MatchContext::Delegating {
                inner,
                ..
            } => inner.has_group_match(),
        }
    }

    /// Substitutes `$gN` and `$N` references in `template` with captured groups.
    ///
    /// References to groups that were not captured are left untouched.
    pub fn translate_name(&self, template: &str) -> String {
        match self {
            MatchContext::Single {
                groups,
                ..
            } => substitute(template, &[], groups),
            MatchContext::Double {
                group_id,
                artifact_id,
                ..
            } => substitute(
                template,
                group_id.as_deref().unwrap_or_default(),
                artifact_id.as_deref().unwrap_or_default(),
            ),
            MatchContext::Delegating {
                inner,
                ..
            } => inner.translate_name(template),
        }
    }
}

/// Characters that mean themselves in a regex outside a character class.
fn is_plain_identifier(id: &str) -> bool {
    id.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

fn substitute(template: &str, group_groups: &[String], plain_groups: &[String]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let from_group_id = matches!(chars.peek(), Some((_, 'g')));
        let mut cursor = chars.clone();
        if from_group_id {
            cursor.next();
        }

        let mut digits = String::new();
        while let Some((_, d)) = cursor.peek().copied() {
            if !d.is_ascii_digit() {
                break;
            }
            digits.push(d);
            cursor.next();
        }

        let groups = if from_group_id {
            group_groups
        } else {
            plain_groups
        };
        let replacement = digits
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|index| groups.get(index));

        match replacement {
            Some(value) => {
                result.push_str(value);
                chars = cursor;
            }
            None => {
                trace!("Unresolved group reference at offset {start} in '{template}'");
                result.push('$');
            }
        }
    }

    result
}
