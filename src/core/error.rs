//! Error handling for modgraph
//!
//! This module provides the error types and user-facing error reporting used across
//! the classification engine and the CLI. The error system follows two principles:
//! 1. **Strongly-typed errors** for precise handling inside the library
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`ModgraphError`] - Enumerated error types for every failure mode
//! - [`ErrorContext`] - Wrapper that adds a suggestion and details for display
//!
//! # Error Categories
//!
//! - **Configuration**: [`ModgraphError::ConfigError`], [`ModgraphError::MissingModuleName`],
//!   [`ModgraphError::InvalidCoordinates`], [`ModgraphError::InvalidSlotStrategy`],
//!   [`ModgraphError::InvalidPattern`]
//! - **Resolution**: [`ModgraphError::ArtifactNotFound`], [`ModgraphError::RootResolutionFailed`]
//! - **Classification**: [`ModgraphError::ModuleNotFound`]
//!
//! Member resolution failures are deliberately *not* surfaced through this type by the
//! aggregator: they are logged and the member is treated as having no direct
//! dependencies. Only root resolution aborts a run.
//!
//! # Examples
//!
//! ```rust,no_run
//! use modgraph_cli::core::{ModgraphError, user_friendly_error};
//!
//! let error = ModgraphError::MissingModuleName { index: 2 };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // Shows coloured error with a suggestion
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for modgraph operations
///
/// Each variant carries the identifiers needed to explain the failure to a user
/// (coordinates, module names, pattern sources) rather than opaque messages.
#[derive(Error, Debug)]
pub enum ModgraphError {
    /// Generic configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// A module descriptor was declared without a name
    ///
    /// Module names are the identity of a module together with its slot, so a
    /// descriptor without one cannot be classified into or depended upon.
    #[error("Module descriptor #{index} has no name")]
    MissingModuleName {
        /// Zero-based position of the descriptor in the configuration
        index: usize,
    },

    /// Artifact coordinates could not be parsed
    #[error("Invalid artifact coordinates '{coordinates}': {reason}")]
    InvalidCoordinates {
        /// The coordinate string as given
        coordinates: String,
        /// Why parsing failed
        reason: String,
    },

    /// Unknown slot strategy name
    #[error("Unknown slot strategy '{name}'")]
    InvalidSlotStrategy {
        /// The strategy name as given
        name: String,
    },

    /// A pattern failed to compile as a regular expression
    ///
    /// Invalid patterns normally degrade to literal matching with a warning. This
    /// error is only raised when strict validation is requested.
    #[error("Invalid pattern '{pattern}' in {location}: {reason}")]
    InvalidPattern {
        /// The pattern source text
        pattern: String,
        /// Where the pattern was declared (module name and rule kind)
        location: String,
        /// The regex compiler's message
        reason: String,
    },

    /// The resolver does not know the requested artifact
    #[error("Artifact '{coordinates}' cannot be resolved")]
    ArtifactNotFound {
        /// Coordinates of the unknown artifact
        coordinates: String,
    },

    /// Resolution of the root dependency set failed
    ///
    /// This is the only resolution failure that aborts a run.
    #[error("Cannot resolve root dependencies: {reason}")]
    RootResolutionFailed {
        /// The underlying resolution failure
        reason: String,
        /// Coordinates of the artifact that failed, when known
        coordinates: Option<String>,
    },

    /// A dependency that must already be classified has no module
    #[error("No module found for dependency '{coordinates}'")]
    ModuleNotFound {
        /// Coordinates of the dependency
        coordinates: String,
    },

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

impl Clone for ModgraphError {
    fn clone(&self) -> Self {
        match self {
            Self::ConfigError {
                message,
            } => Self::ConfigError {
                message: message.clone(),
            },
            Self::MissingModuleName {
                index,
            } => Self::MissingModuleName {
                index: *index,
            },
            Self::InvalidCoordinates {
                coordinates,
                reason,
            } => Self::InvalidCoordinates {
                coordinates: coordinates.clone(),
                reason: reason.clone(),
            },
            Self::InvalidSlotStrategy {
                name,
            } => Self::InvalidSlotStrategy {
                name: name.clone(),
            },
            Self::InvalidPattern {
                pattern,
                location,
                reason,
            } => Self::InvalidPattern {
                pattern: pattern.clone(),
                location: location.clone(),
                reason: reason.clone(),
            },
            Self::ArtifactNotFound {
                coordinates,
            } => Self::ArtifactNotFound {
                coordinates: coordinates.clone(),
            },
            Self::RootResolutionFailed {
                reason,
                coordinates,
            } => Self::RootResolutionFailed {
                reason: reason.clone(),
                coordinates: coordinates.clone(),
            },
            Self::ModuleNotFound {
                coordinates,
            } => Self::ModuleNotFound {
                coordinates: coordinates.clone(),
            },
            // io::Error and toml errors are not Clone; keep the message
            Self::IoError(e) => Self::Other {
                message: format!("IO error: {e}"),
            },
            Self::TomlError(e) => Self::Other {
                message: format!("TOML parsing error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error context wrapper that adds a suggestion and details to a [`ModgraphError`]
///
/// # Examples
///
/// ```rust,no_run
/// use modgraph_cli::core::{ErrorContext, ModgraphError};
///
/// let context = ErrorContext::new(ModgraphError::ArtifactNotFound {
///     coordinates: "org.example:lib:1.0".to_string(),
/// })
/// .with_suggestion("Add the artifact to the dependency graph file")
/// .with_details("Every root must be declared as an [[artifact]] entry");
///
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: ModgraphError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: ModgraphError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message: red and bold
    /// - Details: yellow
    /// - Suggestion: green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes [`ModgraphError`] (anywhere in the chain), [`std::io::Error`] and
/// TOML errors; everything else is wrapped as [`ModgraphError::Other`] with the
/// full context chain as details.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(context) = error.downcast_ref::<ErrorContext>() {
        return ErrorContext {
            error: context.error.clone(),
            suggestion: context.suggestion.clone(),
            details: context.details.clone(),
        };
    }

    for cause in error.chain() {
        if let Some(modgraph_error) = cause.downcast_ref::<ModgraphError>() {
            return create_error_context(modgraph_error.clone());
        }
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        if io_error.kind() == std::io::ErrorKind::NotFound {
            return ErrorContext::new(ModgraphError::Other {
                message: format!("{error:#}"),
            })
            .with_suggestion("Check that the file exists and the path is correct");
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(ModgraphError::ConfigError {
            message: toml_error.message().to_string(),
        })
        .with_suggestion("Check the TOML syntax of the configuration file")
        .with_details(format!("{error:#}"));
    }

    ErrorContext::new(ModgraphError::Other {
        message: format!("{error:#}"),
    })
}

fn create_error_context(error: ModgraphError) -> ErrorContext {
    match &error {
        ModgraphError::MissingModuleName {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Add a `name = \"...\"` entry to every [[module]] table"),
        ModgraphError::InvalidCoordinates {
            ..
        } => ErrorContext::new(error).with_suggestion(
            "Use groupId:artifactId:version, groupId:artifactId:extension:version or \
             groupId:artifactId:extension:classifier:version",
        ),
        ModgraphError::InvalidSlotStrategy {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Valid slot strategies are 'main' and 'version-major'"),
        ModgraphError::InvalidPattern {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Escape regex metacharacters or fix the expression syntax")
            .with_details("Invalid patterns fall back to exact literal matching"),
        ModgraphError::RootResolutionFailed {
            coordinates,
            ..
        } => {
            let suggestion = match coordinates {
                Some(coords) => format!(
                    "Add an [[exclude]] rule for '{coords}' to prune it from the dependency graph"
                ),
                None => "Add [[exclude]] rules to prune unresolvable artifacts from the \
                         dependency graph"
                    .to_string(),
            };
            ErrorContext::new(error)
                .with_suggestion(suggestion)
                .with_details("Root dependencies must resolve; member failures are only warnings")
        }
        ModgraphError::ModuleNotFound {
            ..
        } => ErrorContext::new(error)
            .with_details("The dependency was never classified; this is a bug in the caller"),
        _ => ErrorContext::new(error),
    }
}
