//! Slot calculation strategies.
//!
//! A slot is the version partition of a module namespace. The strategy is
//! selected globally by configuration:
//!
//! - [`SlotStrategy::Main`] - the module's declared slot, else the default slot,
//!   else `main`
//! - [`SlotStrategy::VersionMajor`] - the artifact's major version, prefixed by the
//!   declared (or default) slot unless that is blank or `main`
//!
//! ```rust
//! use modgraph_cli::slot::SlotStrategy;
//!
//! let major = SlotStrategy::VersionMajor;
//! assert_eq!(major.calc_slot_for_version("main", None, "1.2.3-artifact-version"), "1");
//! assert_eq!(major.calc_slot_for_version("prodx", None, "2.0.0"), "prodx2");
//! assert_eq!(SlotStrategy::Main.calc_slot("", Some(""), None), "main");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::{Artifact, ModgraphError};

/// The slot every strategy falls back to.
pub const MAIN_SLOT: &str = "main";

/// Version assumed when a slot is computed without an artifact.
pub const PLACEHOLDER_VERSION: &str = "0.0.0";

/// Global slot calculation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlotStrategy {
    /// Declared slot, default slot, or `main`.
    #[default]
    Main,
    /// Major version of the artifact, optionally prefixed.
    VersionMajor,
}

impl SlotStrategy {
    /// Computes the slot for a module or dependency.
    ///
    /// `module_slot` takes precedence over `default_slot` as the fallback input.
    /// Only [`SlotStrategy::Main`] returns it directly; [`SlotStrategy::VersionMajor`]
    /// always derives the number from the artifact version, or from
    /// [`PLACEHOLDER_VERSION`] when no artifact is given.
    pub fn calc_slot(
        &self,
        default_slot: &str,
        module_slot: Option<&str>,
        artifact: Option<&Artifact>,
    ) -> String {
        let version = artifact.map_or(PLACEHOLDER_VERSION, |a| a.version.as_str());
        self.calc_slot_for_version(default_slot, module_slot, version)
    }

    /// Like [`calc_slot`](Self::calc_slot) with an explicit version string.
    pub fn calc_slot_for_version(
        &self,
        default_slot: &str,
        module_slot: Option<&str>,
        version: &str,
    ) -> String {
        let fallback =
            module_slot.filter(|s| !s.trim().is_empty()).unwrap_or(default_slot).trim();

        match self {
            SlotStrategy::Main => {
                if fallback.is_empty() {
                    MAIN_SLOT.to_string()
                } else {
                    fallback.to_string()
                }
            }
            SlotStrategy::VersionMajor => {
                let major = major_version(version);
                if fallback.is_empty() || fallback == MAIN_SLOT {
                    major
                } else {
                    format!("{fallback}{major}")
                }
            }
        }
    }
}

/// Extracts the major version number as a string.
///
/// Semver versions use their parsed major; anything else uses the leading run of
/// digits, or the first `.`/`-` separated segment if there are no leading digits.
fn major_version(version: &str) -> String {
    let version = version.trim();
    if let Ok(parsed) = semver::Version::parse(version) {
        return parsed.major.to_string();
    }

    let digits: String = version.chars().take_while(char::is_ascii_digit).collect();
    if !digits.is_empty() {
        // "007" and "7" name the same major
        let trimmed = digits.trim_start_matches('0');
        return if trimmed.is_empty() { "0".to_string() } else { trimmed.to_string() };
    }

    version.split(['.', '-']).next().unwrap_or_default().to_string()
}

impl fmt::Display for SlotStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotStrategy::Main => write!(f, "main"),
            SlotStrategy::VersionMajor => write!(f, "version-major"),
        }
    }
}

impl FromStr for SlotStrategy {
    type Err = ModgraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "main" => Ok(SlotStrategy::Main),
            "version-major" | "versionmajor" | "version_major" => Ok(SlotStrategy::VersionMajor),
            _ => Err(ModgraphError::InvalidSlotStrategy {
                name: s.to_string(),
            }),
        }
    }
}
