//! Version extraction policies: resource name to version token.

use crate::error::{CoreError, CoreResult};
use crate::version::Version;
use std::fmt;

/// Delimiter used by the prefix policy when none is configured.
pub const DEFAULT_VERSION_DELIMITER: &str = "_";

/// Configuration names accepted for the extraction policy.
pub const VERSION_EXTRACTOR_NAMES: &[&str] = &["base_name", "timestamp"];

/// Policy turning a migration resource name into its version token.
///
/// Chosen once per engine instance from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionExtractor {
    /// The resource name without its extension:
    /// `20080518134512_create_foo.sql` -> `20080518134512_create_foo`.
    BaseName,

    /// The leading part of the base name up to (not including) `delimiter`:
    /// `20080518134512_create_foo.sql` -> `20080518134512`.
    ///
    /// Names without the delimiter fall back to the full base name.
    Prefix { delimiter: String },
}

impl Default for VersionExtractor {
    fn default() -> Self {
        VersionExtractor::Prefix {
            delimiter: DEFAULT_VERSION_DELIMITER.to_string(),
        }
    }
}

impl VersionExtractor {
    /// Build an extractor from its configuration name (case-insensitive).
    ///
    /// `timestamp` (alias `prefix`) selects the prefix policy split on
    /// `delimiter`; `base_name` (alias `basename`) selects the base-name policy.
    pub fn from_config_name(name: &str, delimiter: &str) -> CoreResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "base_name" | "basename" => Ok(VersionExtractor::BaseName),
            "timestamp" | "prefix" => {
                if delimiter.is_empty() {
                    return Err(CoreError::configuration(
                        "Version delimiter cannot be empty for the timestamp extractor",
                    ));
                }
                Ok(VersionExtractor::Prefix {
                    delimiter: delimiter.to_string(),
                })
            }
            _ => Err(CoreError::configuration(format!(
                "Version extractor type of '{}' is invalid. Valid values: {}",
                name,
                VERSION_EXTRACTOR_NAMES.join(", ")
            ))),
        }
    }

    /// Extract the version token from a resource name.
    ///
    /// Never fails for a non-empty name; returns `None` only for `""`.
    pub fn extract_version(&self, name: &str) -> Option<Version> {
        let base = match base_name(name) {
            "" => bare_name(name),
            b => b,
        };
        let token = match self {
            VersionExtractor::BaseName => base,
            VersionExtractor::Prefix { delimiter } => prefix_of(base, delimiter),
        };
        if token.is_empty() {
            Version::try_new(name)
        } else {
            Version::try_new(token)
        }
    }
}

impl fmt::Display for VersionExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionExtractor::BaseName => write!(f, "base_name"),
            VersionExtractor::Prefix { .. } => write!(f, "timestamp"),
        }
    }
}

/// Everything after the last `/` or `\`.
pub fn bare_name(name: &str) -> &str {
    match name.rfind(['/', '\\']) {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

/// The bare name with its last extension removed.
pub fn base_name(name: &str) -> &str {
    let bare = bare_name(name);
    match bare.rfind('.') {
        Some(pos) => &bare[..pos],
        None => bare,
    }
}

fn prefix_of<'a>(base: &'a str, delimiter: &str) -> &'a str {
    if delimiter.is_empty() {
        return base;
    }
    match base.find(delimiter) {
        Some(pos) if pos > 0 => &base[..pos],
        _ => base,
    }
}

#[cfg(test)]
#[path = "version_extractor_test.rs"]
mod tests;
