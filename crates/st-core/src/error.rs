//! Error types for st-core

use thiserror::Error;

/// Core error type for Stratum
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Failed to parse configuration file
    #[error("[C002] Failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// C003: Missing or invalid configuration value
    #[error("[C003] Invalid configuration: {message}")]
    Configuration { message: String },

    /// C004: Nothing left to migrate after filtering discovered resources
    #[error("[C004] No migrations were found using resource pattern(s) [{locations}]")]
    NoMigrationsFound { locations: String },

    /// C005: Two resources extract to the same version token
    #[error("[C005] Non-unique migration version '{version}': {first} and {second}")]
    DuplicateVersion {
        version: String,
        first: String,
        second: String,
    },

    /// C006: Enumerating or reading migration resources failed
    #[error("[C006] Failed to access migration resource '{location}': {source}")]
    ResourceAccess {
        location: String,
        source: std::io::Error,
    },

    /// C007: Location could not be turned into a lookup pattern
    #[error("[C007] Invalid migration location pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// C008: IO error
    #[error("[C008] IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Shorthand for a [`CoreError::Configuration`] error.
    pub fn configuration(message: impl Into<String>) -> Self {
        CoreError::Configuration {
            message: message.into(),
        }
    }
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
