//! st-core - Core library for Stratum
//!
//! This crate provides the migration data model and the resolution engine:
//! version tokens and their extraction policies, migration location
//! normalization, resource discovery, duplicate detection, and the YAML
//! configuration shared by every Stratum component.

pub mod config;
pub mod database_kind;
pub mod error;
pub mod location;
pub mod migration;
pub mod resolver;
pub mod resource;
pub mod sql_utils;
pub mod version;
pub mod version_extractor;

pub use config::{Config, DatabaseConfig, MigrationsConfig, TrackingConfig};
pub use database_kind::{DatabaseKind, Driver};
pub use error::{CoreError, CoreResult};
pub use location::{normalize_location, LocationPattern, Scheme};
pub use migration::{Migration, MigrationSet};
pub use resolver::MigrationResolver;
pub use resource::{
    FileSystemResourceLoader, InMemoryResourceLoader, Resource, ResourceLoader, ResourceSource,
};
pub use version::Version;
pub use version_extractor::VersionExtractor;
