//! st-migrate - Migration engine for Stratum
//!
//! Ties resolution to a live database: the `VersionStrategy` owns the
//! tracking table recording which versions are applied, and the
//! `MigrationManager` diffs resolved migrations against it and applies the
//! pending ones in ascending version order.

pub mod error;
pub mod manager;
pub mod report;
pub mod strategy;

pub use error::{MigrateError, MigrateResult};
pub use manager::MigrationManager;
pub use report::{
    AppliedMigration, FailedMigration, MigrationReport, MigrationStatus, RunPhase, StatusEntry,
};
pub use strategy::{SimpleVersionStrategy, VersionStrategy};
