//! Error types for st-migrate

use crate::report::MigrationReport;
use st_core::CoreError;
use st_db::DbError;
use thiserror::Error;

/// Migration engine errors
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Configuration, resolution or resource errors
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Connection errors outside the tracking table and scripts
    #[error(transparent)]
    Db(#[from] DbError),

    /// M001: The tracking table already records the version being applied
    #[error("[M001] Version '{version}' is already recorded as applied in '{table}'")]
    DuplicateApplication { version: String, table: String },

    /// M002: A migration script failed against the database
    #[error("[M002] Migration '{version}' ({origin}) failed: {source}")]
    MigrationExecution {
        version: String,
        origin: String,
        source: DbError,
        /// What the run applied before the failure
        report: Box<MigrationReport>,
    },

    /// M003: Creating, reading, writing or dropping the tracking table failed
    #[error("[M003] Failed to {action} tracking table '{table}': {source}")]
    Tracking {
        action: &'static str,
        table: String,
        source: DbError,
    },

    /// M004: Reading or recording a migration failed part way through a run
    #[error("[M004] Migration run stopped at '{version}': {source}")]
    RunAborted {
        version: String,
        source: Box<MigrateError>,
        /// What the run applied before the failure
        report: Box<MigrationReport>,
    },
}

impl MigrateError {
    /// The partial report of a run that stopped part way through.
    pub fn report(&self) -> Option<&MigrationReport> {
        match self {
            MigrateError::MigrationExecution { report, .. }
            | MigrateError::RunAborted { report, .. } => Some(report),
            _ => None,
        }
    }
}

/// Result type alias for MigrateError
pub type MigrateResult<T> = Result<T, MigrateError>;
