//! Tracking table strategies.

use crate::error::{MigrateError, MigrateResult};
use chrono::Utc;
use st_core::config::{
    TrackingConfig, DEFAULT_APPLIED_DATE_COLUMN, DEFAULT_DURATION_COLUMN, DEFAULT_VERSION_COLUMN,
    DEFAULT_VERSION_TABLE,
};
use st_core::sql_utils::{quote_ident, quote_literal, quote_qualified};
use st_core::Version;
use st_db::{Database, DbError};
use std::collections::BTreeSet;

/// Records which migration versions have been applied to a database.
///
/// Applied state lives only in the database; implementations keep no cache
/// between calls.
pub trait VersionStrategy: Send + Sync {
    /// Tracking table name, for logs and errors.
    fn table(&self) -> &str;

    /// Create the tracking table unless it already exists.
    fn ensure_tracking_table_exists(&self, db: &dyn Database) -> MigrateResult<()>;

    /// Versions currently recorded as applied. Read-only.
    fn applied_versions(&self, db: &dyn Database) -> MigrateResult<BTreeSet<Version>>;

    /// Record `version` as applied now, taking `duration_ms` to run.
    ///
    /// Fails with `DuplicateApplication` when the version is already
    /// recorded, which happens when two runs race on the same database.
    fn record_applied(&self, db: &dyn Database, version: &Version, duration_ms: u64)
        -> MigrateResult<()>;

    /// Drop the tracking table. Teardown only.
    fn drop_tracking_table(&self, db: &dyn Database) -> MigrateResult<()>;
}

/// Single-table strategy: one row per applied version.
///
/// ```text
/// schema_version (
///     version      VARCHAR(255) NOT NULL PRIMARY KEY,
///     applied_date TIMESTAMP    NOT NULL,
///     duration     INTEGER      NOT NULL
/// )
/// ```
#[derive(Debug, Clone)]
pub struct SimpleVersionStrategy {
    table: String,
    version_column: String,
    applied_date_column: String,
    duration_column: String,
    create_sql: Option<String>,
    drop_sql: Option<String>,
}

impl Default for SimpleVersionStrategy {
    fn default() -> Self {
        Self {
            table: DEFAULT_VERSION_TABLE.to_string(),
            version_column: DEFAULT_VERSION_COLUMN.to_string(),
            applied_date_column: DEFAULT_APPLIED_DATE_COLUMN.to_string(),
            duration_column: DEFAULT_DURATION_COLUMN.to_string(),
            create_sql: None,
            drop_sql: None,
        }
    }
}

impl SimpleVersionStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &TrackingConfig) -> Self {
        Self {
            table: config.table.clone(),
            version_column: config.version_column.clone(),
            applied_date_column: config.applied_date_column.clone(),
            duration_column: config.duration_column.clone(),
            create_sql: non_blank(&config.create_sql),
            drop_sql: non_blank(&config.drop_sql),
        }
    }

    /// Statement creating the tracking table, the override if configured.
    pub fn create_sql(&self) -> String {
        match &self.create_sql {
            Some(sql) => sql.clone(),
            None => format!(
                "CREATE TABLE IF NOT EXISTS {} ({} VARCHAR(255) NOT NULL PRIMARY KEY, {} TIMESTAMP NOT NULL, {} INTEGER NOT NULL)",
                quote_qualified(&self.table),
                quote_ident(&self.version_column),
                quote_ident(&self.applied_date_column),
                quote_ident(&self.duration_column),
            ),
        }
    }

    /// Statement dropping the tracking table, the override if configured.
    pub fn drop_sql(&self) -> String {
        match &self.drop_sql {
            Some(sql) => sql.clone(),
            None => format!("DROP TABLE IF EXISTS {}", quote_qualified(&self.table)),
        }
    }

    fn tracking_error(&self, action: &'static str, source: DbError) -> MigrateError {
        MigrateError::Tracking {
            action,
            table: self.table.clone(),
            source,
        }
    }

    fn duplicate(&self, version: &Version) -> MigrateError {
        MigrateError::DuplicateApplication {
            version: version.to_string(),
            table: self.table.clone(),
        }
    }

    fn is_recorded(&self, db: &dyn Database, version: &Version) -> MigrateResult<bool> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = {}",
            quote_qualified(&self.table),
            quote_ident(&self.version_column),
            quote_literal(version.as_str())
        );
        let rows = db
            .query_rows(&sql)
            .map_err(|e| self.tracking_error("query", e))?;
        let count = rows
            .first()
            .and_then(|row| row.first())
            .and_then(|cell| cell.parse::<i64>().ok())
            .unwrap_or(0);
        Ok(count > 0)
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl VersionStrategy for SimpleVersionStrategy {
    fn table(&self) -> &str {
        &self.table
    }

    fn ensure_tracking_table_exists(&self, db: &dyn Database) -> MigrateResult<()> {
        let exists = db
            .relation_exists(&self.table)
            .map_err(|e| self.tracking_error("inspect", e))?;
        if exists {
            log::debug!("Tracking table '{}' already exists", self.table);
            return Ok(());
        }

        log::info!("Creating tracking table '{}'", self.table);
        db.execute_batch(&self.create_sql())
            .map_err(|e| self.tracking_error("create", e))
    }

    fn applied_versions(&self, db: &dyn Database) -> MigrateResult<BTreeSet<Version>> {
        let exists = db
            .relation_exists(&self.table)
            .map_err(|e| self.tracking_error("inspect", e))?;
        if !exists {
            return Ok(BTreeSet::new());
        }

        let sql = format!(
            "SELECT {} FROM {}",
            quote_ident(&self.version_column),
            quote_qualified(&self.table)
        );
        let rows = db
            .query_rows(&sql)
            .map_err(|e| self.tracking_error("query", e))?;

        let mut versions = BTreeSet::new();
        for row in rows {
            match row.into_iter().next().and_then(Version::try_new) {
                Some(version) => {
                    versions.insert(version);
                }
                None => log::warn!("Ignoring empty version in tracking table '{}'", self.table),
            }
        }
        Ok(versions)
    }

    fn record_applied(
        &self,
        db: &dyn Database,
        version: &Version,
        duration_ms: u64,
    ) -> MigrateResult<()> {
        if self.is_recorded(db, version)? {
            return Err(self.duplicate(version));
        }

        let applied_at = Utc::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let sql = format!(
            "INSERT INTO {} ({}, {}, {}) VALUES ({}, TIMESTAMP '{}', {})",
            quote_qualified(&self.table),
            quote_ident(&self.version_column),
            quote_ident(&self.applied_date_column),
            quote_ident(&self.duration_column),
            quote_literal(version.as_str()),
            applied_at,
            duration_ms
        );
        match db.execute(&sql) {
            Ok(_) => Ok(()),
            Err(DbError::ConstraintViolation(_)) => Err(self.duplicate(version)),
            Err(e) => Err(self.tracking_error("record a version in", e)),
        }
    }

    fn drop_tracking_table(&self, db: &dyn Database) -> MigrateResult<()> {
        log::info!("Dropping tracking table '{}'", self.table);
        db.execute_batch(&self.drop_sql())
            .map_err(|e| self.tracking_error("drop", e))
    }
}

#[cfg(test)]
#[path = "strategy_test.rs"]
mod tests;
