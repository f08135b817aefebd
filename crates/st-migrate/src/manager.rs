//! Migration manager: diff resolved migrations against the tracking table
//! and apply what is pending.

use crate::error::{MigrateError, MigrateResult};
use crate::report::{
    AppliedMigration, FailedMigration, MigrationReport, MigrationStatus, RunPhase, StatusEntry,
};
use crate::strategy::{SimpleVersionStrategy, VersionStrategy};
use st_core::{Config, DatabaseKind, Migration, MigrationResolver, MigrationSet, Version};
use st_db::Database;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Brings a database up to date with the migrations a resolver finds.
///
/// Every call re-resolves and re-queries the tracking table; nothing about
/// applied state is cached between calls.
pub struct MigrationManager {
    db: Arc<dyn Database>,
    resolver: MigrationResolver,
    strategy: Box<dyn VersionStrategy>,
    kind: DatabaseKind,
    phase: RunPhase,
}

impl std::fmt::Debug for MigrationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationManager")
            .field("kind", &self.kind)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl MigrationManager {
    pub fn new(
        db: Arc<dyn Database>,
        resolver: MigrationResolver,
        strategy: impl VersionStrategy + 'static,
        kind: DatabaseKind,
    ) -> Self {
        Self {
            db,
            resolver,
            strategy: Box::new(strategy),
            kind,
            phase: RunPhase::NotStarted,
        }
    }

    /// Validate `config`, connect, and wire up the filesystem resolver and
    /// tracking table it describes. Relative paths resolve against `base_dir`.
    pub fn from_config(config: &Config, base_dir: &Path) -> MigrateResult<Self> {
        config.validate()?;
        let kind = config.database_kind()?;
        let resolver = MigrationResolver::from_config(config, base_dir)?;
        let db = st_db::connect(config.driver()?, config.url()?, base_dir)?;
        log::debug!(
            "Connected to {} database (kind: {}) as '{}'",
            db.db_type(),
            kind,
            config.username()?
        );
        Ok(Self::new(
            db,
            resolver,
            SimpleVersionStrategy::from_config(&config.tracking),
            kind,
        ))
    }

    pub fn database(&self) -> &Arc<dyn Database> {
        &self.db
    }

    pub fn database_kind(&self) -> DatabaseKind {
        self.kind
    }

    pub fn resolver(&self) -> &MigrationResolver {
        &self.resolver
    }

    pub fn strategy(&self) -> &dyn VersionStrategy {
        self.strategy.as_ref()
    }

    /// Phase the most recent `migrate` run reached.
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Discover migrations without touching the database.
    pub fn resolve(&self) -> MigrateResult<MigrationSet> {
        Ok(self.resolver.resolve(self.kind)?)
    }

    /// Versions recorded in the tracking table, empty if it does not exist.
    pub fn applied_versions(&self) -> MigrateResult<BTreeSet<Version>> {
        self.strategy.applied_versions(self.db.as_ref())
    }

    /// Migrations not yet applied, ascending by version. Read-only.
    pub fn pending_migrations(&self) -> MigrateResult<Vec<Migration>> {
        let candidates = self.resolve()?;
        let applied = self.applied_versions()?;
        Ok(pending_of(candidates, &applied).0)
    }

    /// True when every resolved migration is already applied.
    pub fn validate(&self) -> MigrateResult<bool> {
        let pending = self.pending_migrations()?;
        if pending.is_empty() {
            log::info!("Database is up to date");
            return Ok(true);
        }
        log::info!(
            "{} pending migration(s): {}",
            pending.len(),
            pending
                .iter()
                .map(|m| m.version().as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(false)
    }

    /// Resolved migrations annotated with their applied state, plus tracked
    /// versions that no longer have a script.
    pub fn status(&self) -> MigrateResult<MigrationStatus> {
        let candidates = self.resolve()?;
        let applied = self.applied_versions()?;

        let orphaned = applied
            .iter()
            .filter(|v| !candidates.contains(v.as_str()))
            .cloned()
            .collect();
        let entries = candidates
            .into_sorted()
            .into_iter()
            .map(|m| StatusEntry {
                applied: applied.contains(m.version()),
                version: m.version().clone(),
                origin: m.origin().to_string(),
            })
            .collect();

        Ok(MigrationStatus { entries, orphaned })
    }

    /// Apply every pending migration in ascending version order.
    ///
    /// Stops at the first failing script. Migrations applied before it stay
    /// applied and recorded; the error carries the partial report.
    pub fn migrate(&mut self) -> MigrateResult<MigrationReport> {
        let result = self.run();
        self.set_phase(if result.is_ok() {
            RunPhase::Completed
        } else {
            RunPhase::Failed
        });
        result
    }

    /// Drop the tracking table.
    pub fn drop_tracking_table(&self) -> MigrateResult<()> {
        self.strategy.drop_tracking_table(self.db.as_ref())
    }

    fn set_phase(&mut self, phase: RunPhase) {
        log::debug!("Migration run: {} -> {}", self.phase, phase);
        self.phase = phase;
    }

    fn run(&mut self) -> MigrateResult<MigrationReport> {
        self.set_phase(RunPhase::Resolving);
        self.strategy.ensure_tracking_table_exists(self.db.as_ref())?;
        let candidates = self.resolve()?;

        self.set_phase(RunPhase::Diffing);
        let applied = self.applied_versions()?;
        let (pending, skipped) = pending_of(candidates, &applied);
        log::info!(
            "{} migration(s) pending, {} already applied",
            pending.len(),
            skipped.len()
        );

        let mut report = MigrationReport {
            skipped,
            ..MigrationReport::default()
        };

        for (i, migration) in pending.iter().enumerate() {
            self.set_phase(RunPhase::Applying(i));
            match self.apply(migration) {
                Ok(applied) => report.applied.push(applied),
                Err(e) => return Err(abort_run(migration, e, report)),
            }
        }

        Ok(report)
    }

    /// Run one script and record it. Script failures come back as
    /// `MigrationExecution` with an empty report; `run` fills it in.
    fn apply(&self, migration: &Migration) -> MigrateResult<AppliedMigration> {
        let version = migration.version();
        log::debug!("Applying migration {} from {}", version, migration.origin());

        let script = migration.script()?;
        let start = Instant::now();
        if script.trim().is_empty() {
            log::warn!("Migration {} is empty, recording it as applied", version);
        } else if let Err(e) = self.db.execute_batch(&script) {
            return Err(MigrateError::MigrationExecution {
                version: version.to_string(),
                origin: migration.origin().to_string(),
                source: e,
                report: Box::default(),
            });
        }
        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        self.strategy
            .record_applied(self.db.as_ref(), version, duration_ms)?;
        log::info!("Applied migration {} in {} ms", version, duration_ms);
        Ok(AppliedMigration {
            version: version.clone(),
            origin: migration.origin().to_string(),
            duration_ms,
        })
    }
}

/// Attach the partial report to an error raised while applying `migration`.
fn abort_run(
    migration: &Migration,
    error: MigrateError,
    mut report: MigrationReport,
) -> MigrateError {
    let version = migration.version();
    log::error!("Migration {} failed: {}", version, error);
    if !report.applied.is_empty() {
        log::error!(
            "Applied before failure: {}",
            report
                .applied_versions()
                .iter()
                .map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    let message = match &error {
        MigrateError::MigrationExecution { source, .. } => source.to_string(),
        other => other.to_string(),
    };
    report.failed = Some(FailedMigration {
        version: version.clone(),
        origin: migration.origin().to_string(),
        error: message,
    });

    match error {
        MigrateError::MigrationExecution {
            version,
            origin,
            source,
            ..
        } => MigrateError::MigrationExecution {
            version,
            origin,
            source,
            report: Box::new(report),
        },
        other => MigrateError::RunAborted {
            version: version.to_string(),
            source: Box::new(other),
            report: Box::new(report),
        },
    }
}

/// Split candidates into pending migrations and already-applied versions,
/// both ascending by version.
fn pending_of(
    candidates: MigrationSet,
    applied: &BTreeSet<Version>,
) -> (Vec<Migration>, Vec<Version>) {
    let (skipped, pending): (Vec<Migration>, Vec<Migration>) = candidates
        .into_sorted()
        .into_iter()
        .partition(|m| applied.contains(m.version()));
    let skipped = skipped.into_iter().map(|m| m.version().clone()).collect();
    (pending, skipped)
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod tests;
