//! Outcome of migration runs and status queries

use serde::{Deserialize, Serialize};
use st_core::Version;
use std::fmt;

/// Where a migration run currently is.
///
/// A run moves `NotStarted -> Resolving -> Diffing -> Applying(i)` and ends in
/// `Completed` or `Failed`. `Applying` carries the zero-based index into the
/// sorted pending list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    NotStarted,
    Resolving,
    Diffing,
    Applying(usize),
    Completed,
    Failed,
}

impl RunPhase {
    /// Whether the run has reached a terminal phase.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunPhase::Completed | RunPhase::Failed)
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPhase::NotStarted => f.write_str("not started"),
            RunPhase::Resolving => f.write_str("resolving"),
            RunPhase::Diffing => f.write_str("diffing"),
            RunPhase::Applying(i) => write!(f, "applying #{}", i + 1),
            RunPhase::Completed => f.write_str("completed"),
            RunPhase::Failed => f.write_str("failed"),
        }
    }
}

/// A migration applied during this run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedMigration {
    pub version: Version,

    /// Where the script was discovered
    pub origin: String,

    /// Script execution time in milliseconds
    pub duration_ms: u64,
}

/// The migration that stopped the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedMigration {
    pub version: Version,
    pub origin: String,

    /// Error message from the database
    pub error: String,
}

/// Result of one `migrate` run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationReport {
    /// Newly applied migrations, ascending by version
    pub applied: Vec<AppliedMigration>,

    /// Candidates already recorded as applied, ascending by version
    pub skipped: Vec<Version>,

    /// Set when a script failed; nothing after it was attempted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed: Option<FailedMigration>,
}

impl MigrationReport {
    /// True when no migration failed.
    pub fn is_success(&self) -> bool {
        self.failed.is_none()
    }

    /// Versions applied during this run, in application order.
    pub fn applied_versions(&self) -> Vec<&Version> {
        self.applied.iter().map(|a| &a.version).collect()
    }

    /// Sum of script execution times in milliseconds.
    pub fn total_duration_ms(&self) -> u64 {
        self.applied.iter().map(|a| a.duration_ms).sum()
    }
}

/// One resolved migration and whether it is recorded as applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub version: Version,
    pub origin: String,
    pub applied: bool,
}

/// Resolved migrations compared against the tracking table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationStatus {
    /// Every resolved migration, ascending by version
    pub entries: Vec<StatusEntry>,

    /// Recorded versions with no matching migration script
    pub orphaned: Vec<Version>,
}

impl MigrationStatus {
    /// Entries not yet applied, ascending by version.
    pub fn pending(&self) -> impl Iterator<Item = &StatusEntry> {
        self.entries.iter().filter(|e| !e.applied)
    }

    pub fn pending_count(&self) -> usize {
        self.pending().count()
    }

    pub fn applied_count(&self) -> usize {
        self.entries.iter().filter(|e| e.applied).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn applied(version: &str, duration_ms: u64) -> AppliedMigration {
        AppliedMigration {
            version: Version::new(version),
            origin: format!("mem:{version}.sql"),
            duration_ms,
        }
    }

    #[test]
    fn test_report_success_and_totals() {
        let report = MigrationReport {
            applied: vec![applied("001", 5), applied("002", 7)],
            skipped: Vec::new(),
            failed: None,
        };
        assert!(report.is_success());
        assert_eq!(report.total_duration_ms(), 12);
        let versions: Vec<&str> = report.applied_versions().into_iter().map(|v| v.as_str()).collect();
        assert_eq!(versions, vec!["001", "002"]);
    }

    #[test]
    fn test_report_json_omits_missing_failure() {
        let report = MigrationReport {
            applied: vec![applied("001", 3)],
            skipped: vec![Version::new("000")],
            failed: None,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["applied"][0]["version"], "001");
        assert_eq!(json["applied"][0]["duration_ms"], 3);
        assert_eq!(json["skipped"][0], "000");
        assert!(json.get("failed").is_none());
    }

    #[test]
    fn test_run_phase_display_and_terminal() {
        assert_eq!(RunPhase::Applying(0).to_string(), "applying #1");
        assert!(RunPhase::Failed.is_terminal());
        assert!(!RunPhase::Diffing.is_terminal());
    }

    #[test]
    fn test_status_counts() {
        let status = MigrationStatus {
            entries: vec![
                StatusEntry {
                    version: Version::new("001"),
                    origin: "a".to_string(),
                    applied: true,
                },
                StatusEntry {
                    version: Version::new("002"),
                    origin: "b".to_string(),
                    applied: false,
                },
            ],
            orphaned: vec![Version::new("000")],
        };
        assert_eq!(status.applied_count(), 1);
        assert_eq!(status.pending_count(), 1);
        assert_eq!(status.pending().next().unwrap().version, "002");
    }
}
