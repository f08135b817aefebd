//! Migrate command implementation

use anyhow::Result;
use st_migrate::MigrationReport;

use crate::cli::{GlobalArgs, MigrateArgs, OutputFormat};
use crate::commands::common::{load_project, print_json};

/// Execute the migrate command
pub(crate) fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let Some(mut manager) = project.manager()? else {
        return Ok(());
    };

    match manager.migrate() {
        Ok(report) => print_report(&report, args.output),
        Err(err) => {
            if let Some(report) = err.report() {
                print_report(report, args.output)?;
            }
            Err(err.into())
        }
    }
}

fn print_report(report: &MigrationReport, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Json => print_json(report),
        OutputFormat::Text => {
            print!("{}", format_report(report));
            Ok(())
        }
    }
}

/// Human-readable summary of a run.
pub(crate) fn format_report(report: &MigrationReport) -> String {
    let mut out = String::new();
    for applied in &report.applied {
        out.push_str(&format!(
            "  Applied {} ({}) in {} ms\n",
            applied.version, applied.origin, applied.duration_ms
        ));
    }
    if let Some(failed) = &report.failed {
        out.push_str(&format!(
            "  Failed  {} ({}): {}\n",
            failed.version, failed.origin, failed.error
        ));
    }
    if report.applied.is_empty() && report.is_success() {
        out.push_str("Database is up to date, nothing to migrate\n");
    } else {
        out.push_str(&format!(
            "\nApplied {} migration{} in {} ms, {} already applied\n",
            report.applied.len(),
            if report.applied.len() == 1 { "" } else { "s" },
            report.total_duration_ms(),
            report.skipped.len()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use st_core::Version;
    use st_migrate::{AppliedMigration, FailedMigration};

    #[test]
    fn test_format_up_to_date() {
        let report = MigrationReport {
            applied: Vec::new(),
            skipped: vec![Version::new("001")],
            failed: None,
        };
        assert_eq!(
            format_report(&report),
            "Database is up to date, nothing to migrate\n"
        );
    }

    #[test]
    fn test_format_partial_failure() {
        let report = MigrationReport {
            applied: vec![AppliedMigration {
                version: Version::new("001"),
                origin: "file:db/001_init.sql".to_string(),
                duration_ms: 3,
            }],
            skipped: Vec::new(),
            failed: Some(FailedMigration {
                version: Version::new("002"),
                origin: "file:db/002_bad.sql".to_string(),
                error: "syntax error".to_string(),
            }),
        };
        let text = format_report(&report);
        assert!(text.contains("Applied 001 (file:db/001_init.sql) in 3 ms"));
        assert!(text.contains("Failed  002 (file:db/002_bad.sql): syntax error"));
        assert!(text.contains("Applied 1 migration in 3 ms, 0 already applied"));
    }
}
