//! Status command implementation

use anyhow::Result;
use st_migrate::MigrationStatus;

use crate::cli::{GlobalArgs, OutputFormat, StatusArgs};
use crate::commands::common::{load_project, print_json};

/// Execute the status command
pub(crate) fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let Some(manager) = project.manager()? else {
        return Ok(());
    };

    let status = manager.status()?;
    match args.output {
        OutputFormat::Json => print_json(&status),
        OutputFormat::Text => {
            print!("{}", format_status(&status));
            Ok(())
        }
    }
}

/// Render one line per migration plus orphaned tracking rows.
pub(crate) fn format_status(status: &MigrationStatus) -> String {
    let mut out = String::new();
    for entry in &status.entries {
        let marker = if entry.applied { "applied" } else { "pending" };
        out.push_str(&format!(
            "  [{}] {}  {}\n",
            marker, entry.version, entry.origin
        ));
    }
    for version in &status.orphaned {
        out.push_str(&format!("  [missing] {}  (no migration script)\n", version));
    }
    out.push_str(&format!(
        "\n{} applied, {} pending",
        status.applied_count(),
        status.pending_count()
    ));
    if !status.orphaned.is_empty() {
        out.push_str(&format!(", {} missing", status.orphaned.len()));
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use st_core::Version;
    use st_migrate::StatusEntry;

    #[test]
    fn test_format_status() {
        let status = MigrationStatus {
            entries: vec![
                StatusEntry {
                    version: Version::new("001"),
                    origin: "file:db/001_init.sql".to_string(),
                    applied: true,
                },
                StatusEntry {
                    version: Version::new("002"),
                    origin: "file:db/002_add.sql".to_string(),
                    applied: false,
                },
            ],
            orphaned: vec![Version::new("000")],
        };

        let text = format_status(&status);
        assert!(text.contains("[applied] 001  file:db/001_init.sql"));
        assert!(text.contains("[pending] 002  file:db/002_add.sql"));
        assert!(text.contains("[missing] 000"));
        assert!(text.ends_with("1 applied, 1 pending, 1 missing\n"));
    }
}
