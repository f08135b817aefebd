//! Validate command implementation

use anyhow::Result;

use crate::cli::{GlobalArgs, ValidateArgs};
use crate::commands::common::{load_project, ExitCode};

/// Execute the validate command
///
/// Exits with status 1 when any resolved migration is not yet applied.
pub(crate) fn execute(args: &ValidateArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let Some(manager) = project.manager()? else {
        return Ok(());
    };

    let pending = manager.pending_migrations()?;
    if pending.is_empty() {
        if !args.quiet {
            println!("Database is up to date");
        }
        return Ok(());
    }

    if !args.quiet {
        println!("{} pending migration(s):", pending.len());
        for migration in &pending {
            println!("  {}  {}", migration.version(), migration.origin());
        }
    }
    Err(ExitCode(1).into())
}
