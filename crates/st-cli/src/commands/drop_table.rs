//! Drop-table command implementation

use anyhow::{bail, Result};

use crate::cli::{DropTableArgs, GlobalArgs};
use crate::commands::common::load_project;

/// Execute the drop-table command
pub(crate) fn execute(args: &DropTableArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let table = project.config.tracking.table.clone();
    if !args.yes {
        bail!(
            "Refusing to drop tracking table '{}' without --yes; every migration would be re-applied on the next run",
            table
        );
    }

    let Some(manager) = project.manager()? else {
        return Ok(());
    };
    manager.drop_tracking_table()?;
    println!("Dropped tracking table '{}'", table);
    Ok(())
}
