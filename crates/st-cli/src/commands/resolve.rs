//! Resolve command implementation

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::{GlobalArgs, OutputFormat, ResolveArgs};
use crate::commands::common::{load_project, print_json};

/// One discovered migration, as printed by `resolve`
#[derive(Debug, Serialize)]
struct ResolvedMigration {
    version: String,
    name: String,
    origin: String,
}

/// Execute the resolve command
pub(crate) fn execute(args: &ResolveArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let kind = project.database_kind()?;
    let migrations = project
        .resolver()?
        .resolve(kind)
        .context("Failed to resolve migrations")?;

    let resolved: Vec<ResolvedMigration> = migrations
        .into_sorted()
        .into_iter()
        .map(|m| ResolvedMigration {
            version: m.version().to_string(),
            name: m.name().to_string(),
            origin: m.origin().to_string(),
        })
        .collect();

    match args.output {
        OutputFormat::Json => print_json(&resolved),
        OutputFormat::Text => {
            let width = resolved.iter().map(|m| m.version.len()).max().unwrap_or(0);
            for m in &resolved {
                println!("  {:<width$}  {}", m.version, m.origin, width = width);
            }
            println!("\n{} migration(s) found", resolved.len());
            Ok(())
        }
    }
}
