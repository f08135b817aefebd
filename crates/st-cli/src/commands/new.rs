//! New command implementation

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use st_core::{normalize_location, Scheme};
use std::fs;
use std::path::PathBuf;

use crate::cli::{GlobalArgs, NewArgs};
use crate::commands::common::{display_relative, load_project, Project};

/// Timestamp prefix format; fixed width so file names sort chronologically.
const VERSION_FORMAT: &str = "%Y%m%d%H%M%S";

/// Execute the new command
pub(crate) fn execute(args: &NewArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let dir = match &args.dir {
        Some(dir) => project.root.join(dir),
        None => target_dir(&project)?,
    };
    let file_name = migration_file_name(&args.name, Utc::now())?;
    let path = dir.join(&file_name);

    if path.exists() {
        bail!("Migration already exists: {}", path.display());
    }
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    fs::write(&path, format!("-- {}\n", args.name.trim()))
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Created {}", display_relative(&path, &project.root));
    Ok(())
}

/// `<yyyyMMddHHmmss>_<name>.sql` with the name lowercased and every run of
/// non-alphanumeric characters collapsed to `_`.
pub(crate) fn migration_file_name(name: &str, now: DateTime<Utc>) -> Result<String> {
    let mut slug = String::new();
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let slug = slug.trim_end_matches('_');
    if slug.is_empty() {
        bail!("Migration name '{}' has no usable characters", name);
    }
    Ok(format!("{}_{}.sql", now.format(VERSION_FORMAT), slug))
}

/// Directory behind the first configured location.
///
/// `classpath:` locations map into the first classpath root.
fn target_dir(project: &Project) -> Result<PathBuf> {
    let kind = project.database_kind()?;
    let location = project
        .config
        .migrations
        .locations
        .first()
        .context("No migration locations configured")?;
    let pattern = normalize_location(location, kind)?;
    let directory = pattern.directory();

    match pattern.scheme {
        Scheme::File => Ok(project.root.join(directory)),
        Scheme::Classpath => {
            let root = project
                .config
                .migrations
                .classpath
                .first()
                .context("No classpath roots configured")?;
            Ok(project
                .root
                .join(root)
                .join(directory.trim_start_matches(['/', '\\'])))
        }
    }
}

#[cfg(test)]
#[path = "new_test.rs"]
mod tests;
