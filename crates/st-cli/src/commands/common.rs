//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use st_core::{Config, DatabaseKind, MigrationResolver};
use st_migrate::MigrationManager;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) u8);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exit code {}", self.0)
    }
}

impl std::error::Error for ExitCode {}

/// A loaded configuration and the directory relative paths resolve against.
#[derive(Debug)]
pub(crate) struct Project {
    pub(crate) config: Config,
    pub(crate) root: PathBuf,
}

impl Project {
    /// Migration resolver for this project. Needs no database settings.
    pub(crate) fn resolver(&self) -> Result<MigrationResolver> {
        MigrationResolver::from_config(&self.config, &self.root)
            .context("Invalid migrations configuration")
    }

    /// Database kind hint, inferred from the url when not configured.
    pub(crate) fn database_kind(&self) -> Result<DatabaseKind> {
        self.config
            .database_kind()
            .context("Invalid database configuration")
    }

    /// Connect and build a manager.
    ///
    /// Returns `None` after a warning when neither url nor username is set,
    /// so an unconfigured project is a no-op rather than an error.
    pub(crate) fn manager(&self) -> Result<Option<MigrationManager>> {
        if self.config.database.is_unconfigured() {
            log::warn!("No database url or username configured, skipping");
            return Ok(None);
        }
        let manager = MigrationManager::from_config(&self.config, &self.root)
            .context("Failed to set up migration manager")?;
        Ok(Some(manager))
    }
}

/// Load the project configuration without validating database settings.
///
/// `--config` overrides the file looked up in the project directory.
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    let root = PathBuf::from(&global.project_dir);
    let config_path = match &global.config {
        Some(path) => PathBuf::from(path),
        None => Config::find_in_dir(&root).context("Failed to load project")?,
    };
    log::debug!("Loading configuration from {}", config_path.display());
    let config = Config::read(&config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;
    Ok(Project { config, root })
}

/// Print `value` as pretty JSON on stdout.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

/// Render a path relative to `root` when it lives under it.
pub(crate) fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
