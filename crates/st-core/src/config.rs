//! Configuration types and parsing for stratum.yml

use crate::database_kind::{DatabaseKind, Driver};
use crate::error::{CoreError, CoreResult};
use crate::sql_utils::split_qualified_name;
use crate::version_extractor::{VersionExtractor, DEFAULT_VERSION_DELIMITER};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Location searched when none is configured.
pub const DEFAULT_MIGRATIONS_LOCATION: &str = "classpath:/db/migrations/";

/// Classpath root used when none is configured.
pub const DEFAULT_CLASSPATH_ROOT: &str = "src/main/resources";

/// Default name of the tracking table.
pub const DEFAULT_VERSION_TABLE: &str = "schema_version";

/// Default tracking column holding the version token.
pub const DEFAULT_VERSION_COLUMN: &str = "version";

/// Default tracking column holding the application timestamp.
pub const DEFAULT_APPLIED_DATE_COLUMN: &str = "applied_date";

/// Default tracking column holding the execution duration in milliseconds.
pub const DEFAULT_DURATION_COLUMN: &str = "duration";

/// Default extraction policy name.
pub const DEFAULT_VERSION_EXTRACTOR: &str = "timestamp";

/// File names probed by [`Config::load_from_dir`], in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["stratum.yml", "stratum.yaml"];

/// Project configuration from stratum.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Target database connection
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Where migrations live and how versions are extracted
    #[serde(default)]
    pub migrations: MigrationsConfig,

    /// Tracking table schema
    #[serde(default)]
    pub tracking: TrackingConfig,
}

/// Database connection configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Connection url, e.g. `duckdb:./warehouse.duckdb` or `duckdb::memory:`
    #[serde(default)]
    pub url: Option<String>,

    /// Driver name; inferred from the url when absent
    #[serde(default)]
    pub driver: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Database kind; inferred from the url when absent
    #[serde(default)]
    pub kind: Option<String>,
}

impl DatabaseConfig {
    /// True when neither url nor username is set.
    pub fn is_unconfigured(&self) -> bool {
        is_blank(&self.url) && is_blank(&self.username)
    }
}

/// Migration discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationsConfig {
    /// One or more locations (`classpath:`, `file:` or bare paths)
    #[serde(default = "default_locations")]
    pub locations: Vec<String>,

    /// `timestamp` or `base_name`
    #[serde(default = "default_version_extractor")]
    pub version_extractor: String,

    /// Delimiter ending the version prefix for the `timestamp` extractor
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Directories backing `classpath:` locations, relative to the project
    #[serde(default = "default_classpath")]
    pub classpath: Vec<String>,
}

impl Default for MigrationsConfig {
    fn default() -> Self {
        Self {
            locations: default_locations(),
            version_extractor: default_version_extractor(),
            delimiter: default_delimiter(),
            classpath: default_classpath(),
        }
    }
}

/// Tracking table configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrackingConfig {
    #[serde(default = "default_table")]
    pub table: String,

    #[serde(default = "default_version_column")]
    pub version_column: String,

    #[serde(default = "default_applied_date_column")]
    pub applied_date_column: String,

    #[serde(default = "default_duration_column")]
    pub duration_column: String,

    /// Literal DDL replacing the generated CREATE TABLE statement
    #[serde(default)]
    pub create_sql: Option<String>,

    /// Literal DDL replacing the generated DROP TABLE statement
    #[serde(default)]
    pub drop_sql: Option<String>,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            table: default_table(),
            version_column: default_version_column(),
            applied_date_column: default_applied_date_column(),
            duration_column: default_duration_column(),
            create_sql: None,
            drop_sql: None,
        }
    }
}

fn default_locations() -> Vec<String> {
    vec![DEFAULT_MIGRATIONS_LOCATION.to_string()]
}

fn default_version_extractor() -> String {
    DEFAULT_VERSION_EXTRACTOR.to_string()
}

fn default_delimiter() -> String {
    DEFAULT_VERSION_DELIMITER.to_string()
}

fn default_classpath() -> Vec<String> {
    vec![DEFAULT_CLASSPATH_ROOT.to_string()]
}

fn default_table() -> String {
    DEFAULT_VERSION_TABLE.to_string()
}

fn default_version_column() -> String {
    DEFAULT_VERSION_COLUMN.to_string()
}

fn default_applied_date_column() -> String {
    DEFAULT_APPLIED_DATE_COLUMN.to_string()
}

fn default_duration_column() -> String {
    DEFAULT_DURATION_COLUMN.to_string()
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Replace a blank value with its default.
fn default_if_blank(value: &mut String, default: &str) {
    if value.trim().is_empty() {
        *value = default.to_string();
    }
}

impl Config {
    /// Load and validate configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration file and apply defaults, without validating.
    pub fn read(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&content)?;
        config.apply_defaults();
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for stratum.yml or stratum.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let config = Self::read(&Self::find_in_dir(dir)?)?;
        config.validate()?;
        Ok(config)
    }

    /// Locate the configuration file in a project directory.
    pub fn find_in_dir(dir: &Path) -> CoreResult<std::path::PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
            .ok_or_else(|| CoreError::ConfigNotFound {
                path: dir.join(CONFIG_FILE_NAMES[0]).display().to_string(),
            })
    }

    /// Blank tracking names and delimiter fall back to their defaults.
    pub fn apply_defaults(&mut self) {
        let t = &mut self.tracking;
        default_if_blank(&mut t.table, DEFAULT_VERSION_TABLE);
        default_if_blank(&mut t.version_column, DEFAULT_VERSION_COLUMN);
        default_if_blank(&mut t.applied_date_column, DEFAULT_APPLIED_DATE_COLUMN);
        default_if_blank(&mut t.duration_column, DEFAULT_DURATION_COLUMN);
        default_if_blank(
            &mut self.migrations.version_extractor,
            DEFAULT_VERSION_EXTRACTOR,
        );
        if self.migrations.delimiter.is_empty() {
            self.migrations.delimiter = DEFAULT_VERSION_DELIMITER.to_string();
        }
        if self.migrations.locations.is_empty() {
            self.migrations.locations = default_locations();
        }
    }

    /// Validate everything needed to connect and resolve, without any I/O.
    pub fn validate(&self) -> CoreResult<()> {
        self.driver()?;
        self.url()?;
        self.username()?;
        self.database_kind()?;
        self.version_extractor()?;
        self.validate_tracking_table()?;
        Ok(())
    }

    /// The tracking table must be `[catalog.][schema.]table` with no empty part.
    fn validate_tracking_table(&self) -> CoreResult<()> {
        match split_qualified_name(&self.tracking.table) {
            Some(_) => Ok(()),
            None => Err(CoreError::configuration(format!(
                "Tracking table '{}' is invalid. Expected [catalog.][schema.]table",
                self.tracking.table
            ))),
        }
    }

    /// The connection url, which must not be blank.
    pub fn url(&self) -> CoreResult<&str> {
        non_blank(&self.database.url).ok_or_else(|| {
            CoreError::configuration("No database url. Specify one in the configuration.")
        })
    }

    /// The username, which must not be blank.
    pub fn username(&self) -> CoreResult<&str> {
        non_blank(&self.database.username).ok_or_else(|| {
            CoreError::configuration("No database username. Specify one in the configuration.")
        })
    }

    /// The password, empty when not configured.
    pub fn password(&self) -> &str {
        self.database.password.as_deref().unwrap_or("")
    }

    /// The configured driver, or the one inferred from the url.
    pub fn driver(&self) -> CoreResult<Driver> {
        if let Some(name) = non_blank(&self.database.driver) {
            return Driver::parse(name);
        }
        non_blank(&self.database.url)
            .and_then(Driver::from_url)
            .ok_or_else(|| {
                CoreError::configuration("No database driver. Specify one in the configuration.")
            })
    }

    /// The configured database kind, or the one inferred from the url.
    pub fn database_kind(&self) -> CoreResult<DatabaseKind> {
        match non_blank(&self.database.kind) {
            Some(kind) => DatabaseKind::parse(kind),
            None => Ok(non_blank(&self.database.url)
                .map(DatabaseKind::from_url)
                .unwrap_or_default()),
        }
    }

    /// The configured version extraction policy.
    pub fn version_extractor(&self) -> CoreResult<VersionExtractor> {
        VersionExtractor::from_config_name(
            &self.migrations.version_extractor,
            &self.migrations.delimiter,
        )
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
