//! Database kinds and drivers recognized by Stratum.

use crate::error::{CoreError, CoreResult};
use std::fmt;

/// Kind of target database.
///
/// Used as the dialect hint passed to migration resolution (see
/// [`crate::location::DATABASE_KIND_PLACEHOLDER`]). The set is closed: an
/// unrecognized configured value is a configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DatabaseKind {
    DuckDb,
    Postgresql,
    MySql,
    Sqlite,
    SqlServer,
    Oracle,
    H2,
    Hsql,
    Derby,
    #[default]
    Unknown,
}

impl DatabaseKind {
    /// Every recognized kind, in display order.
    pub const ALL: &'static [DatabaseKind] = &[
        DatabaseKind::DuckDb,
        DatabaseKind::Postgresql,
        DatabaseKind::MySql,
        DatabaseKind::Sqlite,
        DatabaseKind::SqlServer,
        DatabaseKind::Oracle,
        DatabaseKind::H2,
        DatabaseKind::Hsql,
        DatabaseKind::Derby,
        DatabaseKind::Unknown,
    ];

    /// Lowercase identifier used in configuration and location interpolation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseKind::DuckDb => "duckdb",
            DatabaseKind::Postgresql => "postgresql",
            DatabaseKind::MySql => "mysql",
            DatabaseKind::Sqlite => "sqlite",
            DatabaseKind::SqlServer => "sqlserver",
            DatabaseKind::Oracle => "oracle",
            DatabaseKind::H2 => "h2",
            DatabaseKind::Hsql => "hsql",
            DatabaseKind::Derby => "derby",
            DatabaseKind::Unknown => "unknown",
        }
    }

    /// Parse a configured kind (case-insensitive).
    pub fn parse(value: &str) -> CoreResult<Self> {
        let wanted = value.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(DatabaseKind::as_str).collect();
                CoreError::configuration(format!(
                    "Database type of '{}' is invalid. Valid values: {}",
                    value,
                    valid.join(", ")
                ))
            })
    }

    /// Infer the kind from a connection url, `Unknown` when unrecognized.
    ///
    /// ```
    /// use st_core::DatabaseKind;
    /// assert_eq!(DatabaseKind::from_url("duckdb:./warehouse.duckdb"), DatabaseKind::DuckDb);
    /// assert_eq!(DatabaseKind::from_url("jdbc:postgresql://db/app"), DatabaseKind::Postgresql);
    /// assert_eq!(DatabaseKind::from_url("mongodb://db"), DatabaseKind::Unknown);
    /// ```
    pub fn from_url(url: &str) -> Self {
        match url_scheme(url).as_str() {
            "duckdb" => DatabaseKind::DuckDb,
            "postgresql" | "postgres" => DatabaseKind::Postgresql,
            "mysql" | "mariadb" => DatabaseKind::MySql,
            "sqlite" => DatabaseKind::Sqlite,
            "sqlserver" | "jtds" => DatabaseKind::SqlServer,
            "oracle" => DatabaseKind::Oracle,
            "h2" => DatabaseKind::H2,
            "hsqldb" => DatabaseKind::Hsql,
            "derby" => DatabaseKind::Derby,
            _ => DatabaseKind::Unknown,
        }
    }
}

impl fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database driver able to open a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Driver {
    /// Embedded DuckDB
    DuckDb,
}

impl Driver {
    /// Every driver compiled into this build.
    pub const ALL: &'static [Driver] = &[Driver::DuckDb];

    /// Configuration name of the driver.
    pub fn as_str(&self) -> &'static str {
        match self {
            Driver::DuckDb => "duckdb",
        }
    }

    /// Parse a configured driver name (case-insensitive).
    pub fn parse(value: &str) -> CoreResult<Self> {
        let wanted = value.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|d| d.as_str() == wanted)
            .ok_or_else(|| {
                CoreError::configuration(format!(
                    "Can't load driver '{}'. Available drivers: {}",
                    value,
                    Self::ALL
                        .iter()
                        .map(Driver::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }

    /// Infer the driver from a connection url.
    pub fn from_url(url: &str) -> Option<Self> {
        match url_scheme(url).as_str() {
            "duckdb" => Some(Driver::DuckDb),
            _ => None,
        }
    }

    /// Strip the driver's scheme from `url`, leaving the driver-specific part.
    ///
    /// ```
    /// use st_core::Driver;
    /// assert_eq!(Driver::DuckDb.target_of("jdbc:duckdb:./app.duckdb"), "./app.duckdb");
    /// assert_eq!(Driver::DuckDb.target_of("duckdb::memory:"), ":memory:");
    /// assert_eq!(Driver::DuckDb.target_of("duckdb:"), ":memory:");
    /// ```
    pub fn target_of<'a>(&self, url: &'a str) -> &'a str {
        let rest = strip_jdbc(url.trim());
        let target = rest
            .split_once(':')
            .map(|(_, target)| target)
            .unwrap_or(rest);
        match self {
            Driver::DuckDb if target.is_empty() => ":memory:",
            Driver::DuckDb => target,
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn strip_jdbc(url: &str) -> &str {
    url.strip_prefix("jdbc:").unwrap_or(url)
}

fn url_scheme(url: &str) -> String {
    let rest = strip_jdbc(url.trim());
    rest.split(':').next().unwrap_or("").to_ascii_lowercase()
}
