//! Migration location normalization.
//!
//! A configured location such as `classpath:/db/migrations/` or
//! `src/main/db/migrations` becomes a [`LocationPattern`] matching every
//! entry directly under that location, with an explicit scheme.

use crate::database_kind::DatabaseKind;
use crate::error::{CoreError, CoreResult};
use crate::version_extractor::bare_name;
use std::fmt;

/// Placeholder replaced by the database kind hint in a location string.
pub const DATABASE_KIND_PLACEHOLDER: &str = "{database_kind}";

const FILE_PREFIX: &str = "file:";
const CLASSPATH_PREFIX: &str = "classpath:";

/// Where a location pattern is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// Filesystem path, relative to the project directory unless absolute
    File,
    /// Path inside the configured classpath roots
    Classpath,
}

impl Scheme {
    /// The `scheme:` prefix as written in locations.
    pub fn prefix(&self) -> &'static str {
        match self {
            Scheme::File => FILE_PREFIX,
            Scheme::Classpath => CLASSPATH_PREFIX,
        }
    }
}

/// A normalized location: explicit scheme plus a glob path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocationPattern {
    pub scheme: Scheme,
    pub path: String,
}

impl LocationPattern {
    /// Leading part of the path that contains no wildcard, up to and
    /// including the last separator before the first wildcard.
    ///
    /// ```
    /// use st_core::normalize_location;
    /// use st_core::DatabaseKind;
    /// let p = normalize_location("classpath:/db/migrations/", DatabaseKind::Unknown).unwrap();
    /// assert_eq!(p.directory(), "/db/migrations/");
    /// ```
    pub fn directory(&self) -> &str {
        let first_glob = self
            .path
            .find(['*', '?', '['])
            .unwrap_or(self.path.len());
        match self.path[..first_glob].rfind(['/', '\\']) {
            Some(pos) => &self.path[..=pos],
            None => "",
        }
    }
}

impl fmt::Display for LocationPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.scheme.prefix(), self.path)
    }
}

/// Normalize a configured location into a lookup pattern.
///
/// - `{database_kind}` is replaced by the lowercase kind name.
/// - A location whose last segment is neither empty nor a glob gets a `/`.
/// - A location whose last segment is not a glob gets a `*`.
/// - A location without `file:` or `classpath:` gets `file:`.
///
/// ```
/// use st_core::{normalize_location, DatabaseKind};
/// let kind = DatabaseKind::Unknown;
/// assert_eq!(normalize_location("classpath:/db/migrations/", kind).unwrap().to_string(), "classpath:/db/migrations/*");
/// assert_eq!(normalize_location("src/main/db/migrations", kind).unwrap().to_string(), "file:src/main/db/migrations/*");
/// assert_eq!(normalize_location("file:db/*.sql", kind).unwrap().to_string(), "file:db/*.sql");
/// ```
pub fn normalize_location(location: &str, kind: DatabaseKind) -> CoreResult<LocationPattern> {
    let mut converted = location
        .trim()
        .replace(DATABASE_KIND_PLACEHOLDER, kind.as_str());

    if converted.is_empty() {
        return Err(CoreError::InvalidPattern {
            pattern: location.to_string(),
            reason: "location is blank".to_string(),
        });
    }

    let last = bare_name(&converted);
    if !(last.trim().is_empty() || last.contains('*')) {
        converted.push('/');
    }

    if !bare_name(&converted).contains('*') {
        converted.push('*');
    }

    if let Some(path) = converted.strip_prefix(CLASSPATH_PREFIX) {
        return Ok(LocationPattern {
            scheme: Scheme::Classpath,
            path: path.to_string(),
        });
    }

    let path = converted
        .strip_prefix(FILE_PREFIX)
        .unwrap_or(&converted)
        .to_string();
    Ok(LocationPattern {
        scheme: Scheme::File,
        path,
    })
}

#[cfg(test)]
#[path = "location_test.rs"]
mod tests;
