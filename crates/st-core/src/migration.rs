//! Migration value type and the candidate set produced by resolution.

use crate::error::{CoreError, CoreResult};
use crate::resource::Resource;
use crate::version::Version;
use std::collections::hash_map::{Entry, HashMap};
use std::hash::{Hash, Hasher};

/// A discovered migration: version token plus a handle to its script.
///
/// Identity is the version alone; two migrations with the same version are
/// equal regardless of content or origin.
#[derive(Debug, Clone)]
pub struct Migration {
    version: Version,
    resource: Resource,
}

impl Migration {
    pub fn new(version: Version, resource: Resource) -> Self {
        Self { version, resource }
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Location the script was discovered at.
    pub fn origin(&self) -> &str {
        &self.resource.origin
    }

    /// Bare resource name the version was extracted from.
    pub fn name(&self) -> &str {
        &self.resource.name
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Read the full script text.
    pub fn script(&self) -> CoreResult<String> {
        self.resource.read_to_string()
    }
}

impl PartialEq for Migration {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
    }
}

impl Eq for Migration {}

impl Hash for Migration {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.version.hash(state);
    }
}

/// Unordered set of migrations with unique versions.
#[derive(Debug, Clone, Default)]
pub struct MigrationSet {
    migrations: HashMap<Version, Migration>,
}

impl MigrationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a migration, rejecting a version that is already present.
    pub fn insert(&mut self, migration: Migration) -> CoreResult<()> {
        match self.migrations.entry(migration.version.clone()) {
            Entry::Occupied(existing) => Err(CoreError::DuplicateVersion {
                version: migration.version.to_string(),
                first: existing.get().origin().to_string(),
                second: migration.origin().to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(migration);
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    pub fn contains(&self, version: &str) -> bool {
        self.migrations.contains_key(version)
    }

    pub fn get(&self, version: &str) -> Option<&Migration> {
        self.migrations.get(version)
    }

    /// Iterate in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Migration> {
        self.migrations.values()
    }

    /// All versions in ascending lexicographic order.
    pub fn versions(&self) -> Vec<&Version> {
        let mut versions: Vec<&Version> = self.migrations.keys().collect();
        versions.sort();
        versions
    }

    /// Consume the set into migrations sorted ascending by version.
    pub fn into_sorted(self) -> Vec<Migration> {
        let mut migrations: Vec<Migration> = self.migrations.into_values().collect();
        migrations.sort_by(|a, b| a.version.cmp(&b.version));
        migrations
    }
}
