//! Migration discovery across configured locations.

use crate::config::{Config, DEFAULT_MIGRATIONS_LOCATION};
use crate::database_kind::DatabaseKind;
use crate::error::{CoreError, CoreResult};
use crate::location::normalize_location;
use crate::migration::{Migration, MigrationSet};
use crate::resource::{FileSystemResourceLoader, Resource, ResourceLoader};
use crate::version_extractor::VersionExtractor;
use std::path::Path;

/// Discovers migration scripts and turns them into a [`MigrationSet`].
///
/// Every non-hidden, readable resource found directly under a configured
/// location is a migration. Its version comes from the configured
/// [`VersionExtractor`]; a version seen twice aborts resolution.
pub struct MigrationResolver {
    locations: Vec<String>,
    extractor: VersionExtractor,
    loader: Box<dyn ResourceLoader>,
}

impl MigrationResolver {
    /// Create a resolver. An empty `locations` list means the default
    /// `classpath:/db/migrations/` location.
    pub fn new(
        locations: Vec<String>,
        extractor: VersionExtractor,
        loader: impl ResourceLoader + 'static,
    ) -> Self {
        let locations = if locations.is_empty() {
            vec![DEFAULT_MIGRATIONS_LOCATION.to_string()]
        } else {
            locations
        };
        Self {
            locations,
            extractor,
            loader: Box::new(loader),
        }
    }

    /// Build a filesystem-backed resolver from a validated configuration,
    /// resolving relative paths against `base_dir`.
    pub fn from_config(config: &Config, base_dir: &Path) -> CoreResult<Self> {
        let loader = FileSystemResourceLoader::new(base_dir, &config.migrations.classpath);
        Ok(Self::new(
            config.migrations.locations.clone(),
            config.version_extractor()?,
            loader,
        ))
    }

    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    pub fn extractor(&self) -> &VersionExtractor {
        &self.extractor
    }

    /// Resolve migrations without a database kind hint.
    pub fn resolve_default(&self) -> CoreResult<MigrationSet> {
        self.resolve(DatabaseKind::Unknown)
    }

    /// Discover all migrations, interpolating `kind` into the locations.
    ///
    /// Fails with `NoMigrationsFound` when nothing usable is discovered and
    /// with `DuplicateVersion` when two resources share a version; no
    /// partial set is returned in either case.
    pub fn resolve(&self, kind: DatabaseKind) -> CoreResult<MigrationSet> {
        let resources: Vec<Resource> = self
            .find_resources(kind)?
            .into_iter()
            .filter(|r| {
                if r.is_hidden() || r.name.is_empty() {
                    log::debug!("Skipping hidden resource '{}'", r.origin);
                    return false;
                }
                if !r.readable {
                    log::warn!("Skipping unreadable resource '{}'", r.origin);
                    return false;
                }
                true
            })
            .collect();

        if resources.is_empty() {
            let locations = self.locations.join(", ");
            log::error!("No migrations were found using resource pattern(s) [{locations}]");
            return Err(CoreError::NoMigrationsFound { locations });
        }

        log::debug!(
            "Found {} resources: {}",
            resources.len(),
            resources
                .iter()
                .map(|r| r.origin.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let mut migrations = MigrationSet::new();
        for resource in resources {
            // Filtered above, so the name is non-empty and a version exists.
            let Some(version) = self.extractor.extract_version(&resource.name) else {
                continue;
            };
            if let Err(e) = migrations.insert(Migration::new(version, resource)) {
                log::error!("{e}");
                return Err(e);
            }
        }
        Ok(migrations)
    }

    /// Collect resources from every location, in location order.
    fn find_resources(&self, kind: DatabaseKind) -> CoreResult<Vec<Resource>> {
        let mut resources = Vec::new();
        for location in &self.locations {
            let pattern = normalize_location(location, kind)?;
            log::debug!("Looking up migrations in '{}'", pattern);
            resources.extend(self.loader.list_resources(&pattern)?);
        }
        Ok(resources)
    }
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;
