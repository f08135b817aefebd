//! Migration resources and the loaders that enumerate them.

use crate::error::{CoreError, CoreResult};
use crate::location::{LocationPattern, Scheme};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where a resource's bytes come from.
#[derive(Debug, Clone)]
pub enum ResourceSource {
    /// A file on disk, read lazily
    File(PathBuf),
    /// Text held in memory
    Inline(Arc<str>),
}

/// A named, possibly readable entry found under a location pattern.
#[derive(Debug, Clone)]
pub struct Resource {
    /// Bare name (no directories), e.g. `001_init.sql`
    pub name: String,

    /// Human-readable origin used in logs and errors
    pub origin: String,

    /// Whether the content can be read; unreadable resources are skipped
    pub readable: bool,

    pub source: ResourceSource,
}

impl Resource {
    /// Build a readable in-memory resource.
    pub fn inline(name: impl Into<String>, origin: impl Into<String>, text: &str) -> Self {
        Self {
            name: name.into(),
            origin: origin.into(),
            readable: true,
            source: ResourceSource::Inline(Arc::from(text)),
        }
    }

    /// Whether the bare name marks a hidden entry (`.svn`, `.#001.sql`, ...).
    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }

    /// Read the full content as UTF-8 text.
    pub fn read_to_string(&self) -> CoreResult<String> {
        match &self.source {
            ResourceSource::File(path) => {
                fs::read_to_string(path).map_err(|e| CoreError::ResourceAccess {
                    location: path.display().to_string(),
                    source: e,
                })
            }
            ResourceSource::Inline(text) => Ok(text.to_string()),
        }
    }
}

/// Turns a normalized location pattern into the resources it matches.
pub trait ResourceLoader: Send + Sync {
    /// List every resource matching `pattern`, readable or not.
    ///
    /// A pattern matching nothing yields an empty list, not an error.
    fn list_resources(&self, pattern: &LocationPattern) -> CoreResult<Vec<Resource>>;
}

/// Loader backed by the local filesystem.
///
/// `file:` patterns resolve against `base_dir` unless absolute. `classpath:`
/// patterns resolve against the first classpath root that contains the
/// pattern's directory.
#[derive(Debug, Clone)]
pub struct FileSystemResourceLoader {
    base_dir: PathBuf,
    classpath_roots: Vec<PathBuf>,
}

impl FileSystemResourceLoader {
    /// Create a loader rooted at `base_dir`, with classpath roots taken
    /// relative to it.
    pub fn new(base_dir: impl Into<PathBuf>, classpath_roots: &[String]) -> Self {
        let base_dir = base_dir.into();
        let classpath_roots = classpath_roots
            .iter()
            .map(|root| absolutize(&base_dir, root))
            .collect();
        Self {
            base_dir,
            classpath_roots,
        }
    }

    /// The directory `file:` patterns resolve against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve a pattern to an absolute glob expression, or `None` when no
    /// classpath root contains its directory.
    ///
    /// Only the wildcard tail of the pattern is a glob; the directory in
    /// front of it is escaped, so `[`, `]`, `?` and `*` in the project path
    /// or a classpath root match literally.
    fn resolve_glob(&self, pattern: &LocationPattern) -> Option<String> {
        let directory = pattern.directory();
        let tail = &pattern.path[directory.len()..];
        let dir = match pattern.scheme {
            Scheme::File => absolutize(&self.base_dir, directory),
            Scheme::Classpath => {
                let relative = directory.trim_start_matches(['/', '\\']);
                self.classpath_roots
                    .iter()
                    .map(|root| root.join(relative))
                    .find(|dir| dir.is_dir())?
            }
        };

        let mut literal = dir.to_string_lossy().to_string();
        if !literal.ends_with(['/', '\\']) {
            literal.push(std::path::MAIN_SEPARATOR);
        }
        Some(format!("{}{}", glob::Pattern::escape(&literal), tail))
    }
}

impl ResourceLoader for FileSystemResourceLoader {
    fn list_resources(&self, pattern: &LocationPattern) -> CoreResult<Vec<Resource>> {
        let Some(glob_str) = self.resolve_glob(pattern) else {
            log::debug!("No classpath root contains '{}'", pattern);
            return Ok(Vec::new());
        };
        log::debug!("Expanding '{}' as '{}'", pattern, glob_str);

        let entries = glob::glob(&glob_str).map_err(|e| CoreError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        let mut resources = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| CoreError::ResourceAccess {
                location: e.path().display().to_string(),
                source: e.into_error(),
            })?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            resources.push(Resource {
                name,
                origin: path.display().to_string(),
                readable: is_readable_file(&path),
                source: ResourceSource::File(path),
            });
        }
        Ok(resources)
    }
}

/// Loader serving resources registered in memory, keyed by the normalized
/// pattern string (`classpath:/db/migrations/*`).
#[derive(Debug, Clone, Default)]
pub struct InMemoryResourceLoader {
    resources: HashMap<String, Vec<Resource>>,
}

impl InMemoryResourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a readable script under `pattern`.
    pub fn with_script(mut self, pattern: &str, name: &str, sql: &str) -> Self {
        let origin = format!("{}{}", pattern.trim_end_matches('*'), name);
        self.resources
            .entry(pattern.to_string())
            .or_default()
            .push(Resource::inline(name, origin, sql));
        self
    }

    /// Register an arbitrary resource under `pattern`.
    pub fn with_resource(mut self, pattern: &str, resource: Resource) -> Self {
        self.resources
            .entry(pattern.to_string())
            .or_default()
            .push(resource);
        self
    }
}

impl ResourceLoader for InMemoryResourceLoader {
    fn list_resources(&self, pattern: &LocationPattern) -> CoreResult<Vec<Resource>> {
        Ok(self
            .resources
            .get(&pattern.to_string())
            .cloned()
            .unwrap_or_default())
    }
}

fn absolutize(base_dir: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

fn is_readable_file(path: &Path) -> bool {
    path.is_file() && fs::File::open(path).is_ok()
}

#[cfg(test)]
#[path = "resource_test.rs"]
mod tests;
