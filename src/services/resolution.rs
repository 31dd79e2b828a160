//! Effective library definition resolution.
//!
//! Flattens a library map into the ordered list of libraries it defines,
//! following includes depth-first and left-to-right. Includes are resolved
//! relative to the directory of the map that contains them, so shared maps
//! can be moved around together with their libraries.
//!
//! Missing, unreadable or circular targets become
//! [`Issues`](crate::models::Issues). Only an include that exists but cannot
//! be parsed as a library map fails the whole call.

use crate::error::{LibraryMapError, Result};
use crate::models::{
    CircularInclude, LibraryDefinition, LibraryMapConfig, LibraryMapInclude, Resolution,
    ResolvedLibrary, Statement,
};
use crate::services::paths::resolve_path;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs::File;
use std::io::Read;

/// How thoroughly library and include targets are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Number of leading bytes to read. 0 only checks that the path is a regular file.
    pub probe_bytes: usize,
}

impl ValidationOptions {
    pub const DEFAULT_PROBE_BYTES: usize = 4;
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            probe_bytes: Self::DEFAULT_PROBE_BYTES,
        }
    }
}

/// Check that `path` is a readable regular file.
///
/// Returns a human-readable reason when it is not.
pub fn validate_path(path: &Utf8Path, options: &ValidationOptions) -> Option<String> {
    let metadata = match path.metadata() {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Some("file does not exist".to_string());
        }
        Err(e) => return Some(format!("cannot access file: {}", e)),
    };

    if !metadata.is_file() {
        return Some("not a regular file".to_string());
    }

    if options.probe_bytes == 0 {
        return None;
    }

    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) => return Some(format!("cannot open file: {}", e)),
    };
    let mut buf = vec![0u8; options.probe_bytes];
    match file.read(&mut buf) {
        Ok(0) => Some("file is empty".to_string()),
        Ok(_) => None,
        Err(e) => Some(format!("cannot read file: {}", e)),
    }
}

/// Resolves library maps into flat lists of [`ResolvedLibrary`].
///
/// Stateless apart from its options; the same resolver can be used for any
/// number of maps, from any number of threads.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    options: ValidationOptions,
}

impl Resolver {
    pub fn new(options: ValidationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Resolve `config` with relative paths taken from `base_folder`.
    ///
    /// # Errors
    ///
    /// Fails only when an include target exists but is not a valid library map.
    /// Everything else is reported through [`Resolution::issues`].
    ///
    /// The include chain starts empty. When `config` is the content of a map
    /// file, prefer [`Resolver::resolve_as`] so self-includes are caught at once.
    pub fn resolve(&self, config: &LibraryMapConfig, base_folder: &Utf8Path) -> Result<Resolution> {
        let mut chain = Vec::new();
        self.resolve_statements(config, base_folder, &mut chain)
    }

    /// Read the map stored at `map_path` and resolve it relative to its own directory.
    pub fn resolve_file(&self, map_path: &Utf8Path) -> Result<Resolution> {
        let map_path = resolve_path(map_path, Utf8Path::new("."))?;
        let config = LibraryMapConfig::read_json(&map_path)?;
        self.resolve_as(&config, &map_path)
    }

    /// Resolve `config` as if it were stored at `map_path`.
    ///
    /// Relative paths are taken from the directory of `map_path`, and
    /// `map_path` itself counts as part of the include chain, so a map that
    /// includes itself is reported as circular right away. Use this for an
    /// edited map that has not been written back yet.
    pub fn resolve_as(&self, config: &LibraryMapConfig, map_path: &Utf8Path) -> Result<Resolution> {
        let map_path = resolve_path(map_path, Utf8Path::new("."))?;
        let base_folder = match map_path.parent() {
            Some(parent) => parent.to_path_buf(),
            None => {
                return Err(LibraryMapError::InvalidPath {
                    path: map_path.as_str().to_string(),
                    reason: "library map has no parent directory",
                });
            }
        };

        let mut chain = vec![map_path];
        self.resolve_statements(config, &base_folder, &mut chain)
    }

    fn resolve_statements(
        &self,
        config: &LibraryMapConfig,
        base_folder: &Utf8Path,
        chain: &mut Vec<Utf8PathBuf>,
    ) -> Result<Resolution> {
        let mut resolution = Resolution::default();

        for statement in &config.statements {
            match statement {
                Statement::Comment(_) => {}
                Statement::Library(definition) => {
                    self.resolve_definition(definition, base_folder, &mut resolution);
                }
                Statement::Include(include) => {
                    let included = self.resolve_include(include, base_folder, chain)?;
                    resolution.libraries.extend(included.libraries);
                    resolution.issues.merge(included.issues);
                }
            }
        }

        Ok(resolution)
    }

    fn resolve_definition(
        &self,
        definition: &LibraryDefinition,
        base_folder: &Utf8Path,
        resolution: &mut Resolution,
    ) {
        let path = match resolve_path(&definition.lib_path, base_folder) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("Library {} has an unusable path: {}", definition.lib_name, e);
                resolution.issues.push_library(definition, None, e.to_string());
                return;
            }
        };

        resolution
            .libraries
            .push(ResolvedLibrary::new(definition.lib_name.clone(), path.clone()));

        if let Some(reason) = validate_path(&path, &self.options) {
            tracing::warn!("Library {} at {}: {}", definition.lib_name, path, reason);
            resolution.issues.push_library(definition, Some(path), reason);
        }
    }

    fn resolve_include(
        &self,
        include: &LibraryMapInclude,
        base_folder: &Utf8Path,
        chain: &mut Vec<Utf8PathBuf>,
    ) -> Result<Resolution> {
        let mut resolution = Resolution::default();

        let path = match resolve_path(&include.include_path, base_folder) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("Include has an unusable path: {}", e);
                resolution.issues.push_include(include, None, e.to_string());
                return Ok(resolution);
            }
        };

        if let Some(reason) = validate_path(&path, &self.options) {
            tracing::warn!("Skipping include {}: {}", path, reason);
            resolution.issues.push_include(include, Some(path), reason);
            return Ok(resolution);
        }

        if chain.contains(&path) {
            tracing::warn!("Skipping circular include {}", path);
            resolution.issues.circular_includes.push(CircularInclude {
                include: include.clone(),
                resolved_path: path,
                chain: chain.clone(),
            });
            return Ok(resolution);
        }

        tracing::debug!("Following include {}", path);
        let included = LibraryMapConfig::read_json(&path)?;
        let include_base = match path.parent() {
            Some(parent) => parent.to_path_buf(),
            None => {
                return Err(LibraryMapError::InvalidPath {
                    path: path.as_str().to_string(),
                    reason: "include has no parent directory",
                });
            }
        };

        chain.push(path);
        let result = self.resolve_statements(&included, &include_base, chain);
        chain.pop();
        result
    }
}

impl LibraryMapConfig {
    /// Resolve this map with default validation options.
    pub fn effective_library_definitions(&self, base_folder: &Utf8Path) -> Result<Resolution> {
        Resolver::default().resolve(self, base_folder)
    }
}
