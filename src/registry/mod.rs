// Registry module
//
// The host application owns the live set of loaded libraries. This module
// describes that registry as a capability and turns a reconciliation result
// into the minimal sequence of calls against it.

use crate::models::ResolvedLibrary;
use crate::services::LibraryMapChanges;
use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use std::collections::HashSet;

/// The host's registry of loaded libraries, addressed by name.
pub trait LibraryRegistry {
    fn exists(&self, name: &str) -> bool;

    /// Load the library file at `path` and register it as `name`.
    fn load(&mut self, name: &str, path: &Utf8Path) -> Result<()>;

    /// Re-read a registered library, possibly from a new location.
    fn replace(&mut self, name: &str, path: &Utf8Path) -> Result<()>;

    fn unregister(&mut self, name: &str) -> Result<()>;
}

/// Counts of registry calls made while applying changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub loaded: usize,
    pub replaced: usize,
    pub unregistered: usize,
}

impl ApplyReport {
    pub fn total(&self) -> usize {
        self.loaded + self.replaced + self.unregistered
    }
}

/// Execute `changes` against `registry`.
///
/// Removals and the old names of renamed libraries are unregistered first,
/// so a name freed by one entry can be reused by another. Library names may
/// repeat within a map, so a name is only released when nothing in the new
/// map still uses it, and at most once:
///
/// - a name that is loaded again by a renamed, repathed or added entry is
///   left to that entry, which replaces the registration
/// - a name kept alive only by an unchanged duplicate is replaced with that
///   entry, since the registration may have come from the dropped one
///
/// # Errors
///
/// Stops at the first registry call that fails; the error names the library.
pub fn apply_changes<R>(changes: &LibraryMapChanges, registry: &mut R) -> Result<ApplyReport>
where
    R: LibraryRegistry + ?Sized,
{
    let mut report = ApplyReport::default();

    let reloaded: HashSet<&str> = changes
        .renamed
        .iter()
        .chain(&changes.repathed)
        .map(|(_, new)| new.name.as_str())
        .chain(changes.added.iter().map(|lib| lib.name.as_str()))
        .collect();

    let released = changes
        .removed
        .iter()
        .map(|lib| (lib, "removed"))
        .chain(changes.renamed.iter().map(|(old, _)| (old, "renamed")));

    let mut unregistered: HashSet<&str> = HashSet::new();
    let mut kept: IndexMap<&str, &ResolvedLibrary> = IndexMap::new();

    for (lib, kind) in released {
        let name = lib.name.as_str();
        if reloaded.contains(name) {
            continue;
        }
        if let Some(survivor) = changes.unchanged.iter().rev().find(|u| u.name == name) {
            kept.insert(name, survivor);
            continue;
        }
        if !unregistered.insert(name) {
            continue;
        }
        registry
            .unregister(name)
            .with_context(|| format!("Failed to unregister {} library {}", kind, lib))?;
        report.unregistered += 1;
    }

    for survivor in kept.values() {
        load_or_replace(registry, survivor, &mut report)?;
    }

    for (_, new) in &changes.renamed {
        load_or_replace(registry, new, &mut report)?;
    }

    for (_, new) in &changes.repathed {
        load_or_replace(registry, new, &mut report)?;
    }

    for lib in &changes.added {
        load_or_replace(registry, lib, &mut report)?;
    }

    tracing::info!(
        "Applied library map changes: {} loaded, {} replaced, {} unregistered",
        report.loaded,
        report.replaced,
        report.unregistered
    );
    Ok(report)
}

/// Load every library in `libraries`, replacing those already registered.
///
/// This is the full reload path used when a layout is opened or the user
/// asks for all libraries to be refreshed.
pub fn reload_libraries<R>(libraries: &[ResolvedLibrary], registry: &mut R) -> Result<ApplyReport>
where
    R: LibraryRegistry + ?Sized,
{
    let mut report = ApplyReport::default();
    for lib in libraries {
        tracing::debug!("Reload library {} from path {}", lib.name, lib.path);
        load_or_replace(registry, lib, &mut report)?;
    }
    Ok(report)
}

fn load_or_replace<R>(registry: &mut R, lib: &ResolvedLibrary, report: &mut ApplyReport) -> Result<()>
where
    R: LibraryRegistry + ?Sized,
{
    if registry.exists(&lib.name) {
        registry
            .replace(&lib.name, &lib.path)
            .with_context(|| format!("Failed to replace library {}", lib))?;
        report.replaced += 1;
    } else {
        registry
            .load(&lib.name, &lib.path)
            .with_context(|| format!("Failed to load library {}", lib))?;
        report.loaded += 1;
    }
    Ok(())
}

/// Events recorded by [`InMemoryRegistry`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryEvent {
    Loaded { name: String, path: Utf8PathBuf },
    Replaced { name: String, path: Utf8PathBuf },
    Unregistered { name: String },
}

/// A registry that only remembers names and paths.
///
/// Useful for hosts that load lazily, and for checking what a set of
/// changes would do before touching the real registry.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    libraries: IndexMap<String, Utf8PathBuf>,
    events: Vec<RegistryEvent>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with `libraries`, without recording events.
    pub fn with_libraries<'a>(libraries: impl IntoIterator<Item = &'a ResolvedLibrary>) -> Self {
        Self {
            libraries: libraries
                .into_iter()
                .map(|lib| (lib.name.clone(), lib.path.clone()))
                .collect(),
            events: Vec::new(),
        }
    }

    pub fn path_of(&self, name: &str) -> Option<&Utf8Path> {
        self.libraries.get(name).map(|p| p.as_path())
    }

    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }

    /// Registered libraries in registration order.
    pub fn snapshot(&self) -> Vec<ResolvedLibrary> {
        self.libraries
            .iter()
            .map(|(name, path)| ResolvedLibrary::new(name.clone(), path.clone()))
            .collect()
    }

    pub fn events(&self) -> &[RegistryEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<RegistryEvent> {
        std::mem::take(&mut self.events)
    }
}

impl LibraryRegistry for InMemoryRegistry {
    fn exists(&self, name: &str) -> bool {
        self.libraries.contains_key(name)
    }

    fn load(&mut self, name: &str, path: &Utf8Path) -> Result<()> {
        if self.libraries.contains_key(name) {
            bail!("library {} is already registered", name);
        }
        self.libraries.insert(name.to_string(), path.to_path_buf());
        self.events.push(RegistryEvent::Loaded {
            name: name.to_string(),
            path: path.to_path_buf(),
        });
        Ok(())
    }

    fn replace(&mut self, name: &str, path: &Utf8Path) -> Result<()> {
        let Some(slot) = self.libraries.get_mut(name) else {
            bail!("library {} is not registered", name);
        };
        *slot = path.to_path_buf();
        self.events.push(RegistryEvent::Replaced {
            name: name.to_string(),
            path: path.to_path_buf(),
        });
        Ok(())
    }

    fn unregister(&mut self, name: &str) -> Result<()> {
        if self.libraries.shift_remove(name).is_none() {
            bail!("library {} is not registered", name);
        }
        self.events.push(RegistryEvent::Unregistered {
            name: name.to_string(),
        });
        Ok(())
    }
}
