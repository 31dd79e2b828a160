//! Change reconciliation between two versions of a library map.
//!
//! Comparing the resolved definitions before and after an edit tells the host
//! which libraries to load, unregister, rename or reload from a new location,
//! instead of reloading everything.
//!
//! # Matching rules
//!
//! Old and new definitions are paired in three passes, each only looking at
//! entries the previous passes left unpaired:
//!
//! 1. same name and same path: unchanged, not reported
//! 2. same path: **renamed**
//! 3. same name: **repathed**
//!
//! Old entries still unpaired are **removed**, new ones **added**. A library
//! that changed both name and path therefore shows up as removed + added.

use crate::error::Result;
use crate::models::{Issues, LibraryMapConfig, Resolution, ResolvedLibrary};
use crate::services::resolution::Resolver;
use camino::Utf8Path;
use std::collections::HashMap;

/// Classified differences between two resolved library lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryMapChanges {
    pub added: Vec<ResolvedLibrary>,
    pub removed: Vec<ResolvedLibrary>,
    /// `(old, new)`: same path, different name.
    pub renamed: Vec<(ResolvedLibrary, ResolvedLibrary)>,
    /// `(old, new)`: same name, different path.
    pub repathed: Vec<(ResolvedLibrary, ResolvedLibrary)>,
    /// New entries identical to an old one. Not a change; kept so that
    /// applying changes knows which duplicate names are still in use.
    pub unchanged: Vec<ResolvedLibrary>,
}

/// Result of [`LibraryMapChanges::compare`]: the changes plus the issues found in the new map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub changes: LibraryMapChanges,
    pub issues: Issues,
}

impl LibraryMapChanges {
    /// Resolve both maps against `base_folder` and compare them.
    ///
    /// Both maps are assumed to belong to the same layout, hence the shared base folder.
    /// Issues of the old map are dropped; those of the new map are forwarded.
    pub fn compare(
        base_folder: &Utf8Path,
        old_config: &LibraryMapConfig,
        new_config: &LibraryMapConfig,
    ) -> Result<Reconciliation> {
        Self::compare_with(&Resolver::default(), base_folder, old_config, new_config)
    }

    pub fn compare_with(
        resolver: &Resolver,
        base_folder: &Utf8Path,
        old_config: &LibraryMapConfig,
        new_config: &LibraryMapConfig,
    ) -> Result<Reconciliation> {
        let old = resolver.resolve(old_config, base_folder)?;
        let new = resolver.resolve(new_config, base_folder)?;
        Ok(Self::reconcile(old, new))
    }

    /// Compare two versions of the map stored at `map_path`.
    ///
    /// Like [`LibraryMapChanges::compare_with`], but both maps are resolved with
    /// [`Resolver::resolve_as`], so a map that includes its own file is not
    /// expanded a second time.
    pub fn compare_at(
        resolver: &Resolver,
        map_path: &Utf8Path,
        old_config: &LibraryMapConfig,
        new_config: &LibraryMapConfig,
    ) -> Result<Reconciliation> {
        let old = resolver.resolve_as(old_config, map_path)?;
        let new = resolver.resolve_as(new_config, map_path)?;
        Ok(Self::reconcile(old, new))
    }

    fn reconcile(old: Resolution, new: Resolution) -> Reconciliation {
        let changes = Self::between(&old.libraries, &new.libraries);
        tracing::info!("Library map changes: {}", changes.summary());

        Reconciliation {
            changes,
            issues: new.issues,
        }
    }

    /// Compare two already resolved lists. Pure, no I/O.
    pub fn between(old: &[ResolvedLibrary], new: &[ResolvedLibrary]) -> Self {
        let mut new_by_path: HashMap<&Utf8Path, Vec<usize>> = HashMap::new();
        let mut new_by_name: HashMap<&str, Vec<usize>> = HashMap::new();
        for (idx, lib) in new.iter().enumerate() {
            new_by_path.entry(lib.path.as_path()).or_default().push(idx);
            new_by_name.entry(lib.name.as_str()).or_default().push(idx);
        }

        let mut new_taken = vec![false; new.len()];
        let mut old_matched = vec![false; old.len()];
        let mut changes = Self::default();

        // unchanged
        for (old_idx, old_lib) in old.iter().enumerate() {
            let candidates = new_by_path.get(old_lib.path.as_path());
            let exact = take_first(candidates, &mut new_taken, |idx| new[idx].name == old_lib.name);
            if let Some(new_idx) = exact {
                old_matched[old_idx] = true;
                changes.unchanged.push(new[new_idx].clone());
            }
        }

        for (old_idx, old_lib) in old.iter().enumerate() {
            if old_matched[old_idx] {
                continue;
            }
            let candidates = new_by_path.get(old_lib.path.as_path());
            if let Some(new_idx) = take_first(candidates, &mut new_taken, |_| true) {
                old_matched[old_idx] = true;
                changes.renamed.push((old_lib.clone(), new[new_idx].clone()));
            }
        }

        for (old_idx, old_lib) in old.iter().enumerate() {
            if old_matched[old_idx] {
                continue;
            }
            let candidates = new_by_name.get(old_lib.name.as_str());
            match take_first(candidates, &mut new_taken, |_| true) {
                Some(new_idx) => changes.repathed.push((old_lib.clone(), new[new_idx].clone())),
                None => changes.removed.push(old_lib.clone()),
            }
        }

        changes.added = new
            .iter()
            .zip(&new_taken)
            .filter(|(_, taken)| !**taken)
            .map(|(lib, _)| lib.clone())
            .collect();

        changes
    }

    /// True when nothing needs to be loaded, replaced or unregistered.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.renamed.is_empty()
            && self.repathed.is_empty()
    }

    /// One-line description such as `1 added, 0 removed, 2 renamed, 0 repathed`.
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return "no changes".to_string();
        }
        format!(
            "{} added, {} removed, {} renamed, {} repathed",
            self.added.len(),
            self.removed.len(),
            self.renamed.len(),
            self.repathed.len()
        )
    }
}

/// Claim the first unclaimed candidate accepted by `accept`.
fn take_first(
    candidates: Option<&Vec<usize>>,
    taken: &mut [bool],
    accept: impl Fn(usize) -> bool,
) -> Option<usize> {
    let idx = candidates?
        .iter()
        .copied()
        .find(|&idx| !taken[idx] && accept(idx))?;
    taken[idx] = true;
    Some(idx)
}
