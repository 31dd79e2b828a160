use crate::models::issues::Issues;
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;

/// A library definition after resolution: the path is absolute and normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResolvedLibrary {
    pub name: String,
    pub path: Utf8PathBuf,
}

impl ResolvedLibrary {
    pub fn new(name: impl Into<String>, path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl fmt::Display for ResolvedLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.path)
    }
}

/// Output of resolving a library map: the flattened definitions plus whatever went wrong.
///
/// Definitions that failed validation are still listed in `libraries`;
/// the caller decides whether to load them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub libraries: Vec<ResolvedLibrary>,
    pub issues: Issues,
}

impl Resolution {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Libraries whose resolved path was not reported as broken.
    pub fn loadable(&self) -> impl Iterator<Item = &ResolvedLibrary> {
        self.libraries.iter().filter(|lib| {
            !self.issues.failed_libraries.iter().any(|issue| {
                issue.definition.lib_name == lib.name
                    && issue.resolved_path.as_deref() == Some(lib.path.as_path())
            })
        })
    }
}
