//! Library maps stored next to their layout.
//!
//! A hierarchical layout `top.oas` keeps its library map in `top.klib`
//! (the suffix is configurable). New maps are created empty, linked to a
//! shared template through an include, or copied from a template.

use crate::error::{LibraryMapError, Result};
use crate::models::{LibraryMapComment, LibraryMapConfig, LibraryMapInclude};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// How a new library map is seeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryMapCreationMode {
    /// A map holding only the generator comment.
    CreateEmpty,
    /// Like `CreateEmpty`, plus an include of the template.
    LinkTemplate(Utf8PathBuf),
    /// A byte-for-byte copy of the template.
    CopyTemplate(Utf8PathBuf),
}

/// Path of the library map belonging to `layout_path`.
///
/// `suffix` may be given with or without the leading dot.
pub fn library_map_path_for(layout_path: &Utf8Path, suffix: &str) -> Utf8PathBuf {
    layout_path.with_extension(suffix.trim_start_matches('.'))
}

/// Create the library map at `map_path` and return what was written.
///
/// # Errors
///
/// Templates must exist and parse as library maps; nothing is written otherwise.
pub fn create_library_map(
    map_path: &Utf8Path,
    technology: &str,
    mode: &LibraryMapCreationMode,
) -> Result<LibraryMapConfig> {
    let generator = format!(
        "Automatically generated by {} {}",
        crate::APP_NAME,
        crate::VERSION
    );
    let mut config =
        LibraryMapConfig::new(technology, vec![LibraryMapComment::new(generator).into()]);

    match mode {
        LibraryMapCreationMode::CreateEmpty => {
            config.write_json(map_path)?;
        }
        LibraryMapCreationMode::LinkTemplate(template) => {
            LibraryMapConfig::read_json(template)?;
            config
                .statements
                .push(LibraryMapInclude::new(template.clone()).into());
            config.write_json(map_path)?;
        }
        LibraryMapCreationMode::CopyTemplate(template) => {
            config = LibraryMapConfig::read_json(template)?;
            fs::copy(template, map_path).map_err(|e| LibraryMapError::io(map_path, e))?;
        }
    }

    tracing::info!("Created library map {} ({:?})", map_path, mode);
    Ok(config)
}
