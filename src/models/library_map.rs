use crate::error::{LibraryMapError, Result};
use crate::models::statement::{LibraryDefinition, LibraryMapInclude, Statement};
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use std::fs;

/// A cell library map: a technology tag plus an ordered list of statements.
///
/// Maps are value objects. Editing one means building a new map and
/// writing it out in place of the old file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryMapConfig {
    #[serde(default)]
    pub technology: String,

    #[serde(default)]
    pub statements: Vec<Statement>,
}

impl LibraryMapConfig {
    pub fn new(technology: impl Into<String>, statements: Vec<Statement>) -> Self {
        Self {
            technology: technology.into(),
            statements,
        }
    }

    /// Parse a map from its JSON text.
    ///
    /// `origin` is only used to label parse errors.
    pub fn from_json_str(json: &str, origin: &Utf8Path) -> Result<Self> {
        serde_json::from_str(json).map_err(|source| LibraryMapError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Serialize with four-space indentation, matching files written by earlier tool versions.
    pub fn to_json_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)
            .map_err(LibraryMapError::Serialize)?;
        // serde_json only ever emits UTF-8
        String::from_utf8(buf)
            .map_err(|e| LibraryMapError::Serialize(serde::ser::Error::custom(e)))
    }

    pub fn read_json(path: &Utf8Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| LibraryMapError::io(path, e))?;
        let config = Self::from_json_str(&contents, path)?;
        tracing::debug!(
            "Read library map {} ({} statements)",
            path,
            config.statements.len()
        );
        Ok(config)
    }

    pub fn write_json(&self, path: &Utf8Path) -> Result<()> {
        let json = self.to_json_string()?;
        fs::write(path, json).map_err(|e| LibraryMapError::io(path, e))?;
        tracing::info!("Saved library map to {}", path);
        Ok(())
    }

    /// Library definitions declared directly in this map, in order.
    pub fn library_definitions(&self) -> impl Iterator<Item = &LibraryDefinition> {
        self.statements.iter().filter_map(|s| match s {
            Statement::Library(def) => Some(def),
            Statement::Comment(_) | Statement::Include(_) => None,
        })
    }

    /// Includes declared directly in this map, in order.
    pub fn includes(&self) -> impl Iterator<Item = &LibraryMapInclude> {
        self.statements.iter().filter_map(|s| match s {
            Statement::Include(inc) => Some(inc),
            Statement::Comment(_) | Statement::Library(_) => None,
        })
    }
}
