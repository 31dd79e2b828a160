use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// Free-form comment line kept for readability of the map file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LibraryMapComment {
    pub comment: String,
}

/// A named pointer to an on-disk cell library.
///
/// `lib_path` is stored exactly as written; it only becomes absolute
/// once the map is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LibraryDefinition {
    pub lib_name: String,
    pub lib_path: Utf8PathBuf,
}

/// Reference to another library map whose statements are spliced in at this position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LibraryMapInclude {
    pub include_path: Utf8PathBuf,
}

impl LibraryMapComment {
    pub fn new(comment: impl Into<String>) -> Self {
        Self {
            comment: comment.into(),
        }
    }
}

impl LibraryDefinition {
    pub fn new(lib_name: impl Into<String>, lib_path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            lib_name: lib_name.into(),
            lib_path: lib_path.into(),
        }
    }
}

impl LibraryMapInclude {
    pub fn new(include_path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            include_path: include_path.into(),
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.include_path
    }
}

/// One statement of a library map.
///
/// Serialized with a `kind` tag. Reading also accepts the older untagged
/// records, distinguished by their field names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", from = "StatementRecord")]
pub enum Statement {
    Comment(LibraryMapComment),
    Library(LibraryDefinition),
    Include(LibraryMapInclude),
}

impl From<LibraryMapComment> for Statement {
    fn from(value: LibraryMapComment) -> Self {
        Statement::Comment(value)
    }
}

impl From<LibraryDefinition> for Statement {
    fn from(value: LibraryDefinition) -> Self {
        Statement::Library(value)
    }
}

impl From<LibraryMapInclude> for Statement {
    fn from(value: LibraryMapInclude) -> Self {
        Statement::Include(value)
    }
}

// Deserialization goes through this shadow type so that both the tagged
// records and the legacy untagged ones are accepted.
#[derive(Deserialize)]
#[serde(untagged)]
enum StatementRecord {
    Tagged(TaggedStatement),
    LegacyComment(LegacyComment),
    LegacyLibrary(LegacyLibrary),
    LegacyInclude(LegacyInclude),
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum TaggedStatement {
    Comment(LibraryMapComment),
    Library(LibraryDefinition),
    Include(LibraryMapInclude),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct LegacyComment {
    comment: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct LegacyLibrary {
    lib_name: String,
    lib_path: Utf8PathBuf,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct LegacyInclude {
    include_path: Utf8PathBuf,
}

impl From<StatementRecord> for Statement {
    fn from(record: StatementRecord) -> Self {
        match record {
            StatementRecord::Tagged(TaggedStatement::Comment(c)) => Statement::Comment(c),
            StatementRecord::Tagged(TaggedStatement::Library(d)) => Statement::Library(d),
            StatementRecord::Tagged(TaggedStatement::Include(i)) => Statement::Include(i),
            StatementRecord::LegacyComment(LegacyComment { comment }) => {
                Statement::Comment(LibraryMapComment { comment })
            }
            StatementRecord::LegacyLibrary(LegacyLibrary { lib_name, lib_path }) => {
                Statement::Library(LibraryDefinition { lib_name, lib_path })
            }
            StatementRecord::LegacyInclude(LegacyInclude { include_path }) => {
                Statement::Include(LibraryMapInclude { include_path })
            }
        }
    }
}
