use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised by the library map engine.
///
/// Missing or unreadable library and include targets are never reported
/// through this type; they end up in [`Issues`](crate::models::Issues).
/// What remains here are structural failures and malformed input.
#[derive(Error, Debug)]
pub enum LibraryMapError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse library map {path}: {source}")]
    Parse {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize library map: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("Path is not valid UTF-8: {0}")]
    NonUtf8Path(std::path::PathBuf),
}

impl LibraryMapError {
    pub(crate) fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = LibraryMapError> = std::result::Result<T, E>;
