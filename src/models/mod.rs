//! Data models for library maps.
//!
//! - [`Statement`]: one line of a map (comment, library definition or include)
//! - [`LibraryMapConfig`]: technology tag plus ordered statements, with JSON persistence
//! - [`ResolvedLibrary`] / [`Resolution`]: the flattened, absolute output of resolution
//! - [`Issues`]: non-fatal problems found while resolving, with text and HTML rendering
//! - [`EngineSettings`]: tunables loaded by [`SettingsManager`](crate::config::SettingsManager)
//!
//! # Architecture Note
//!
//! Maps are immutable value objects: an edit produces a new [`LibraryMapConfig`]
//! which replaces the old one wholesale when written back to disk. Resolution
//! and reconciliation never mutate them.

pub mod issues;
pub mod library_map;
pub mod resolution;
pub mod settings;
pub mod statement;

pub use issues::{CircularInclude, IncludeIssue, Issues, LibraryIssue};
pub use library_map::LibraryMapConfig;
pub use resolution::{Resolution, ResolvedLibrary};
pub use settings::EngineSettings;
pub use statement::{LibraryDefinition, LibraryMapComment, LibraryMapInclude, Statement};
