//! Services module - the library map engine.
//!
//! Everything here is synchronous and free of global state: resolution and
//! reconciliation are pure functions of their inputs plus the filesystem.
//! Calls against different maps may run concurrently; a map being rewritten
//! while it is resolved is not guarded against.
//!
//! # Components
//!
//! - [`paths`]: `~`/environment expansion and normalization of map paths
//! - [`Resolver`]: flattens includes into an ordered list of [`ResolvedLibrary`](crate::models::ResolvedLibrary),
//!   collecting [`Issues`](crate::models::Issues) and guarding against include cycles
//! - [`LibraryMapChanges`]: classifies the difference between two resolved maps
//!   as added, removed, renamed or repathed
//! - [`sidecar`]: locating and creating the map that belongs to a layout
//!
//! # Usage Example
//!
//! ```ignore
//! use libmap::services::{LibraryMapChanges, Resolver};
//!
//! let resolution = Resolver::default().resolve_file(map_path)?;
//! if !resolution.is_clean() {
//!     eprintln!("{}", resolution.issues);
//! }
//!
//! let reconciliation = LibraryMapChanges::compare(base_folder, &old_map, &new_map)?;
//! libmap::registry::apply_changes(&reconciliation.changes, &mut host_registry)?;
//! ```

pub mod changes;
pub mod paths;
pub mod resolution;
pub mod sidecar;

pub use changes::{LibraryMapChanges, Reconciliation};
pub use paths::{expand_path, resolve_path};
pub use resolution::{Resolver, ValidationOptions, validate_path};
pub use sidecar::{LibraryMapCreationMode, create_library_map, library_map_path_for};
