// libmap - Cell library map resolution and change reconciliation
//
// This is the library crate containing the library map model, include
// resolution, change reconciliation and the registry capability the host
// application implements. There is no UI here; dialogs and menus live in the host.

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod registry;
pub mod services;

// Re-export commonly used types for convenience
pub use config::SettingsManager;
pub use error::{LibraryMapError, Result};
pub use models::{
    EngineSettings, Issues, LibraryDefinition, LibraryMapComment, LibraryMapConfig,
    LibraryMapInclude, Resolution, ResolvedLibrary, Statement,
};
pub use registry::{InMemoryRegistry, LibraryRegistry, apply_changes, reload_libraries};
pub use services::{LibraryMapChanges, Reconciliation, Resolver, ValidationOptions};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
