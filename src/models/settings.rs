use crate::services::resolution::ValidationOptions;
use serde::{Deserialize, Serialize};

/// Engine settings, read from `libmap.yaml` and `LIBMAP_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Leading bytes read from each library and include to prove it is readable. 0 disables the probe.
    pub probe_bytes: usize,

    /// Extension of the library map stored next to a layout.
    pub library_map_suffix: String,

    pub debug_mode: bool,

    pub log_dir: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            probe_bytes: ValidationOptions::DEFAULT_PROBE_BYTES,
            library_map_suffix: ".klib".to_string(),
            debug_mode: false,
            log_dir: "logs".to_string(),
        }
    }
}

impl EngineSettings {
    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions {
            probe_bytes: self.probe_bytes,
        }
    }
}
