use crate::models::EngineSettings;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Prefix of environment variables overriding [`EngineSettings`], e.g. `LIBMAP_PROBE_BYTES=0`.
pub const ENV_PREFIX: &str = "LIBMAP";

/// Loads and saves the engine settings file.
///
/// Settings come from `libmap.yaml` in the settings directory, overridden by
/// `LIBMAP_*` environment variables. A missing file means defaults.
#[derive(Debug, Clone)]
pub struct SettingsManager {
    settings_dir: Utf8PathBuf,
    settings_path: Utf8PathBuf,
}

impl SettingsManager {
    /// Create a new SettingsManager, creating `settings_dir` if needed.
    pub fn new<P: AsRef<Utf8Path>>(settings_dir: P) -> Result<Self> {
        let settings_dir = settings_dir.as_ref().to_path_buf();

        if !settings_dir.exists() {
            fs::create_dir_all(&settings_dir).with_context(|| {
                format!("Failed to create settings directory: {}", settings_dir)
            })?;
        }

        Ok(Self {
            settings_path: settings_dir.join("libmap.yaml"),
            settings_dir,
        })
    }

    /// Load settings from the file and the environment.
    pub fn load_settings(&self) -> Result<EngineSettings> {
        self.load_settings_with_env(
            config::Environment::with_prefix(ENV_PREFIX).try_parsing(true),
        )
    }

    /// Like [`load_settings`](Self::load_settings) with an explicit environment source.
    pub fn load_settings_with_env(&self, env: config::Environment) -> Result<EngineSettings> {
        if !self.settings_path.exists() {
            tracing::debug!(
                "Settings file not found at {}, using defaults",
                self.settings_path
            );
        }

        let settings: EngineSettings = config::Config::builder()
            .add_source(
                config::File::from(self.settings_path.as_std_path())
                    .format(config::FileFormat::Yaml)
                    .required(false),
            )
            .add_source(env)
            .build()
            .with_context(|| format!("Failed to read settings: {}", self.settings_path))?
            .try_deserialize()
            .with_context(|| format!("Failed to parse settings: {}", self.settings_path))?;

        tracing::info!(
            "Loaded settings: probe_bytes={}, suffix={}, debug={}",
            settings.probe_bytes,
            settings.library_map_suffix,
            settings.debug_mode
        );
        Ok(settings)
    }

    pub fn save_settings(&self, settings: &EngineSettings) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(settings).context("Failed to serialize settings to YAML")?;

        fs::write(&self.settings_path, yaml_string)
            .with_context(|| format!("Failed to write settings: {}", self.settings_path))?;

        tracing::info!("Saved settings to {}", self.settings_path);
        Ok(())
    }

    pub fn settings_dir(&self) -> &Utf8Path {
        &self.settings_dir
    }

    pub fn settings_path(&self) -> &Utf8Path {
        &self.settings_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn create_test_settings_manager() -> (SettingsManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let manager = SettingsManager::new(&dir).unwrap();
        (manager, temp_dir)
    }

    fn empty_env() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX).source(Some(HashMap::new()))
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let (manager, _temp_dir) = create_test_settings_manager();
        let settings = manager.load_settings_with_env(empty_env()).unwrap();
        assert_eq!(settings, EngineSettings::default());
    }

    #[test]
    fn test_save_and_load() {
        let (manager, _temp_dir) = create_test_settings_manager();

        let settings = EngineSettings {
            probe_bytes: 0,
            library_map_suffix: ".libmap".to_string(),
            ..Default::default()
        };
        manager.save_settings(&settings).unwrap();

        let loaded = manager.load_settings_with_env(empty_env()).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_environment_overrides_file() {
        let (manager, _temp_dir) = create_test_settings_manager();
        manager.save_settings(&EngineSettings::default()).unwrap();

        let env = config::Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .source(Some(HashMap::from([
                ("LIBMAP_PROBE_BYTES".to_string(), "16".to_string()),
                ("LIBMAP_DEBUG_MODE".to_string(), "true".to_string()),
            ])));

        let loaded = manager.load_settings_with_env(env).unwrap();
        assert_eq!(loaded.probe_bytes, 16);
        assert!(loaded.debug_mode);
        assert_eq!(loaded.library_map_suffix, ".klib");
    }
}
