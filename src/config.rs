use std::path::{Path, PathBuf};
use std::fs;
use serde::{Deserialize, Serialize};
use crate::error::ConfigError;
use crate::options::ProbeOptions;

/// Saved probe definitions, one entry per host to check.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProbeConfig {
    #[serde(default)]
    pub probes: Vec<ProbeOptions>,
}

impl ProbeConfig {
    pub fn get_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join("PingProbe");

        fs::create_dir_all(&config_dir)?;
        Ok(config_dir.join("config.json"))
    }

    /// Loads the user's config, or the empty default if there is none or it
    /// cannot be read.
    pub fn load() -> Self {
        Self::get_config_path()
            .and_then(|path| {
                if path.exists() {
                    Self::load_from_path(&path)
                } else {
                    Ok(Self::default())
                }
            })
            .unwrap_or_else(|err| {
                log::warn!("Failed to load config, using defaults: {err}");
                Self::default()
            })
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to_path(&Self::get_config_path()?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
