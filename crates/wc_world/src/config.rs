use bevy::log::info;
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use wc_graveyard::ResolverSettings;
use wc_persistence::data_io::{REFERENCE_DATA_PATH, WORLD_DATA_PATH};

/// Default location of the registry configuration.
pub const CONFIG_PATH: &str = "config/worldcache.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Where world data lives and how graveyards are resolved.
#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub data_path: PathBuf,
    pub reference_path: PathBuf,
    pub graveyards: ResolverSettings,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(WORLD_DATA_PATH),
            reference_path: PathBuf::from(REFERENCE_DATA_PATH),
            graveyards: ResolverSettings::default(),
        }
    }
}

impl RegistryConfig {
    /// Read a config file. A missing file gives the defaults; a file that
    /// exists but does not parse is an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        Ok(ron::from_str(&contents)?)
    }
}
