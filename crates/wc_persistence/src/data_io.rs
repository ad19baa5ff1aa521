use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use wc_core::StaticReferenceData;

use crate::rows::WorldDataFile;

/// Default location of the world data file.
pub const WORLD_DATA_PATH: &str = "assets/world/world_data.ron";
/// Default location of the reference tables.
pub const REFERENCE_DATA_PATH: &str = "assets/world/reference.ron";

/// Error type for world data I/O.
#[derive(Debug, Error)]
pub enum DataIoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON serialization error: {0}")]
    Ron(#[from] ron::Error),
    #[error("RON parse error: {0}")]
    RonSpanned(#[from] ron::error::SpannedError),
}

fn save_ron<T: Serialize>(path: &Path, value: &T) -> Result<(), DataIoError> {
    let pretty_config = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .separate_tuple_members(true);

    let ron_string = ron::ser::to_string_pretty(value, pretty_config)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, ron_string)?;
    Ok(())
}

fn load_ron<T: DeserializeOwned>(path: &Path) -> Result<T, DataIoError> {
    let contents = fs::read_to_string(path)?;
    Ok(ron::from_str(&contents)?)
}

/// Save all world row sets to a RON file.
pub fn save_world_data(path: &Path, data: &WorldDataFile) -> Result<(), DataIoError> {
    save_ron(path, data)
}

/// Load world row sets from a RON file.
pub fn load_world_data(path: &Path) -> Result<WorldDataFile, DataIoError> {
    load_ron(path)
}

pub fn save_reference_data(path: &Path, data: &StaticReferenceData) -> Result<(), DataIoError> {
    save_ron(path, data)
}

/// Load the static map, area and phase tables.
pub fn load_reference_data(path: &Path) -> Result<StaticReferenceData, DataIoError> {
    load_ron(path)
}
