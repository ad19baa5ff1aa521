//! Where world rows come from, and where runtime graveyard edits go.

use bevy::log::info;
use std::path::{Path, PathBuf};
use wc_core::Condition;
use wc_graveyard::GraveyardSink;

use crate::data_io::{load_world_data, save_world_data, DataIoError};
use crate::rows::{GraveyardConditionRow, GraveyardZoneRow, WorldDataFile};

/// Producer of the row sets a registry is built from.
pub trait DataSource {
    fn load(&self) -> Result<WorldDataFile, DataIoError>;
}

/// Rows already in memory.
impl DataSource for WorldDataFile {
    fn load(&self) -> Result<WorldDataFile, DataIoError> {
        Ok(self.clone())
    }
}

/// A world data file on disk. Graveyard edits are written back to it.
#[derive(Clone, Debug)]
pub struct RonDataSource {
    path: PathBuf,
}

impl RonDataSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn edit(&self, apply: impl FnOnce(&mut WorldDataFile)) -> Result<(), DataIoError> {
        let mut data = if self.path.exists() {
            load_world_data(&self.path)?
        } else {
            WorldDataFile::default()
        };
        apply(&mut data);
        save_world_data(&self.path, &data)
    }
}

impl DataSource for RonDataSource {
    fn load(&self) -> Result<WorldDataFile, DataIoError> {
        let data = load_world_data(&self.path)?;
        info!(
            "read {} spawn rows and {} graveyard links from {}",
            data.spawn_row_count(),
            data.graveyard_zones.len(),
            self.path.display()
        );
        Ok(data)
    }
}

impl GraveyardSink for RonDataSource {
    fn insert_link(
        &mut self,
        safe_loc_id: u32,
        zone_id: u32,
        conditions: &[Condition],
    ) -> Result<(), String> {
        self.edit(|data| {
            data.graveyard_zones.push(GraveyardZoneRow {
                safe_loc_id,
                zone_id,
            });
            data.graveyard_conditions
                .extend(conditions.iter().map(|condition| {
                    let (kind, value1, value2) = condition.to_row();
                    GraveyardConditionRow {
                        zone_id,
                        safe_loc_id,
                        kind,
                        value1,
                        value2,
                    }
                }));
        })
        .map_err(|err| err.to_string())
    }

    fn delete_link(&mut self, safe_loc_id: u32, zone_id: u32) -> Result<(), String> {
        self.edit(|data| {
            data.graveyard_zones
                .retain(|row| !(row.safe_loc_id == safe_loc_id && row.zone_id == zone_id));
            data.graveyard_conditions
                .retain(|row| !(row.safe_loc_id == safe_loc_id && row.zone_id == zone_id));
        })
        .map_err(|err| err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use wc_core::Team;

    #[test]
    fn in_memory_rows_are_a_source() {
        let mut rows = WorldDataFile::default();
        rows.graveyard_zones.push(GraveyardZoneRow {
            safe_loc_id: 1,
            zone_id: 2,
        });
        assert_eq!(rows.load().unwrap(), rows);
    }

    #[test]
    fn sink_writes_link_and_team_condition() {
        let dir = tempdir().unwrap();
        let mut source = RonDataSource::new(dir.path().join("world_data.ron"));

        source
            .insert_link(5, 42, &[Condition::Team(Team::Horde)])
            .unwrap();
        source.insert_link(6, 42, &[]).unwrap();

        let data = source.load().unwrap();
        assert_eq!(data.graveyard_zones.len(), 2);
        assert_eq!(
            data.graveyard_conditions,
            vec![GraveyardConditionRow {
                zone_id: 42,
                safe_loc_id: 5,
                kind: wc_core::condition::CONDITION_TYPE_TEAM,
                value1: Team::Horde.id(),
                value2: 0,
            }]
        );
    }

    #[test]
    fn sink_delete_drops_link_rows() {
        let dir = tempdir().unwrap();
        let mut source = RonDataSource::new(dir.path().join("world_data.ron"));
        source
            .insert_link(5, 42, &[Condition::Team(Team::Alliance)])
            .unwrap();
        source.insert_link(5, 43, &[]).unwrap();

        source.delete_link(5, 42).unwrap();

        let data = source.load().unwrap();
        assert_eq!(
            data.graveyard_zones,
            vec![GraveyardZoneRow {
                safe_loc_id: 5,
                zone_id: 43
            }]
        );
        assert!(data.graveyard_conditions.is_empty());
    }
}
