//! On-disk row sets for world data and the RON-backed data source.

pub mod data_io;
pub mod rows;
pub mod source;

pub use data_io::{
    load_reference_data, load_world_data, save_reference_data, save_world_data, DataIoError,
};
pub use rows::{
    AreaTriggerSpawnRow, CreatureSpawnRow, GameObjectSpawnRow, GraveyardConditionRow,
    GraveyardZoneRow, InstanceSpawnGroupRow, SpawnGroupMemberRow, SpawnGroupTemplateRow,
    WorldDataFile, WorldSafeLocRow,
};
pub use source::{DataSource, RonDataSource};
