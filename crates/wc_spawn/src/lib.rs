//! Spawn records, the cell index over them, spawn groups, and the
//! instance-encounter bindings that switch groups on and off.

pub mod data;
pub mod grid;
pub mod group;
pub mod instance;

pub use data::{
    AreaTriggerPayload, CreaturePayload, GameObjectPayload, MovementType, SpawnData, SpawnKey,
    SpawnMetadata, SpawnPayload,
};
pub use grid::{CellObjectGuids, GridIndex, GridKey};
pub use group::{
    SpawnGroupError, SpawnGroupFlags, SpawnGroupMap, SpawnGroupRegistry, SpawnGroupTemplateData,
    DEFAULT_SPAWN_GROUP, LEGACY_SPAWN_GROUP,
};
pub use instance::{
    EncounterState, EncounterStates, InstanceBindingError, InstanceBindings,
    InstanceSpawnGroupFlags, InstanceSpawnGroupInfo, SpawnGroupAction,
};
