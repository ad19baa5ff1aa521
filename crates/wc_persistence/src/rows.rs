//! Row shapes as stored. Values are raw; range checks happen at load.

use serde::{Deserialize, Serialize};
use wc_core::{Position, SpawnKind};

fn identity_rotation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

fn ready_state() -> u8 {
    1
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreatureSpawnRow {
    pub guid: u64,
    pub entry: u32,
    pub map: u32,
    #[serde(default)]
    pub spawn_difficulties: Vec<u8>,
    #[serde(default)]
    pub phase_use_flags: u8,
    #[serde(default)]
    pub phase_id: u32,
    #[serde(default)]
    pub phase_group: u32,
    pub position: Position,
    #[serde(default)]
    pub spawn_time_secs: u32,
    #[serde(default)]
    pub wander_distance: f32,
    #[serde(default)]
    pub movement_type: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameObjectSpawnRow {
    pub guid: u64,
    pub entry: u32,
    pub map: u32,
    #[serde(default)]
    pub spawn_difficulties: Vec<u8>,
    #[serde(default)]
    pub phase_use_flags: u8,
    #[serde(default)]
    pub phase_id: u32,
    #[serde(default)]
    pub phase_group: u32,
    pub position: Position,
    #[serde(default = "identity_rotation")]
    pub rotation: [f32; 4],
    #[serde(default)]
    pub spawn_time_secs: i32,
    #[serde(default)]
    pub anim_progress: u8,
    #[serde(default = "ready_state")]
    pub state: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AreaTriggerSpawnRow {
    pub guid: u64,
    pub entry: u32,
    #[serde(default)]
    pub is_custom: bool,
    pub map: u32,
    #[serde(default)]
    pub spawn_difficulties: Vec<u8>,
    #[serde(default)]
    pub phase_use_flags: u8,
    #[serde(default)]
    pub phase_id: u32,
    #[serde(default)]
    pub phase_group: u32,
    pub position: Position,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnGroupTemplateRow {
    pub group_id: u32,
    pub name: String,
    #[serde(default)]
    pub flags: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnGroupMemberRow {
    pub group_id: u32,
    pub spawn_type: SpawnKind,
    pub spawn_id: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSpawnGroupRow {
    pub instance_map_id: u32,
    pub boss_state_id: u32,
    /// Bitmask of `1 << EncounterState`.
    pub boss_states: u8,
    pub spawn_group_id: u32,
    #[serde(default)]
    pub flags: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldSafeLocRow {
    pub id: u32,
    pub map_id: u32,
    pub position: Position,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraveyardZoneRow {
    pub safe_loc_id: u32,
    pub zone_id: u32,
}

/// A condition restricting one graveyard link, in raw `(kind, value1,
/// value2)` form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraveyardConditionRow {
    pub zone_id: u32,
    pub safe_loc_id: u32,
    pub kind: u32,
    #[serde(default)]
    pub value1: u32,
    #[serde(default)]
    pub value2: u32,
}

/// Every row set the world registry is built from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldDataFile {
    pub creatures: Vec<CreatureSpawnRow>,
    pub game_objects: Vec<GameObjectSpawnRow>,
    pub area_triggers: Vec<AreaTriggerSpawnRow>,
    pub spawn_group_templates: Vec<SpawnGroupTemplateRow>,
    pub spawn_group_members: Vec<SpawnGroupMemberRow>,
    pub instance_spawn_groups: Vec<InstanceSpawnGroupRow>,
    pub world_safe_locs: Vec<WorldSafeLocRow>,
    pub graveyard_zones: Vec<GraveyardZoneRow>,
    pub graveyard_conditions: Vec<GraveyardConditionRow>,
}

impl WorldDataFile {
    pub fn spawn_row_count(&self) -> usize {
        self.creatures.len() + self.game_objects.len() + self.area_triggers.len()
    }
}
