//! Spawn records shared by every spawnable entity kind.

use std::collections::BTreeSet;
use wc_core::{CellCoord, Difficulty, PhaseUseFlags, Position, SpawnKind};

use crate::group::DEFAULT_SPAWN_GROUP;

/// Identity of a spawn: ids are only unique within one kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpawnKey {
    pub kind: SpawnKind,
    pub id: u64,
}

impl SpawnKey {
    pub const fn new(kind: SpawnKind, id: u64) -> Self {
        Self { kind, id }
    }

    pub const fn creature(id: u64) -> Self {
        Self::new(SpawnKind::Creature, id)
    }

    pub const fn game_object(id: u64) -> Self {
        Self::new(SpawnKind::GameObject, id)
    }
}

/// Fields common to all spawn kinds.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnMetadata {
    pub spawn_id: u64,
    pub kind: SpawnKind,
    pub map_id: u32,
    pub phase_id: u32,
    pub phase_group: u32,
    pub phase_use_flags: PhaseUseFlags,
    /// Owning spawn group. Every spawn belongs to exactly one.
    pub spawn_group_id: u32,
}

impl SpawnMetadata {
    pub fn new(kind: SpawnKind, spawn_id: u64, map_id: u32) -> Self {
        Self {
            spawn_id,
            kind,
            map_id,
            phase_id: 0,
            phase_group: 0,
            phase_use_flags: PhaseUseFlags::empty(),
            spawn_group_id: DEFAULT_SPAWN_GROUP,
        }
    }

    pub fn key(&self) -> SpawnKey {
        SpawnKey::new(self.kind, self.spawn_id)
    }
}

/// Movement generator a creature starts with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MovementType {
    #[default]
    Idle,
    Random,
    Waypoint,
}

impl MovementType {
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Idle),
            1 => Some(Self::Random),
            2 => Some(Self::Waypoint),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CreaturePayload {
    pub entry: u32,
    pub spawn_time_secs: u32,
    pub wander_distance: f32,
    pub movement_type: MovementType,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GameObjectPayload {
    pub entry: u32,
    /// Rotation quaternion (x, y, z, w).
    pub rotation: [f32; 4],
    /// Negative values spawn the object despawned.
    pub spawn_time_secs: i32,
    pub anim_progress: u8,
    pub go_state: u8,
}

impl Default for GameObjectPayload {
    fn default() -> Self {
        Self {
            entry: 0,
            rotation: [0.0, 0.0, 0.0, 1.0],
            spawn_time_secs: 0,
            anim_progress: 0,
            go_state: 1,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AreaTriggerPayload {
    pub entry: u32,
    pub is_custom: bool,
}

/// Kind-specific part of a spawn.
#[derive(Clone, Debug, PartialEq)]
pub enum SpawnPayload {
    Creature(CreaturePayload),
    GameObject(GameObjectPayload),
    AreaTrigger(AreaTriggerPayload),
}

impl SpawnPayload {
    pub fn kind(&self) -> SpawnKind {
        match self {
            Self::Creature(_) => SpawnKind::Creature,
            Self::GameObject(_) => SpawnKind::GameObject,
            Self::AreaTrigger(_) => SpawnKind::AreaTrigger,
        }
    }
}

/// A complete spawn record.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnData {
    pub meta: SpawnMetadata,
    pub position: Position,
    /// Never empty for a spawn that made it into a registry.
    pub spawn_difficulties: BTreeSet<Difficulty>,
    pub payload: SpawnPayload,
}

impl SpawnData {
    /// Build a spawn; the kind is taken from the payload.
    pub fn new(
        spawn_id: u64,
        map_id: u32,
        position: Position,
        difficulties: impl IntoIterator<Item = Difficulty>,
        payload: SpawnPayload,
    ) -> Self {
        Self {
            meta: SpawnMetadata::new(payload.kind(), spawn_id, map_id),
            position,
            spawn_difficulties: difficulties.into_iter().collect(),
            payload,
        }
    }

    pub fn creature(
        spawn_id: u64,
        map_id: u32,
        position: Position,
        difficulties: impl IntoIterator<Item = Difficulty>,
    ) -> Self {
        Self::new(
            spawn_id,
            map_id,
            position,
            difficulties,
            SpawnPayload::Creature(CreaturePayload::default()),
        )
    }

    pub fn game_object(
        spawn_id: u64,
        map_id: u32,
        position: Position,
        difficulties: impl IntoIterator<Item = Difficulty>,
    ) -> Self {
        Self::new(
            spawn_id,
            map_id,
            position,
            difficulties,
            SpawnPayload::GameObject(GameObjectPayload::default()),
        )
    }

    pub fn with_phase(mut self, phase_id: u32) -> Self {
        self.meta.phase_id = phase_id;
        self
    }

    pub fn with_group(mut self, group_id: u32) -> Self {
        self.meta.spawn_group_id = group_id;
        self
    }

    pub fn key(&self) -> SpawnKey {
        self.meta.key()
    }

    pub fn kind(&self) -> SpawnKind {
        self.meta.kind
    }

    pub fn cell(&self) -> CellCoord {
        CellCoord::from_position(&self.position)
    }

    pub fn creature_payload(&self) -> Option<&CreaturePayload> {
        match &self.payload {
            SpawnPayload::Creature(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn game_object_payload(&self) -> Option<&GameObjectPayload> {
        match &self.payload {
            SpawnPayload::GameObject(payload) => Some(payload),
            _ => None,
        }
    }
}
