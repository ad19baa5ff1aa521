//! Binding of spawn groups to boss-encounter state inside instances.
//!
//! The bindings only react to encounter state; tracking that state is the
//! job of the instance script that owns the encounter.

use bevy::log::warn;
use bitflags::bitflags;
use std::collections::BTreeMap;
use thiserror::Error;
use wc_core::Team;

use crate::group::{SpawnGroupMap, SpawnGroupRegistry};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct InstanceSpawnGroupFlags: u8 {
        const ACTIVATE_SPAWN = 0x01;
        const BLOCK_SPAWN = 0x02;
        const ALLIANCE_ONLY = 0x04;
        const HORDE_ONLY = 0x08;
    }
}

bitflags! {
    /// Set of encounter states, one bit per [`EncounterState`].
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct EncounterStates: u8 {
        const NOT_STARTED = 1 << 0;
        const IN_PROGRESS = 1 << 1;
        const FAIL = 1 << 2;
        const DONE = 1 << 3;
        const SPECIAL = 1 << 4;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EncounterState {
    #[default]
    NotStarted = 0,
    InProgress = 1,
    Fail = 2,
    Done = 3,
    Special = 4,
}

impl EncounterState {
    pub fn bit(self) -> EncounterStates {
        EncounterStates::from_bits_truncate(1 << self as u8)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceSpawnGroupInfo {
    pub instance_map_id: u32,
    pub boss_state_id: u32,
    pub boss_states: EncounterStates,
    pub spawn_group_id: u32,
    pub flags: InstanceSpawnGroupFlags,
}

impl InstanceSpawnGroupInfo {
    /// Build from stored values, dropping bits that name no state or flag.
    pub fn from_raw(
        instance_map_id: u32,
        boss_state_id: u32,
        raw_boss_states: u8,
        spawn_group_id: u32,
        raw_flags: u8,
    ) -> Self {
        let boss_states = EncounterStates::from_bits_truncate(raw_boss_states);
        if boss_states.bits() != raw_boss_states {
            warn!(
                "instance spawn group (map {}, group {}) has invalid boss states 0x{:X}, truncating",
                instance_map_id, spawn_group_id, raw_boss_states
            );
        }
        let flags = InstanceSpawnGroupFlags::from_bits_truncate(raw_flags);
        if flags.bits() != raw_flags {
            warn!(
                "instance spawn group (map {}, group {}) has invalid flags 0x{:X}, truncating",
                instance_map_id, spawn_group_id, raw_flags
            );
        }
        Self {
            instance_map_id,
            boss_state_id,
            boss_states,
            spawn_group_id,
            flags,
        }
    }

    /// Whether the binding fires while the boss is in the given state(s).
    pub fn is_active(&self, current: EncounterStates) -> bool {
        self.boss_states.intersects(current)
    }

    /// Faction restriction check. A faction-only binding needs a matching
    /// instance team; unrestricted bindings admit any team, including none.
    pub fn admits_team(&self, team: Option<Team>) -> bool {
        let alliance_only = self.flags.contains(InstanceSpawnGroupFlags::ALLIANCE_ONLY);
        let horde_only = self.flags.contains(InstanceSpawnGroupFlags::HORDE_ONLY);
        match team {
            Some(Team::Alliance) => !horde_only,
            Some(Team::Horde) => !alliance_only,
            None => !alliance_only && !horde_only,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InstanceBindingError {
    #[error("instance spawn group references unknown spawn group {0}")]
    UnknownGroup(u32),
    #[error("instance spawn group references system spawn group {0}")]
    SystemGroup(u32),
    #[error("spawn group {group_id} is bound to map {group_map:?}, not instance map {instance_map}")]
    MapMismatch {
        group_id: u32,
        group_map: Option<u32>,
        instance_map: u32,
    },
}

/// Outcome for one spawn group after evaluating an instance's bindings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnGroupAction {
    Spawn,
    Despawn,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum PlanState {
    Block,
    Spawn,
    ForceBlock,
}

/// Bindings grouped by instance map, in load order.
#[derive(Clone, Debug, Default)]
pub struct InstanceBindings {
    by_map: BTreeMap<u32, Vec<InstanceSpawnGroupInfo>>,
}

impl InstanceBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store a binding. Both faction restrictions together are
    /// contradictory and are cleared.
    pub fn bind(
        &mut self,
        mut info: InstanceSpawnGroupInfo,
        groups: &SpawnGroupRegistry,
    ) -> Result<(), InstanceBindingError> {
        let template = groups
            .template(info.spawn_group_id)
            .ok_or(InstanceBindingError::UnknownGroup(info.spawn_group_id))?;
        if template.is_system() {
            return Err(InstanceBindingError::SystemGroup(info.spawn_group_id));
        }
        if template.map != SpawnGroupMap::Bound(info.instance_map_id) {
            return Err(InstanceBindingError::MapMismatch {
                group_id: info.spawn_group_id,
                group_map: template.map.map_id(),
                instance_map: info.instance_map_id,
            });
        }

        let faction_only = InstanceSpawnGroupFlags::ALLIANCE_ONLY | InstanceSpawnGroupFlags::HORDE_ONLY;
        if info.flags.contains(faction_only) {
            warn!(
                "instance spawn group (map {}, group {}) is both alliance-only and horde-only, clearing both",
                info.instance_map_id, info.spawn_group_id
            );
            info.flags.remove(faction_only);
        }

        self.by_map.entry(info.instance_map_id).or_default().push(info);
        Ok(())
    }

    pub fn for_map(&self, map_id: u32) -> &[InstanceSpawnGroupInfo] {
        self.by_map.get(&map_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.by_map.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_map.is_empty()
    }

    /// Decide which of a map's groups should be spawned given the current
    /// boss states. Every bound group gets an action: groups with no active
    /// activating binding are despawned, and a blocking binding wins over
    /// any activation.
    pub fn resolve_spawn_plan(
        &self,
        map_id: u32,
        boss_state: impl Fn(u32) -> EncounterState,
        team: Option<Team>,
    ) -> BTreeMap<u32, SpawnGroupAction> {
        let mut states: BTreeMap<u32, PlanState> = BTreeMap::new();
        for info in self.for_map(map_id) {
            let current = states.entry(info.spawn_group_id).or_insert(PlanState::Block);
            if *current == PlanState::ForceBlock {
                continue;
            }
            if !info.is_active(boss_state(info.boss_state_id).bit()) {
                continue;
            }
            if !info.admits_team(team) {
                continue;
            }
            if info.flags.contains(InstanceSpawnGroupFlags::BLOCK_SPAWN) {
                *current = PlanState::ForceBlock;
            } else if info.flags.contains(InstanceSpawnGroupFlags::ACTIVATE_SPAWN) {
                *current = PlanState::Spawn;
            }
        }

        states
            .into_iter()
            .map(|(group_id, state)| {
                let action = match state {
                    PlanState::Spawn => SpawnGroupAction::Spawn,
                    PlanState::Block | PlanState::ForceBlock => SpawnGroupAction::Despawn,
                };
                (group_id, action)
            })
            .collect()
    }
}
