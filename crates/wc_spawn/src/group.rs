//! Named groups of spawns that are enabled and disabled as a unit.

use bevy::log::{error, warn};
use bitflags::bitflags;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::data::{SpawnKey, SpawnMetadata};

/// Group every spawn belongs to unless configured otherwise.
pub const DEFAULT_SPAWN_GROUP: u32 = 0;
/// Group for spawns that keep pre-group respawn behaviour.
pub const LEGACY_SPAWN_GROUP: u32 = 1;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct SpawnGroupFlags: u32 {
        const SYSTEM = 0x01;
        const COMPATIBILITY_MODE = 0x02;
        const MANUAL_SPAWN = 0x04;
        const DYNAMIC_SPAWN_RATE = 0x08;
        const ESCORT_QUEST_NPC = 0x10;
        const DESPAWN_ON_CONDITION_FAILURE = 0x20;
    }
}

/// Map affinity of a group. Binding is one-way.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SpawnGroupMap {
    #[default]
    Unbound,
    Bound(u32),
}

impl SpawnGroupMap {
    pub fn map_id(&self) -> Option<u32> {
        match self {
            Self::Unbound => None,
            Self::Bound(map_id) => Some(*map_id),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpawnGroupTemplateData {
    pub group_id: u32,
    pub name: String,
    pub map: SpawnGroupMap,
    pub flags: SpawnGroupFlags,
}

impl SpawnGroupTemplateData {
    pub fn is_system(&self) -> bool {
        self.flags.contains(SpawnGroupFlags::SYSTEM)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpawnGroupError {
    #[error("spawn group {0} does not exist")]
    UnknownGroup(u32),
    #[error("spawn group {group_id} is bound to map {group_map} but {spawn:?} is on map {spawn_map}")]
    MapConflict {
        group_id: u32,
        group_map: u32,
        spawn: SpawnKey,
        spawn_map: u32,
    },
    #[error("{spawn:?} references spawn group {group_id}, which has no template")]
    MissingTemplate { group_id: u32, spawn: SpawnKey },
    #[error("{spawn:?} is not a member of spawn group {group_id}")]
    NotAMember { group_id: u32, spawn: SpawnKey },
}

/// Templates plus the public membership index of non-system groups.
#[derive(Clone, Debug)]
pub struct SpawnGroupRegistry {
    templates: BTreeMap<u32, SpawnGroupTemplateData>,
    members: BTreeMap<u32, BTreeSet<SpawnKey>>,
    by_map: BTreeMap<u32, BTreeSet<u32>>,
}

impl Default for SpawnGroupRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SpawnGroupRegistry {
    /// A registry holding only the built-in system groups.
    pub fn new() -> Self {
        let mut registry = Self {
            templates: BTreeMap::new(),
            members: BTreeMap::new(),
            by_map: BTreeMap::new(),
        };
        registry.ensure_system_groups();
        registry
    }

    /// Create the Default and Legacy groups if missing and make sure both
    /// carry the system flag.
    pub fn ensure_system_groups(&mut self) {
        for (group_id, name, flags) in [
            (DEFAULT_SPAWN_GROUP, "Default", SpawnGroupFlags::SYSTEM),
            (
                LEGACY_SPAWN_GROUP,
                "Legacy",
                SpawnGroupFlags::SYSTEM | SpawnGroupFlags::COMPATIBILITY_MODE,
            ),
        ] {
            let template = self
                .templates
                .entry(group_id)
                .or_insert_with(|| SpawnGroupTemplateData {
                    group_id,
                    name: name.to_string(),
                    map: SpawnGroupMap::Unbound,
                    flags,
                });
            if !template.is_system() {
                error!(
                    "spawn group {} '{}' must be a system group, adding the system flag",
                    group_id, template.name
                );
                template.flags.insert(SpawnGroupFlags::SYSTEM);
                template.flags.remove(SpawnGroupFlags::MANUAL_SPAWN);
            }
        }
    }

    /// Register or replace a template from raw stored flags, correcting
    /// invalid flag combinations. Templates start unbound.
    pub fn register_template(
        &mut self,
        group_id: u32,
        name: impl Into<String>,
        raw_flags: u32,
    ) -> &SpawnGroupTemplateData {
        let name = name.into();
        let mut flags = SpawnGroupFlags::from_bits_truncate(raw_flags);
        if flags.bits() != raw_flags {
            warn!(
                "spawn group {} '{}' has unknown flags 0x{:X}, removing them",
                group_id,
                name,
                raw_flags & !SpawnGroupFlags::all().bits()
            );
        }
        if flags.contains(SpawnGroupFlags::SYSTEM | SpawnGroupFlags::MANUAL_SPAWN) {
            warn!(
                "spawn group {} '{}' is a system group with manual spawn set, clearing manual spawn",
                group_id, name
            );
            flags.remove(SpawnGroupFlags::MANUAL_SPAWN);
        }

        self.forget_group(group_id);
        self.templates.insert(
            group_id,
            SpawnGroupTemplateData {
                group_id,
                name,
                map: SpawnGroupMap::Unbound,
                flags,
            },
        );
        if group_id == DEFAULT_SPAWN_GROUP || group_id == LEGACY_SPAWN_GROUP {
            self.ensure_system_groups();
        }
        &self.templates[&group_id]
    }

    pub fn template(&self, group_id: u32) -> Option<&SpawnGroupTemplateData> {
        self.templates.get(&group_id)
    }

    pub fn templates(&self) -> impl Iterator<Item = &SpawnGroupTemplateData> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Add a spawn to a group. An unbound non-system group binds to the
    /// spawn's map; a group bound elsewhere rejects the spawn. System groups
    /// accept any spawn but keep no public membership.
    pub fn assign_member(
        &mut self,
        spawn: &SpawnMetadata,
        group_id: u32,
    ) -> Result<(), SpawnGroupError> {
        let template = self
            .templates
            .get_mut(&group_id)
            .ok_or(SpawnGroupError::UnknownGroup(group_id))?;
        if template.is_system() {
            return Ok(());
        }

        match template.map {
            SpawnGroupMap::Unbound => {
                template.map = SpawnGroupMap::Bound(spawn.map_id);
                self.by_map.entry(spawn.map_id).or_default().insert(group_id);
            }
            SpawnGroupMap::Bound(group_map) if group_map != spawn.map_id => {
                warn!(
                    "spawn group {} '{}' is bound to map {}, cannot add {} {} on map {}",
                    group_id,
                    template.name,
                    group_map,
                    spawn.kind.name(),
                    spawn.spawn_id,
                    spawn.map_id
                );
                return Err(SpawnGroupError::MapConflict {
                    group_id,
                    group_map,
                    spawn: spawn.key(),
                    spawn_map: spawn.map_id,
                });
            }
            SpawnGroupMap::Bound(_) => {}
        }

        self.members.entry(group_id).or_default().insert(spawn.key());
        Ok(())
    }

    /// Drop a spawn from its group's membership.
    pub fn unassign(&mut self, spawn: SpawnKey, group_id: u32) -> Result<(), SpawnGroupError> {
        let template = self
            .templates
            .get(&group_id)
            .ok_or(SpawnGroupError::MissingTemplate { group_id, spawn })?;
        if template.is_system() {
            return Ok(());
        }

        let removed = self
            .members
            .get_mut(&group_id)
            .map(|members| members.remove(&spawn))
            .unwrap_or(false);
        if !removed {
            return Err(SpawnGroupError::NotAMember { group_id, spawn });
        }
        Ok(())
    }

    /// Public members of a group. Always empty for system groups.
    pub fn members(&self, group_id: u32) -> impl Iterator<Item = SpawnKey> + '_ {
        self.members.get(&group_id).into_iter().flatten().copied()
    }

    pub fn member_count(&self, group_id: u32) -> usize {
        self.members.get(&group_id).map(BTreeSet::len).unwrap_or(0)
    }

    /// Non-system groups bound to a map.
    pub fn groups_for_map(&self, map_id: u32) -> impl Iterator<Item = u32> + '_ {
        self.by_map.get(&map_id).into_iter().flatten().copied()
    }

    /// Remove non-system groups that never received a member.
    pub fn prune_unbound(&mut self) -> Vec<u32> {
        let unbound: Vec<u32> = self
            .templates
            .values()
            .filter(|t| !t.is_system() && t.map == SpawnGroupMap::Unbound)
            .map(|t| t.group_id)
            .collect();
        for group_id in &unbound {
            if let Some(template) = self.templates.remove(group_id) {
                error!(
                    "spawn group {} '{}' has no spawn points, removing it",
                    group_id, template.name
                );
            }
            self.members.remove(group_id);
        }
        unbound
    }

    fn forget_group(&mut self, group_id: u32) {
        if let Some(SpawnGroupMap::Bound(map_id)) = self.templates.get(&group_id).map(|t| t.map) {
            if let Some(groups) = self.by_map.get_mut(&map_id) {
                groups.remove(&group_id);
            }
        }
        self.members.remove(&group_id);
    }
}
