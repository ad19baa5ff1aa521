//! Read-only static game tables consumed while loading and resolving.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ids::Difficulty;
use crate::phase::{PhaseShift, PhaseVisibility};
use crate::zone::{ZoneHierarchy, UNKNOWN_ZONE};

/// Where a ghost is sent when it dies inside a map: the outer map and the
/// entrance position on it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorpseEntrance {
    pub map_id: u32,
    pub x: f32,
    pub y: f32,
}

impl CorpseEntrance {
    /// A zeroed entrance position means "no coordinates recorded".
    pub fn has_position(&self) -> bool {
        !(self.x == 0.0 && self.y == 0.0)
    }
}

/// One row of the map table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapEntry {
    pub id: u32,
    pub name: String,
    /// Map this one is a child of (phased terrain swaps).
    #[serde(default)]
    pub parent_map: Option<u32>,
    #[serde(default)]
    pub corpse: Option<CorpseEntrance>,
    #[serde(default)]
    pub transport: bool,
    /// Difficulties content on this map may be spawned under.
    #[serde(default)]
    pub difficulties: Vec<Difficulty>,
}

impl MapEntry {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_map: None,
            corpse: None,
            transport: false,
            difficulties: vec![Difficulty::NONE],
        }
    }

    /// Whether the map has a usable corpse-map relation to `map_id`.
    pub fn has_corpse_relation_to(&self, map_id: u32) -> bool {
        self.corpse
            .map(|corpse| corpse.map_id == map_id && corpse.has_position())
            .unwrap_or(false)
    }
}

/// Axis-aligned horizontal extent of an area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaBounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl AreaBounds {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn area(&self) -> f32 {
        (self.max_x - self.min_x).max(0.0) * (self.max_y - self.min_y).max(0.0)
    }
}

/// One row of the area table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaEntry {
    pub id: u32,
    pub name: String,
    pub map_id: u32,
    #[serde(default)]
    pub parent_area: Option<u32>,
    #[serde(default)]
    pub bounds: Option<AreaBounds>,
}

/// One row of the phase table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseEntry {
    pub id: u32,
    #[serde(default)]
    pub personal: bool,
}

/// Lookups into the static game database.
pub trait ReferenceData {
    fn map_entry(&self, map_id: u32) -> Option<&MapEntry>;
    fn has_map_difficulty(&self, map_id: u32, difficulty: Difficulty) -> bool;
    fn area_exists(&self, area_id: u32) -> bool;
    fn phase_exists(&self, phase_id: u32) -> bool;
    fn phase_group_exists(&self, phase_group_id: u32) -> bool;

    fn map_exists(&self, map_id: u32) -> bool {
        self.map_entry(map_id).is_some()
    }
}

/// In-memory reference tables, loadable from a RON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticReferenceData {
    #[serde(default)]
    pub maps: BTreeMap<u32, MapEntry>,
    #[serde(default)]
    pub areas: BTreeMap<u32, AreaEntry>,
    #[serde(default)]
    pub phases: BTreeMap<u32, PhaseEntry>,
    /// Phase group id -> member phase ids.
    #[serde(default)]
    pub phase_groups: BTreeMap<u32, Vec<u32>>,
}

impl StaticReferenceData {
    pub fn with_map(mut self, map: MapEntry) -> Self {
        self.maps.insert(map.id, map);
        self
    }

    pub fn with_area(mut self, area: AreaEntry) -> Self {
        self.areas.insert(area.id, area);
        self
    }

    pub fn with_phase(mut self, id: u32, personal: bool) -> Self {
        self.phases.insert(id, PhaseEntry { id, personal });
        self
    }

    pub fn with_phase_group(mut self, id: u32, phases: Vec<u32>) -> Self {
        self.phase_groups.insert(id, phases);
        self
    }
}

impl ReferenceData for StaticReferenceData {
    fn map_entry(&self, map_id: u32) -> Option<&MapEntry> {
        self.maps.get(&map_id)
    }

    fn has_map_difficulty(&self, map_id: u32, difficulty: Difficulty) -> bool {
        self.maps
            .get(&map_id)
            .map(|map| map.difficulties.contains(&difficulty))
            .unwrap_or(false)
    }

    fn area_exists(&self, area_id: u32) -> bool {
        self.areas.contains_key(&area_id)
    }

    fn phase_exists(&self, phase_id: u32) -> bool {
        self.phases.contains_key(&phase_id)
    }

    fn phase_group_exists(&self, phase_group_id: u32) -> bool {
        self.phase_groups.contains_key(&phase_group_id)
    }
}

impl PhaseVisibility for StaticReferenceData {
    fn is_personal_phase(&self, phase_id: u32) -> bool {
        self.phases
            .get(&phase_id)
            .map(|phase| phase.personal)
            .unwrap_or(false)
    }
}

impl ZoneHierarchy for StaticReferenceData {
    /// Smallest bounded area on the map containing the point. Phase-based
    /// terrain swaps are not modelled by static tables.
    fn zone_id(&self, _phase: &PhaseShift, map_id: u32, x: f32, y: f32, _z: f32) -> u32 {
        self.areas
            .values()
            .filter(|area| area.map_id == map_id)
            .filter_map(|area| area.bounds.map(|bounds| (area.id, bounds)))
            .filter(|(_, bounds)| bounds.contains(x, y))
            .min_by(|a, b| a.1.area().total_cmp(&b.1.area()))
            .map(|(id, _)| id)
            .unwrap_or(UNKNOWN_ZONE)
    }

    fn parent_area(&self, zone_id: u32) -> Option<u32> {
        self.areas
            .get(&zone_id)
            .and_then(|area| area.parent_area)
            .filter(|&parent| parent != UNKNOWN_ZONE)
    }
}
