//! Nearest-graveyard search over the zone hierarchy.

use bevy::log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use wc_core::{
    ConditionEvaluator, ConditionSource, ContextObject, MapEntry, PhaseShift, ReferenceData,
    Team, WorldLocation, ZoneHierarchy, UNKNOWN_ZONE,
};

use crate::registry::{GraveyardRegistry, WorldSafeLocsEntry};

/// How equal-distance candidates in the entrance bucket are ordered.
/// The near bucket always keeps the first candidate seen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TieBreakPolicy {
    /// Entrance ties go to the last candidate seen.
    #[default]
    Legacy,
    /// Every bucket keeps the first candidate seen.
    FirstSeen,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    pub default_alliance_graveyard: u32,
    pub default_horde_graveyard: u32,
    /// Positions in an unknown zone above this height go straight to the
    /// team default.
    pub underground_z: f32,
    pub max_hierarchy_depth: usize,
    pub tie_break: TieBreakPolicy,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            default_alliance_graveyard: 4,
            default_horde_graveyard: 10,
            underground_z: -500.0,
            max_hierarchy_depth: 32,
            tie_break: TieBreakPolicy::Legacy,
        }
    }
}

/// Collaborators the resolver reads from.
#[derive(Clone, Copy)]
pub struct ResolverEnv<'a> {
    pub zones: &'a dyn ZoneHierarchy,
    pub reference: &'a dyn ReferenceData,
    pub conditions: &'a dyn ConditionEvaluator,
}

impl GraveyardRegistry {
    /// Closest usable graveyard for `location`, walking up the zone's parent
    /// chain and ending at the team default.
    pub fn closest_graveyard(
        &self,
        location: &WorldLocation,
        team: Option<Team>,
        context: Option<&dyn ContextObject>,
        env: &ResolverEnv<'_>,
    ) -> Option<&WorldSafeLocsEntry> {
        let empty = PhaseShift::empty();
        let phase = context.map(|object| object.phase_shift()).unwrap_or(&empty);
        let pos = &location.position;
        let zone_id = env.zones.zone_id(phase, location.map_id, pos.x, pos.y, pos.z);

        if zone_id == UNKNOWN_ZONE && pos.z > self.settings.underground_z {
            warn!(
                "no zone at map {} ({}, {}, {}), using default graveyard",
                location.map_id, pos.x, pos.y, pos.z
            );
            return self.default_graveyard(team);
        }

        let mut visited = BTreeSet::new();
        let mut current = Some(zone_id);
        while let Some(zone) = current {
            if visited.len() >= self.settings.max_hierarchy_depth || !visited.insert(zone) {
                warn!("zone hierarchy above {} is cyclic or too deep", zone_id);
                break;
            }
            if let Some(found) = self.closest_graveyard_in_zone(location, team, context, zone, env) {
                return Some(found);
            }
            current = env.zones.parent_area(zone);
        }

        debug!(
            "no graveyard linked to zone {} or its parents, using default graveyard",
            zone_id
        );
        self.default_graveyard(team)
    }

    /// Best candidate linked directly to `zone_id`: same-map graveyards by
    /// 3D distance, then graveyards at the map's corpse entrance by 2D
    /// distance, then anything else in link order.
    pub fn closest_graveyard_in_zone(
        &self,
        location: &WorldLocation,
        team: Option<Team>,
        context: Option<&dyn ContextObject>,
        zone_id: u32,
        env: &ResolverEnv<'_>,
    ) -> Option<&WorldSafeLocsEntry> {
        let map_entry: Option<&MapEntry> = env.reference.map_entry(location.map_id);
        let parent_map = map_entry.and_then(|map| map.parent_map);
        let tie_break = self.settings.tie_break;

        let mut near: Option<(f32, &WorldSafeLocsEntry)> = None;
        let mut entrance: Option<(f32, &WorldSafeLocsEntry)> = None;
        let mut far: Option<&WorldSafeLocsEntry> = None;

        for data in self.links_for_zone(zone_id) {
            let Some(entry) = self.world_safe_loc(data.safe_loc_id) else {
                error!(
                    "graveyard {} linked to zone {} has no safe location",
                    data.safe_loc_id, zone_id
                );
                continue;
            };
            let candidate_map = entry.location.map_id;

            if let Some(object) = context {
                if !env.conditions.meets(&ConditionSource::new(object), &data.conditions) {
                    continue;
                }
                if Some(candidate_map) == parent_map
                    && !object.phase_shift().has_visible_map_id(candidate_map)
                {
                    continue;
                }
            } else if let Some(team) = team {
                if !data.allows_team(team) {
                    continue;
                }
            }

            if candidate_map == location.map_id || Some(candidate_map) == parent_map {
                let dist = entry.location.position.distance_squared(&location.position);
                if near.map_or(true, |(best, _)| dist < best) {
                    near = Some((dist, entry));
                }
            } else if let Some(corpse) = map_entry
                .filter(|map| map.has_corpse_relation_to(candidate_map))
                .and_then(|map| map.corpse)
            {
                let dist = entry.location.position.distance_squared_2d(corpse.x, corpse.y);
                let replace = match (entrance, tie_break) {
                    (None, _) => true,
                    (Some((best, _)), TieBreakPolicy::Legacy) => dist <= best,
                    (Some((best, _)), TieBreakPolicy::FirstSeen) => dist < best,
                };
                if replace {
                    entrance = Some((dist, entry));
                }
            } else if far.is_none() {
                far = Some(entry);
            }
        }

        near.or(entrance).map(|(_, entry)| entry).or(far)
    }
}
