//! Resurrection points and their zone links.

use bevy::log::{debug, warn};
use std::collections::BTreeMap;
use thiserror::Error;
use wc_core::{Condition, Team, WorldLocation};

use crate::resolver::ResolverSettings;

/// A resurrection point.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldSafeLocsEntry {
    pub id: u32,
    pub location: WorldLocation,
}

/// One zone → graveyard link and the conditions restricting it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraveyardData {
    pub safe_loc_id: u32,
    pub conditions: Vec<Condition>,
}

impl GraveyardData {
    pub fn new(safe_loc_id: u32) -> Self {
        Self {
            safe_loc_id,
            conditions: Vec::new(),
        }
    }

    /// Team-only check used when no live object is available: every team
    /// condition must name `team`, other condition kinds are ignored.
    pub fn allows_team(&self, team: Team) -> bool {
        self.conditions.iter().all(|condition| match condition {
            Condition::Team(required) => *required == team,
            _ => true,
        })
    }
}

/// Write-through target for runtime link edits.
pub trait GraveyardSink {
    fn insert_link(&mut self, safe_loc_id: u32, zone_id: u32, conditions: &[Condition]) -> Result<(), String>;
    fn delete_link(&mut self, safe_loc_id: u32, zone_id: u32) -> Result<(), String>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraveyardError {
    #[error("graveyard {safe_loc_id} is already linked to zone {zone_id}")]
    DuplicateLink { safe_loc_id: u32, zone_id: u32 },
    #[error("graveyard {safe_loc_id} is not linked to zone {zone_id}")]
    UnknownLink { safe_loc_id: u32, zone_id: u32 },
    #[error("world safe location {0} does not exist")]
    UnknownSafeLoc(u32),
    #[error("failed to persist graveyard link: {0}")]
    Persist(String),
}

/// Zone-keyed multimap of graveyard links plus the safe location table.
#[derive(Clone, Debug, Default)]
pub struct GraveyardRegistry {
    safe_locs: BTreeMap<u32, WorldSafeLocsEntry>,
    /// Links per zone, in insertion order.
    zones: BTreeMap<u32, Vec<GraveyardData>>,
    pub(crate) settings: ResolverSettings,
}

impl GraveyardRegistry {
    pub fn new(settings: ResolverSettings) -> Self {
        Self {
            safe_locs: BTreeMap::new(),
            zones: BTreeMap::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Insert or replace a safe location, returning the replaced one.
    pub fn add_safe_loc(&mut self, entry: WorldSafeLocsEntry) -> Option<WorldSafeLocsEntry> {
        self.safe_locs.insert(entry.id, entry)
    }

    pub fn world_safe_loc(&self, id: u32) -> Option<&WorldSafeLocsEntry> {
        self.safe_locs.get(&id)
    }

    /// The fallback graveyard for a team, if one is configured and loaded.
    pub fn default_graveyard(&self, team: Option<Team>) -> Option<&WorldSafeLocsEntry> {
        let id = match team? {
            Team::Alliance => self.settings.default_alliance_graveyard,
            Team::Horde => self.settings.default_horde_graveyard,
        };
        self.world_safe_loc(id)
    }

    /// Link a graveyard to a zone. A team restriction becomes a team
    /// condition on the link. With a sink the new rows are written through;
    /// a failed write leaves the registry unchanged.
    pub fn add_link(
        &mut self,
        safe_loc_id: u32,
        zone_id: u32,
        team: Option<Team>,
        sink: Option<&mut dyn GraveyardSink>,
    ) -> Result<(), GraveyardError> {
        if self.find_graveyard_data(safe_loc_id, zone_id).is_some() {
            debug!(
                "graveyard {} already linked to zone {}, ignoring",
                safe_loc_id, zone_id
            );
            return Err(GraveyardError::DuplicateLink {
                safe_loc_id,
                zone_id,
            });
        }
        if !self.safe_locs.contains_key(&safe_loc_id) {
            return Err(GraveyardError::UnknownSafeLoc(safe_loc_id));
        }

        let mut data = GraveyardData::new(safe_loc_id);
        if let Some(team) = team {
            data.conditions.push(Condition::Team(team));
        }
        if let Some(sink) = sink {
            sink.insert_link(safe_loc_id, zone_id, &data.conditions)
                .map_err(GraveyardError::Persist)?;
        }

        self.zones.entry(zone_id).or_default().push(data);
        Ok(())
    }

    /// Remove a link, returning its data.
    pub fn remove_link(
        &mut self,
        safe_loc_id: u32,
        zone_id: u32,
        sink: Option<&mut dyn GraveyardSink>,
    ) -> Result<GraveyardData, GraveyardError> {
        let missing = || GraveyardError::UnknownLink {
            safe_loc_id,
            zone_id,
        };
        let bucket = self.zones.get_mut(&zone_id).ok_or_else(missing)?;
        let index = bucket
            .iter()
            .position(|data| data.safe_loc_id == safe_loc_id)
            .ok_or_else(missing)?;

        if let Some(sink) = sink {
            sink.delete_link(safe_loc_id, zone_id)
                .map_err(GraveyardError::Persist)?;
        }

        let removed = bucket.remove(index);
        if bucket.is_empty() {
            self.zones.remove(&zone_id);
        }
        Ok(removed)
    }

    /// Attach a stored condition to an existing link.
    pub fn attach_condition(
        &mut self,
        safe_loc_id: u32,
        zone_id: u32,
        condition: Condition,
    ) -> Result<(), GraveyardError> {
        let data = self
            .zones
            .get_mut(&zone_id)
            .and_then(|bucket| bucket.iter_mut().find(|data| data.safe_loc_id == safe_loc_id))
            .ok_or(GraveyardError::UnknownLink {
                safe_loc_id,
                zone_id,
            })?;
        if data.conditions.contains(&condition) {
            warn!(
                "graveyard {} in zone {} already has condition {:?}",
                safe_loc_id, zone_id, condition
            );
            return Ok(());
        }
        data.conditions.push(condition);
        Ok(())
    }

    pub fn find_graveyard_data(&self, safe_loc_id: u32, zone_id: u32) -> Option<&GraveyardData> {
        self.links_for_zone(zone_id)
            .iter()
            .find(|data| data.safe_loc_id == safe_loc_id)
    }

    pub fn links_for_zone(&self, zone_id: u32) -> &[GraveyardData] {
        self.zones.get(&zone_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn link_count(&self) -> usize {
        self.zones.values().map(Vec::len).sum()
    }

    pub fn safe_loc_count(&self) -> usize {
        self.safe_locs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wc_core::Position;

    #[derive(Default)]
    struct RecordingSink {
        inserted: Vec<(u32, u32, Vec<Condition>)>,
        deleted: Vec<(u32, u32)>,
        fail: bool,
    }

    impl GraveyardSink for RecordingSink {
        fn insert_link(&mut self, safe_loc_id: u32, zone_id: u32, conditions: &[Condition]) -> Result<(), String> {
            if self.fail {
                return Err("disk full".into());
            }
            self.inserted.push((safe_loc_id, zone_id, conditions.to_vec()));
            Ok(())
        }

        fn delete_link(&mut self, safe_loc_id: u32, zone_id: u32) -> Result<(), String> {
            self.deleted.push((safe_loc_id, zone_id));
            Ok(())
        }
    }

    fn registry_with(ids: &[u32]) -> GraveyardRegistry {
        let mut registry = GraveyardRegistry::default();
        for &id in ids {
            registry.add_safe_loc(WorldSafeLocsEntry {
                id,
                location: WorldLocation::new(0, Position::new(id as f32, 0.0, 0.0)),
            });
        }
        registry
    }

    #[test]
    fn duplicate_link_is_rejected() {
        let mut registry = registry_with(&[5]);
        let mut sink = RecordingSink::default();

        assert!(registry.add_link(5, 42, Some(Team::Horde), Some(&mut sink)).is_ok());
        assert_eq!(
            registry.add_link(5, 42, Some(Team::Horde), Some(&mut sink)),
            Err(GraveyardError::DuplicateLink {
                safe_loc_id: 5,
                zone_id: 42
            })
        );
        assert_eq!(registry.links_for_zone(42).len(), 1);
        assert_eq!(sink.inserted.len(), 1);
        assert_eq!(sink.inserted[0].2, vec![Condition::Team(Team::Horde)]);
    }

    #[test]
    fn team_link_records_condition() {
        let mut registry = registry_with(&[5, 6]);
        registry.add_link(5, 42, Some(Team::Alliance), None).unwrap();
        registry.add_link(6, 42, None, None).unwrap();

        let restricted = registry.find_graveyard_data(5, 42).unwrap();
        assert!(restricted.allows_team(Team::Alliance));
        assert!(!restricted.allows_team(Team::Horde));

        let open = registry.find_graveyard_data(6, 42).unwrap();
        assert!(open.conditions.is_empty());
        assert!(open.allows_team(Team::Horde));
    }

    #[test]
    fn unknown_safe_loc_cannot_be_linked() {
        let mut registry = registry_with(&[]);
        assert_eq!(
            registry.add_link(9, 1, None, None),
            Err(GraveyardError::UnknownSafeLoc(9))
        );
    }

    #[test]
    fn failed_persist_leaves_registry_unchanged() {
        let mut registry = registry_with(&[5]);
        let mut sink = RecordingSink {
            fail: true,
            ..Default::default()
        };
        assert!(matches!(
            registry.add_link(5, 42, None, Some(&mut sink)),
            Err(GraveyardError::Persist(_))
        ));
        assert!(registry.find_graveyard_data(5, 42).is_none());
    }

    #[test]
    fn remove_link_round_trip() {
        let mut registry = registry_with(&[5]);
        let mut sink = RecordingSink::default();
        registry.add_link(5, 42, None, None).unwrap();

        let removed = registry.remove_link(5, 42, Some(&mut sink)).unwrap();
        assert_eq!(removed.safe_loc_id, 5);
        assert_eq!(sink.deleted, vec![(5, 42)]);
        assert_eq!(registry.link_count(), 0);
        assert!(matches!(
            registry.remove_link(5, 42, None),
            Err(GraveyardError::UnknownLink { .. })
        ));
    }

    #[test]
    fn remove_link_misses_leave_zone_untouched() {
        let mut registry = registry_with(&[5, 6]);
        let mut sink = RecordingSink::default();
        registry.add_link(5, 42, None, None).unwrap();

        assert_eq!(
            registry.remove_link(6, 42, Some(&mut sink)),
            Err(GraveyardError::UnknownLink {
                safe_loc_id: 6,
                zone_id: 42
            })
        );
        assert_eq!(
            registry.remove_link(5, 43, Some(&mut sink)),
            Err(GraveyardError::UnknownLink {
                safe_loc_id: 5,
                zone_id: 43
            })
        );
        assert!(sink.deleted.is_empty());
        assert!(registry.find_graveyard_data(5, 42).is_some());
    }

    #[test]
    fn conditions_attach_to_existing_links_only() {
        let mut registry = registry_with(&[5]);
        registry.add_link(5, 42, None, None).unwrap();
        registry.attach_condition(5, 42, Condition::Phase(3)).unwrap();
        registry.attach_condition(5, 42, Condition::Phase(3)).unwrap();
        assert_eq!(registry.find_graveyard_data(5, 42).unwrap().conditions.len(), 1);
        assert!(registry.attach_condition(5, 43, Condition::Phase(3)).is_err());
    }

    #[test]
    fn default_graveyard_depends_on_team() {
        let registry = registry_with(&[4, 10]);
        assert_eq!(registry.default_graveyard(Some(Team::Alliance)).unwrap().id, 4);
        assert_eq!(registry.default_graveyard(Some(Team::Horde)).unwrap().id, 10);
        assert!(registry.default_graveyard(None).is_none());
    }
}
