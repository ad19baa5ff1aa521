//! The world data registry: spawn store, cell index, spawn groups, instance
//! bindings and graveyards, kept consistent with each other.

use bevy::log::{error, warn};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;
use wc_core::{
    ConditionEvaluator, ContextObject, Difficulty, StaticReferenceData, Team, WorldLocation,
};
use wc_graveyard::{
    GraveyardData, GraveyardError, GraveyardRegistry, GraveyardSink, ResolverEnv,
    ResolverSettings, WorldSafeLocsEntry,
};
use wc_spawn::{
    CellObjectGuids, EncounterState, GridIndex, InstanceBindingError, InstanceBindings,
    InstanceSpawnGroupInfo, SpawnData, SpawnGroupAction, SpawnGroupError, SpawnGroupRegistry,
    SpawnGroupTemplateData, SpawnKey, SpawnMetadata,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpawnError {
    #[error("{0:?} is already registered")]
    DuplicateSpawn(SpawnKey),
    #[error("{0:?} is not registered")]
    UnknownSpawn(SpawnKey),
    #[error("{0:?} has no spawn difficulties")]
    NoDifficulties(SpawnKey),
    #[error(transparent)]
    Group(#[from] SpawnGroupError),
}

/// All spawn and graveyard data for a world. Cloning is how copy-on-write
/// edits are staged; see [`crate::SharedRegistry`].
#[derive(Clone, Debug, Default)]
pub struct WorldDataRegistry {
    reference: Arc<StaticReferenceData>,
    spawns: HashMap<SpawnKey, SpawnData>,
    grid: GridIndex,
    groups: SpawnGroupRegistry,
    instances: InstanceBindings,
    graveyards: GraveyardRegistry,
}

impl WorldDataRegistry {
    pub fn new(reference: Arc<StaticReferenceData>, settings: ResolverSettings) -> Self {
        Self {
            reference,
            spawns: HashMap::new(),
            grid: GridIndex::new(),
            groups: SpawnGroupRegistry::new(),
            instances: InstanceBindings::new(),
            graveyards: GraveyardRegistry::new(settings),
        }
    }

    pub fn reference(&self) -> &StaticReferenceData {
        &self.reference
    }

    pub(crate) fn reference_arc(&self) -> Arc<StaticReferenceData> {
        Arc::clone(&self.reference)
    }

    /// Collaborators for graveyard resolution backed by this registry's
    /// reference tables.
    pub fn resolver_env<'a>(&'a self, conditions: &'a dyn ConditionEvaluator) -> ResolverEnv<'a> {
        ResolverEnv {
            zones: self.reference.as_ref(),
            reference: self.reference.as_ref(),
            conditions,
        }
    }

    // Spawns

    /// Store a spawn, join its group and index it. Nothing changes on error.
    pub fn register_spawn(&mut self, spawn: SpawnData) -> Result<(), SpawnError> {
        self.insert_spawn(spawn, true)
    }

    /// Store a spawn and join its group without indexing it. Used for spawns
    /// owned by a transport, which places them itself.
    pub fn register_unindexed_spawn(&mut self, spawn: SpawnData) -> Result<(), SpawnError> {
        self.insert_spawn(spawn, false)
    }

    fn insert_spawn(&mut self, spawn: SpawnData, index: bool) -> Result<(), SpawnError> {
        let key = spawn.key();
        if self.spawns.contains_key(&key) {
            return Err(SpawnError::DuplicateSpawn(key));
        }
        if spawn.spawn_difficulties.is_empty() {
            return Err(SpawnError::NoDifficulties(key));
        }
        self.groups
            .assign_member(&spawn.meta, spawn.meta.spawn_group_id)?;
        if index {
            self.grid.insert(&spawn, self.reference.as_ref());
        }
        self.spawns.insert(key, spawn);
        Ok(())
    }

    /// Remove a spawn from its group, the index and the store. A broken
    /// membership record is reported and nothing is removed.
    pub fn deregister_spawn(&mut self, key: SpawnKey) -> Result<SpawnData, SpawnError> {
        let group_id = self
            .spawns
            .get(&key)
            .map(|spawn| spawn.meta.spawn_group_id)
            .ok_or(SpawnError::UnknownSpawn(key))?;
        if let Err(err) = self.groups.unassign(key, group_id) {
            error!("cannot deregister {:?}: {}", key, err);
            return Err(err.into());
        }
        self.grid.remove(key);
        self.spawns
            .remove(&key)
            .ok_or(SpawnError::UnknownSpawn(key))
    }

    /// Move a spawn into another group. If the new group rejects it the
    /// spawn stays where it was.
    pub fn assign_spawn_to_group(&mut self, key: SpawnKey, group_id: u32) -> Result<(), SpawnError> {
        let spawn = self.spawns.get_mut(&key).ok_or(SpawnError::UnknownSpawn(key))?;
        let previous = spawn.meta.spawn_group_id;
        if previous == group_id {
            return Ok(());
        }

        self.groups.assign_member(&spawn.meta, group_id)?;
        if let Err(err) = self.groups.unassign(key, previous) {
            warn!(
                "{:?} was not tracked by its previous spawn group {}: {}",
                key, previous, err
            );
        }
        spawn.meta.spawn_group_id = group_id;
        Ok(())
    }

    pub fn spawn_data(&self, key: SpawnKey) -> Option<&SpawnData> {
        self.spawns.get(&key)
    }

    pub fn creature_data(&self, spawn_id: u64) -> Option<&SpawnData> {
        self.spawn_data(SpawnKey::creature(spawn_id))
    }

    pub fn game_object_data(&self, spawn_id: u64) -> Option<&SpawnData> {
        self.spawn_data(SpawnKey::game_object(spawn_id))
    }

    pub fn spawns(&self) -> impl Iterator<Item = &SpawnData> + '_ {
        self.spawns.values()
    }

    pub fn spawn_count(&self) -> usize {
        self.spawns.len()
    }

    // Cell index

    fn add_to_grid(&mut self, key: SpawnKey) -> bool {
        match self.spawns.get(&key) {
            Some(spawn) => self.grid.insert(spawn, self.reference.as_ref()),
            None => false,
        }
    }

    /// Index a stored creature under its current position and difficulties.
    pub fn add_creature_to_grid(&mut self, spawn_id: u64) -> bool {
        self.add_to_grid(SpawnKey::creature(spawn_id))
    }

    pub fn remove_creature_from_grid(&mut self, spawn_id: u64) -> bool {
        self.grid.remove(SpawnKey::creature(spawn_id))
    }

    /// Index a stored game object under its current position and difficulties.
    pub fn add_game_object_to_grid(&mut self, spawn_id: u64) -> bool {
        self.add_to_grid(SpawnKey::game_object(spawn_id))
    }

    pub fn remove_game_object_from_grid(&mut self, spawn_id: u64) -> bool {
        self.grid.remove(SpawnKey::game_object(spawn_id))
    }

    pub fn cell_object_guids(&self, map_id: u32, difficulty: Difficulty, cell_id: u32) -> &CellObjectGuids {
        self.grid.lookup(map_id, difficulty, cell_id)
    }

    pub fn cell_personal_object_guids(
        &self,
        map_id: u32,
        difficulty: Difficulty,
        phase_id: u32,
        cell_id: u32,
    ) -> &CellObjectGuids {
        self.grid.lookup_personal(map_id, difficulty, phase_id, cell_id)
    }

    pub fn grid(&self) -> &GridIndex {
        &self.grid
    }

    // Spawn groups

    pub fn spawn_group_data(&self, group_id: u32) -> Option<&SpawnGroupTemplateData> {
        self.groups.template(group_id)
    }

    /// Metadata of every public member of a group.
    pub fn spawn_metadata_for_group(&self, group_id: u32) -> impl Iterator<Item = &SpawnMetadata> + '_ {
        self.groups
            .members(group_id)
            .filter_map(|key| self.spawns.get(&key))
            .map(|spawn| &spawn.meta)
    }

    pub fn spawn_groups_for_map(&self, map_id: u32) -> impl Iterator<Item = u32> + '_ {
        self.groups.groups_for_map(map_id)
    }

    pub fn spawn_groups(&self) -> &SpawnGroupRegistry {
        &self.groups
    }

    pub(crate) fn spawn_groups_mut(&mut self) -> &mut SpawnGroupRegistry {
        &mut self.groups
    }

    // Instance bindings

    pub fn bind_instance_spawn_group(&mut self, info: InstanceSpawnGroupInfo) -> Result<(), InstanceBindingError> {
        self.instances.bind(info, &self.groups)
    }

    pub fn instance_spawn_groups_for_map(&self, map_id: u32) -> &[InstanceSpawnGroupInfo] {
        self.instances.for_map(map_id)
    }

    /// Which of an instance's groups should currently be spawned.
    pub fn instance_spawn_plan(
        &self,
        map_id: u32,
        boss_state: impl Fn(u32) -> EncounterState,
        team: Option<Team>,
    ) -> BTreeMap<u32, SpawnGroupAction> {
        self.instances.resolve_spawn_plan(map_id, boss_state, team)
    }

    pub fn instance_bindings(&self) -> &InstanceBindings {
        &self.instances
    }

    // Graveyards

    pub fn closest_graveyard(
        &self,
        location: &WorldLocation,
        team: Option<Team>,
        context: Option<&dyn ContextObject>,
        env: &ResolverEnv<'_>,
    ) -> Option<&WorldSafeLocsEntry> {
        self.graveyards.closest_graveyard(location, team, context, env)
    }

    pub fn add_graveyard_link(
        &mut self,
        safe_loc_id: u32,
        zone_id: u32,
        team: Option<Team>,
        sink: Option<&mut dyn GraveyardSink>,
    ) -> Result<(), GraveyardError> {
        self.graveyards.add_link(safe_loc_id, zone_id, team, sink)
    }

    pub fn remove_graveyard_link(
        &mut self,
        safe_loc_id: u32,
        zone_id: u32,
        sink: Option<&mut dyn GraveyardSink>,
    ) -> Result<GraveyardData, GraveyardError> {
        self.graveyards.remove_link(safe_loc_id, zone_id, sink)
    }

    pub fn find_graveyard_data(&self, safe_loc_id: u32, zone_id: u32) -> Option<&GraveyardData> {
        self.graveyards.find_graveyard_data(safe_loc_id, zone_id)
    }

    pub fn world_safe_loc(&self, id: u32) -> Option<&WorldSafeLocsEntry> {
        self.graveyards.world_safe_loc(id)
    }

    pub fn default_graveyard(&self, team: Option<Team>) -> Option<&WorldSafeLocsEntry> {
        self.graveyards.default_graveyard(team)
    }

    pub fn graveyards(&self) -> &GraveyardRegistry {
        &self.graveyards
    }

    pub(crate) fn graveyards_mut(&mut self) -> &mut GraveyardRegistry {
        &mut self.graveyards
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wc_core::{
        CellCoord, MapEntry, Position, SpawnKind, StandardConditionEvaluator,
    };
    use wc_spawn::{SpawnGroupMap, DEFAULT_SPAWN_GROUP};

    fn registry() -> WorldDataRegistry {
        let reference = StaticReferenceData::default()
            .with_map(MapEntry::new(0, "Eastern Kingdoms"))
            .with_map(MapEntry::new(1, "Kalimdor"))
            .with_phase(170, true);
        WorldDataRegistry::new(Arc::new(reference), ResolverSettings::default())
    }

    fn creature(id: u64, map: u32, x: f32) -> SpawnData {
        SpawnData::creature(
            id,
            map,
            Position::new(x, 10.0, 0.0),
            [Difficulty::NONE, Difficulty::HEROIC],
        )
    }

    #[test]
    fn register_and_deregister_keep_index_and_group_in_step() {
        let mut registry = registry();
        registry.spawn_groups_mut().register_template(20, "Camp", 0);

        let spawn = creature(1, 0, 100.0).with_group(20);
        let cell = spawn.cell().id();
        registry.register_spawn(spawn).unwrap();

        for difficulty in [Difficulty::NONE, Difficulty::HEROIC] {
            assert!(registry.cell_object_guids(0, difficulty, cell).creatures.contains(&1));
        }
        assert_eq!(registry.spawn_metadata_for_group(20).count(), 1);
        assert_eq!(registry.spawn_groups_for_map(0).collect::<Vec<_>>(), vec![20]);

        let removed = registry.deregister_spawn(SpawnKey::creature(1)).unwrap();
        assert_eq!(removed.meta.spawn_id, 1);
        for difficulty in [Difficulty::NONE, Difficulty::HEROIC] {
            assert!(registry.cell_object_guids(0, difficulty, cell).creatures.is_empty());
        }
        assert_eq!(registry.spawn_metadata_for_group(20).count(), 0);
        assert!(registry.creature_data(1).is_none());
    }

    #[test]
    fn removal_uses_recorded_difficulties() {
        let mut registry = registry();
        let spawn = creature(1, 0, 100.0);
        let cell = spawn.cell().id();
        registry.register_spawn(spawn).unwrap();

        if let Some(stored) = registry.spawns.get_mut(&SpawnKey::creature(1)) {
            stored.spawn_difficulties.clear();
        }
        registry.deregister_spawn(SpawnKey::creature(1)).unwrap();
        assert!(registry.cell_object_guids(0, Difficulty::HEROIC, cell).creatures.is_empty());
        assert_eq!(registry.grid().cell_count(), 0);
    }

    #[test]
    fn duplicate_spawn_is_rejected_without_side_effects() {
        let mut registry = registry();
        registry.register_spawn(creature(1, 0, 100.0)).unwrap();
        assert_eq!(
            registry.register_spawn(creature(1, 1, 500.0)),
            Err(SpawnError::DuplicateSpawn(SpawnKey::creature(1)))
        );
        assert_eq!(registry.creature_data(1).map(|s| s.meta.map_id), Some(0));
    }

    #[test]
    fn spawn_without_difficulties_is_rejected() {
        let mut registry = registry();
        registry.spawn_groups_mut().register_template(20, "Camp", 0);
        let spawn = SpawnData::creature(77, 0, Position::new(1.0, 2.0, 0.0), Vec::<Difficulty>::new())
            .with_group(20);

        assert_eq!(
            registry.register_spawn(spawn.clone()),
            Err(SpawnError::NoDifficulties(SpawnKey::creature(77)))
        );
        assert_eq!(
            registry.register_unindexed_spawn(spawn),
            Err(SpawnError::NoDifficulties(SpawnKey::creature(77)))
        );
        assert!(registry.creature_data(77).is_none());
        assert!(!registry.grid().is_placed(SpawnKey::creature(77)));
        assert_eq!(registry.spawn_metadata_for_group(20).count(), 0);
        assert_eq!(registry.spawn_group_data(20).map(|t| t.map), Some(SpawnGroupMap::Unbound));
    }

    #[test]
    fn conflicting_group_rejects_registration() {
        let mut registry = registry();
        registry.spawn_groups_mut().register_template(20, "Camp", 0);
        registry.register_spawn(creature(1, 0, 100.0).with_group(20)).unwrap();

        let result = registry.register_spawn(creature(2, 1, 100.0).with_group(20));
        assert!(matches!(
            result,
            Err(SpawnError::Group(SpawnGroupError::MapConflict { .. }))
        ));
        assert!(registry.creature_data(2).is_none());
        assert_eq!(registry.grid().placed_count(), 1);
        assert_eq!(
            registry.spawn_group_data(20).map(|t| t.map),
            Some(SpawnGroupMap::Bound(0))
        );
    }

    #[test]
    fn moving_between_groups() {
        let mut registry = registry();
        registry.spawn_groups_mut().register_template(20, "Camp", 0);
        registry.spawn_groups_mut().register_template(21, "Far camp", 0);
        registry.register_spawn(creature(1, 0, 100.0)).unwrap();
        registry.register_spawn(creature(2, 1, 100.0).with_group(21)).unwrap();

        registry.assign_spawn_to_group(SpawnKey::creature(1), 20).unwrap();
        assert_eq!(registry.creature_data(1).map(|s| s.meta.spawn_group_id), Some(20));

        // Group 21 is bound to map 1; the spawn stays in group 20.
        assert!(registry.assign_spawn_to_group(SpawnKey::creature(1), 21).is_err());
        assert_eq!(registry.creature_data(1).map(|s| s.meta.spawn_group_id), Some(20));
        assert_eq!(registry.spawn_metadata_for_group(20).count(), 1);

        registry
            .assign_spawn_to_group(SpawnKey::creature(1), DEFAULT_SPAWN_GROUP)
            .unwrap();
        assert_eq!(registry.spawn_metadata_for_group(20).count(), 0);
        assert_eq!(registry.spawn_metadata_for_group(DEFAULT_SPAWN_GROUP).count(), 0);
    }

    #[test]
    fn personal_phase_spawns_use_phase_buckets() {
        let mut registry = registry();
        let spawn = creature(1, 0, 100.0).with_phase(170);
        let cell = spawn.cell().id();
        registry.register_spawn(spawn).unwrap();

        assert!(registry.cell_object_guids(0, Difficulty::NONE, cell).is_empty());
        assert!(registry
            .cell_personal_object_guids(0, Difficulty::NONE, 170, cell)
            .creatures
            .contains(&1));
    }

    #[test]
    fn grid_can_be_toggled_for_stored_spawns() {
        let mut registry = registry();
        let spawn = SpawnData::game_object(9, 0, Position::new(0.0, 0.0, 0.0), [Difficulty::NONE]);
        let cell = CellCoord::from_xy(0.0, 0.0).id();
        registry.register_unindexed_spawn(spawn).unwrap();
        assert!(registry.cell_object_guids(0, Difficulty::NONE, cell).is_empty());

        assert!(registry.add_game_object_to_grid(9));
        assert!(registry.cell_object_guids(0, Difficulty::NONE, cell).game_objects.contains(&9));
        assert!(registry.remove_game_object_from_grid(9));
        assert!(!registry.remove_game_object_from_grid(9));
        assert!(!registry.add_creature_to_grid(9));
        assert_eq!(registry.game_object_data(9).map(|s| s.kind()), Some(SpawnKind::GameObject));
    }

    #[test]
    fn graveyard_operations_delegate() {
        let mut registry = registry();
        registry.graveyards_mut().add_safe_loc(WorldSafeLocsEntry {
            id: 4,
            location: WorldLocation::new(0, Position::new(0.0, 0.0, 0.0)),
        });
        registry.add_graveyard_link(4, 12, Some(Team::Alliance), None).unwrap();
        assert!(registry.find_graveyard_data(4, 12).is_some());
        assert_eq!(registry.default_graveyard(Some(Team::Alliance)).map(|e| e.id), Some(4));

        // No areas are defined, so every surface position is in an unknown zone.
        let evaluator = StandardConditionEvaluator;
        let env = registry.resolver_env(&evaluator);
        let location = WorldLocation::new(0, Position::new(5.0, 5.0, 0.0));
        assert_eq!(
            registry
                .closest_graveyard(&location, Some(Team::Alliance), None, &env)
                .map(|e| e.id),
            Some(4)
        );
        assert!(registry.closest_graveyard(&location, Some(Team::Horde), None, &env).is_none());

        registry.remove_graveyard_link(4, 12, None).unwrap();
        assert!(registry.world_safe_loc(4).is_some());
        assert!(registry.find_graveyard_data(4, 12).is_none());
    }
}
