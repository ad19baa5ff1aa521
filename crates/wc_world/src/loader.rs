//! Building a registry from stored rows. Rows that fail validation are
//! logged and skipped; loading never fails on bad content.

use bevy::log::{error, info, warn};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use wc_core::{
    Condition, Difficulty, PhaseUseFlags, Position, ReferenceData, SpawnKind,
    StaticReferenceData, WorldLocation,
};
use wc_graveyard::{ResolverSettings, WorldSafeLocsEntry};
use wc_persistence::{
    load_reference_data, AreaTriggerSpawnRow, CreatureSpawnRow, DataIoError, DataSource,
    GameObjectSpawnRow, RonDataSource, WorldDataFile,
};
use wc_spawn::{
    AreaTriggerPayload, CreaturePayload, GameObjectPayload, InstanceSpawnGroupInfo, MovementType,
    SpawnData, SpawnKey, SpawnPayload, DEFAULT_SPAWN_GROUP, LEGACY_SPAWN_GROUP,
};

use crate::config::RegistryConfig;
use crate::registry::WorldDataRegistry;

#[derive(Debug, Error)]
pub enum WorldLoadError {
    #[error("failed to read world data: {0}")]
    Data(#[source] DataIoError),
    #[error("failed to read reference data: {0}")]
    Reference(#[source] DataIoError),
}

/// Counts from one load, for the summary log and for callers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub creatures: usize,
    pub game_objects: usize,
    pub area_triggers: usize,
    pub rejected_spawns: usize,
    pub spawn_groups: usize,
    pub pruned_groups: usize,
    pub group_members: usize,
    pub rejected_members: usize,
    pub instance_bindings: usize,
    pub rejected_bindings: usize,
    pub safe_locs: usize,
    pub graveyard_links: usize,
    pub rejected_graveyard_rows: usize,
}

/// Columns every spawn row shares.
struct CommonRow<'a> {
    kind: SpawnKind,
    guid: u64,
    map: u32,
    difficulties: &'a [u8],
    phase_use_flags: u8,
    phase_id: u32,
    phase_group: u32,
    position: Position,
}

impl<'a> From<&'a CreatureSpawnRow> for CommonRow<'a> {
    fn from(row: &'a CreatureSpawnRow) -> Self {
        Self {
            kind: SpawnKind::Creature,
            guid: row.guid,
            map: row.map,
            difficulties: &row.spawn_difficulties,
            phase_use_flags: row.phase_use_flags,
            phase_id: row.phase_id,
            phase_group: row.phase_group,
            position: row.position,
        }
    }
}

impl<'a> From<&'a GameObjectSpawnRow> for CommonRow<'a> {
    fn from(row: &'a GameObjectSpawnRow) -> Self {
        Self {
            kind: SpawnKind::GameObject,
            guid: row.guid,
            map: row.map,
            difficulties: &row.spawn_difficulties,
            phase_use_flags: row.phase_use_flags,
            phase_id: row.phase_id,
            phase_group: row.phase_group,
            position: row.position,
        }
    }
}

impl<'a> From<&'a AreaTriggerSpawnRow> for CommonRow<'a> {
    fn from(row: &'a AreaTriggerSpawnRow) -> Self {
        Self {
            kind: SpawnKind::AreaTrigger,
            guid: row.guid,
            map: row.map,
            difficulties: &row.spawn_difficulties,
            phase_use_flags: row.phase_use_flags,
            phase_id: row.phase_id,
            phase_group: row.phase_group,
            position: row.position,
        }
    }
}

/// Checks shared by every kind. Returns `None` when the row must be dropped.
fn validate_common<R>(row: CommonRow<'_>, payload: SpawnPayload, reference: &R) -> Option<SpawnData>
where
    R: ReferenceData + ?Sized,
{
    let kind = row.kind.name();
    if !reference.map_exists(row.map) {
        error!("{} {} spawned on non-existing map {}, skipped", kind, row.guid, row.map);
        return None;
    }
    if row.difficulties.is_empty() {
        error!("{} {} has no spawn difficulties, skipped", kind, row.guid);
        return None;
    }

    let mut difficulties = BTreeSet::new();
    for &raw in row.difficulties {
        let difficulty = Difficulty(raw);
        if reference.has_map_difficulty(row.map, difficulty) {
            difficulties.insert(difficulty);
        } else {
            warn!(
                "{} {} has difficulty {} not available on map {}, removing it",
                kind, row.guid, raw, row.map
            );
        }
    }
    if difficulties.is_empty() {
        error!("{} {} has no usable spawn difficulties, skipped", kind, row.guid);
        return None;
    }

    if !row.position.is_valid_map_coord() {
        error!(
            "{} {} has invalid coordinates ({}, {}, {}, {}), skipped",
            kind, row.guid, row.position.x, row.position.y, row.position.z, row.position.orientation
        );
        return None;
    }

    let phase_use_flags = PhaseUseFlags::from_bits_truncate(row.phase_use_flags);
    if phase_use_flags.bits() != row.phase_use_flags {
        warn!(
            "{} {} has unknown phase use flags 0x{:X}, removing them",
            kind, row.guid, row.phase_use_flags
        );
    }
    let mut phase_id = row.phase_id;
    let mut phase_group = row.phase_group;
    if phase_id != 0 && phase_group != 0 {
        warn!("{} {} has both a phase and a phase group, dropping the group", kind, row.guid);
        phase_group = 0;
    }
    if phase_id != 0 && !reference.phase_exists(phase_id) {
        warn!("{} {} uses non-existing phase {}, clearing it", kind, row.guid, phase_id);
        phase_id = 0;
    }
    if phase_group != 0 && !reference.phase_group_exists(phase_group) {
        warn!("{} {} uses non-existing phase group {}, clearing it", kind, row.guid, phase_group);
        phase_group = 0;
    }

    let mut spawn = SpawnData::new(row.guid, row.map, row.position, difficulties, payload);
    spawn.meta.phase_id = phase_id;
    spawn.meta.phase_group = phase_group;
    spawn.meta.phase_use_flags = phase_use_flags;
    if reference.map_entry(row.map).is_some_and(|map| map.transport) {
        spawn.meta.spawn_group_id = LEGACY_SPAWN_GROUP;
    }
    Some(spawn)
}

fn validate_creature<R>(row: &CreatureSpawnRow, reference: &R) -> Option<SpawnData>
where
    R: ReferenceData + ?Sized,
{
    let mut movement_type = MovementType::from_raw(row.movement_type).unwrap_or_else(|| {
        warn!(
            "creature {} has unknown movement type {}, using idle",
            row.guid, row.movement_type
        );
        MovementType::Idle
    });
    let mut wander_distance = row.wander_distance;
    if !wander_distance.is_finite() || wander_distance < 0.0 {
        warn!("creature {} has invalid wander distance {}, using 0", row.guid, wander_distance);
        wander_distance = 0.0;
    }
    if movement_type == MovementType::Random && wander_distance == 0.0 {
        warn!("creature {} wanders randomly with no distance, making it idle", row.guid);
        movement_type = MovementType::Idle;
    } else if movement_type == MovementType::Idle && wander_distance > 0.0 {
        warn!("creature {} is idle with a wander distance, clearing it", row.guid);
        wander_distance = 0.0;
    }

    let payload = SpawnPayload::Creature(CreaturePayload {
        entry: row.entry,
        spawn_time_secs: row.spawn_time_secs,
        wander_distance,
        movement_type,
    });
    validate_common(row.into(), payload, reference)
}

/// Rotations must be unit quaternions.
fn normalized_rotation(guid: u64, rotation: [f32; 4]) -> [f32; 4] {
    let length_sq: f32 = rotation.iter().map(|c| c * c).sum();
    if (length_sq - 1.0).abs() <= 1e-5 {
        return rotation;
    }
    if !length_sq.is_finite() || length_sq <= f32::EPSILON {
        warn!("game object {} has a degenerate rotation, using identity", guid);
        return [0.0, 0.0, 0.0, 1.0];
    }
    warn!("game object {} has a non-unit rotation, normalizing", guid);
    let length = length_sq.sqrt();
    rotation.map(|c| c / length)
}

fn validate_game_object<R>(row: &GameObjectSpawnRow, reference: &R) -> Option<SpawnData>
where
    R: ReferenceData + ?Sized,
{
    let payload = SpawnPayload::GameObject(GameObjectPayload {
        entry: row.entry,
        rotation: normalized_rotation(row.guid, row.rotation),
        spawn_time_secs: row.spawn_time_secs,
        anim_progress: row.anim_progress,
        go_state: row.state,
    });
    validate_common(row.into(), payload, reference)
}

fn validate_area_trigger<R>(row: &AreaTriggerSpawnRow, reference: &R) -> Option<SpawnData>
where
    R: ReferenceData + ?Sized,
{
    let payload = SpawnPayload::AreaTrigger(AreaTriggerPayload {
        entry: row.entry,
        is_custom: row.is_custom,
    });
    validate_common(row.into(), payload, reference)
}

/// Validate and register every spawn row. Validation runs in parallel;
/// registration keeps row order.
fn load_spawns(registry: &mut WorldDataRegistry, rows: &WorldDataFile, report: &mut LoadReport) {
    let reference = registry.reference_arc();
    let reference = reference.as_ref();

    let creatures: Vec<Option<SpawnData>> = rows
        .creatures
        .par_iter()
        .map(|row| validate_creature(row, reference))
        .collect();
    let game_objects: Vec<Option<SpawnData>> = rows
        .game_objects
        .par_iter()
        .map(|row| validate_game_object(row, reference))
        .collect();
    let area_triggers: Vec<Option<SpawnData>> = rows
        .area_triggers
        .par_iter()
        .map(|row| validate_area_trigger(row, reference))
        .collect();

    for spawn in creatures.into_iter().chain(game_objects).chain(area_triggers) {
        let Some(spawn) = spawn else {
            report.rejected_spawns += 1;
            continue;
        };
        let kind = spawn.kind();
        let key = spawn.key();
        let on_transport = spawn.meta.spawn_group_id == LEGACY_SPAWN_GROUP;
        let result = if on_transport {
            registry.register_unindexed_spawn(spawn)
        } else {
            registry.register_spawn(spawn)
        };
        match result {
            Ok(()) => match kind {
                SpawnKind::Creature => report.creatures += 1,
                SpawnKind::GameObject => report.game_objects += 1,
                SpawnKind::AreaTrigger => report.area_triggers += 1,
            },
            Err(err) => {
                error!("{} {} not loaded: {}", kind.name(), key.id, err);
                report.rejected_spawns += 1;
            }
        }
    }
}

fn load_spawn_groups(registry: &mut WorldDataRegistry, rows: &WorldDataFile, report: &mut LoadReport) {
    for row in &rows.spawn_group_templates {
        registry
            .spawn_groups_mut()
            .register_template(row.group_id, row.name.clone(), row.flags);
    }

    for row in &rows.spawn_group_members {
        let key = SpawnKey::new(row.spawn_type, row.spawn_id);
        let Some(spawn) = registry.spawn_data(key) else {
            error!(
                "spawn group {} lists non-existing {} {}, skipped",
                row.group_id,
                row.spawn_type.name(),
                row.spawn_id
            );
            report.rejected_members += 1;
            continue;
        };
        let current = spawn.meta.spawn_group_id;
        if current != DEFAULT_SPAWN_GROUP {
            error!(
                "{} {} is listed in spawn group {} but already belongs to group {}, skipped",
                row.spawn_type.name(),
                row.spawn_id,
                row.group_id,
                current
            );
            report.rejected_members += 1;
            continue;
        }
        match registry.assign_spawn_to_group(key, row.group_id) {
            Ok(()) => report.group_members += 1,
            Err(err) => {
                warn!(
                    "{} {} stays in the default group: {}",
                    row.spawn_type.name(),
                    row.spawn_id,
                    err
                );
                report.rejected_members += 1;
            }
        }
    }

    report.pruned_groups = registry.spawn_groups_mut().prune_unbound().len();
    report.spawn_groups = registry.spawn_groups().len();
}

fn load_instance_spawn_groups(
    registry: &mut WorldDataRegistry,
    rows: &WorldDataFile,
    report: &mut LoadReport,
) {
    for row in &rows.instance_spawn_groups {
        let info = InstanceSpawnGroupInfo::from_raw(
            row.instance_map_id,
            row.boss_state_id,
            row.boss_states,
            row.spawn_group_id,
            row.flags,
        );
        match registry.bind_instance_spawn_group(info) {
            Ok(()) => report.instance_bindings += 1,
            Err(err) => {
                error!(
                    "instance spawn group for map {} skipped: {}",
                    row.instance_map_id, err
                );
                report.rejected_bindings += 1;
            }
        }
    }
}

fn load_graveyards(registry: &mut WorldDataRegistry, rows: &WorldDataFile, report: &mut LoadReport) {
    for row in &rows.world_safe_locs {
        if !registry.reference().map_exists(row.map_id) {
            error!("world safe location {} is on non-existing map {}, skipped", row.id, row.map_id);
            report.rejected_graveyard_rows += 1;
            continue;
        }
        let entry = WorldSafeLocsEntry {
            id: row.id,
            location: WorldLocation::new(row.map_id, row.position),
        };
        if registry.graveyards_mut().add_safe_loc(entry).is_some() {
            warn!("world safe location {} is defined twice, keeping the last", row.id);
        }
    }
    report.safe_locs = registry.graveyards().safe_loc_count();

    for row in &rows.graveyard_zones {
        if !registry.reference().area_exists(row.zone_id) {
            error!(
                "graveyard {} is linked to non-existing zone {}, skipped",
                row.safe_loc_id, row.zone_id
            );
            report.rejected_graveyard_rows += 1;
            continue;
        }
        match registry.graveyards_mut().add_link(row.safe_loc_id, row.zone_id, None, None) {
            Ok(()) => report.graveyard_links += 1,
            Err(err) => {
                error!("graveyard link skipped: {}", err);
                report.rejected_graveyard_rows += 1;
            }
        }
    }

    for row in &rows.graveyard_conditions {
        let Some(condition) = Condition::from_row(row.kind, row.value1, row.value2) else {
            error!(
                "graveyard {} in zone {} has an invalid condition ({}, {}, {}), skipped",
                row.safe_loc_id, row.zone_id, row.kind, row.value1, row.value2
            );
            report.rejected_graveyard_rows += 1;
            continue;
        };
        if let Err(err) = registry
            .graveyards_mut()
            .attach_condition(row.safe_loc_id, row.zone_id, condition)
        {
            error!("graveyard condition skipped: {}", err);
            report.rejected_graveyard_rows += 1;
        }
    }
}

/// Build a complete registry from rows. Spawns land in the default group
/// first and members move into their groups once templates are loaded, so
/// instance bindings see groups already bound to maps. Graveyards are
/// independent of everything else.
pub fn build_registry(
    rows: &WorldDataFile,
    reference: Arc<StaticReferenceData>,
    settings: ResolverSettings,
) -> (WorldDataRegistry, LoadReport) {
    let mut registry = WorldDataRegistry::new(reference, settings);
    let mut report = LoadReport::default();

    load_spawns(&mut registry, rows, &mut report);
    load_spawn_groups(&mut registry, rows, &mut report);
    load_instance_spawn_groups(&mut registry, rows, &mut report);
    load_graveyards(&mut registry, rows, &mut report);

    info!(
        "loaded {} creatures, {} game objects, {} area triggers ({} rejected)",
        report.creatures, report.game_objects, report.area_triggers, report.rejected_spawns
    );
    info!(
        "loaded {} spawn groups ({} pruned), {} members, {} instance bindings",
        report.spawn_groups, report.pruned_groups, report.group_members, report.instance_bindings
    );
    info!(
        "loaded {} world safe locations and {} graveyard links",
        report.safe_locs, report.graveyard_links
    );
    (registry, report)
}

/// Read the configured files and build a registry that is not yet published.
pub fn stage_registry(config: &RegistryConfig) -> Result<(WorldDataRegistry, LoadReport), WorldLoadError> {
    let reference = load_reference_data(&config.reference_path).map_err(WorldLoadError::Reference)?;
    let rows = RonDataSource::new(&config.data_path)
        .load()
        .map_err(WorldLoadError::Data)?;
    Ok(build_registry(&rows, Arc::new(reference), config.graveyards.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wc_core::{AreaBounds, AreaEntry, CellCoord, MapEntry, Team};
    use wc_persistence::{
        GraveyardConditionRow, GraveyardZoneRow, InstanceSpawnGroupRow, SpawnGroupMemberRow,
        SpawnGroupTemplateRow, WorldSafeLocRow,
    };
    use wc_spawn::{EncounterState, SpawnGroupAction, SpawnGroupMap};

    fn reference() -> Arc<StaticReferenceData> {
        let mut dungeon = MapEntry::new(36, "Deadmines");
        dungeon.difficulties = vec![Difficulty::NORMAL, Difficulty::HEROIC];
        let mut ship = MapEntry::new(582, "Transport");
        ship.transport = true;
        Arc::new(
            StaticReferenceData::default()
                .with_map(MapEntry::new(0, "Eastern Kingdoms"))
                .with_map(dungeon)
                .with_map(ship)
                .with_area(AreaEntry {
                    id: 12,
                    name: "Elwynn Forest".into(),
                    map_id: 0,
                    parent_area: None,
                    bounds: Some(AreaBounds {
                        min_x: -10000.0,
                        min_y: -1000.0,
                        max_x: -8000.0,
                        max_y: 1000.0,
                    }),
                })
                .with_phase(169, false)
                .with_phase_group(2, vec![169]),
        )
    }

    fn creature_row(guid: u64, map: u32, difficulties: Vec<u8>) -> CreatureSpawnRow {
        CreatureSpawnRow {
            guid,
            entry: 299,
            map,
            spawn_difficulties: difficulties,
            phase_use_flags: 0,
            phase_id: 0,
            phase_group: 0,
            position: Position::new(-8900.0, -100.0, 80.0),
            spawn_time_secs: 120,
            wander_distance: 0.0,
            movement_type: 0,
        }
    }

    fn game_object_row(guid: u64, map: u32) -> GameObjectSpawnRow {
        GameObjectSpawnRow {
            guid,
            entry: 1731,
            map,
            spawn_difficulties: vec![0],
            phase_use_flags: 0,
            phase_id: 0,
            phase_group: 0,
            position: Position::new(-8950.0, -120.0, 80.0),
            rotation: [0.0, 0.0, 0.0, 1.0],
            spawn_time_secs: 300,
            anim_progress: 0,
            state: 1,
        }
    }

    fn build(rows: &WorldDataFile) -> (WorldDataRegistry, LoadReport) {
        build_registry(rows, reference(), ResolverSettings::default())
    }

    #[test]
    fn empty_rows_still_have_system_groups() {
        let (registry, report) = build(&WorldDataFile::default());
        assert_eq!(report, LoadReport {
            spawn_groups: 2,
            ..Default::default()
        });
        assert!(registry.spawn_group_data(DEFAULT_SPAWN_GROUP).is_some_and(|t| t.is_system()));
        assert!(registry.spawn_group_data(LEGACY_SPAWN_GROUP).is_some_and(|t| t.is_system()));
    }

    #[test]
    fn invalid_spawn_rows_are_skipped() {
        let mut rows = WorldDataFile::default();
        rows.creatures.push(creature_row(1, 0, vec![0]));
        rows.creatures.push(creature_row(2, 999, vec![0]));
        rows.creatures.push(creature_row(3, 0, vec![]));
        rows.creatures.push(creature_row(4, 36, vec![0]));
        let mut far = creature_row(5, 0, vec![0]);
        far.position.x = 20000.0;
        rows.creatures.push(far);
        rows.creatures.push(creature_row(1, 0, vec![0]));

        let (registry, report) = build(&rows);
        assert_eq!(report.creatures, 1);
        assert_eq!(report.rejected_spawns, 5);
        assert!(registry.creature_data(1).is_some());
        assert!(registry.creature_data(4).is_none());
    }

    #[test]
    fn unsupported_difficulties_are_dropped() {
        let mut rows = WorldDataFile::default();
        rows.creatures.push(creature_row(1, 36, vec![1, 2, 23]));

        let (registry, _) = build(&rows);
        let spawn = registry.creature_data(1).unwrap();
        assert_eq!(
            spawn.spawn_difficulties.iter().copied().collect::<Vec<_>>(),
            vec![Difficulty::NORMAL, Difficulty::HEROIC]
        );
    }

    #[test]
    fn phase_columns_are_corrected() {
        let mut rows = WorldDataFile::default();
        let mut both = creature_row(1, 0, vec![0]);
        both.phase_id = 169;
        both.phase_group = 2;
        both.phase_use_flags = 0xF0 | 1;
        let mut missing = creature_row(2, 0, vec![0]);
        missing.phase_id = 4242;
        rows.creatures.push(both);
        rows.creatures.push(missing);

        let (registry, _) = build(&rows);
        let both = &registry.creature_data(1).unwrap().meta;
        assert_eq!((both.phase_id, both.phase_group), (169, 0));
        assert_eq!(both.phase_use_flags, PhaseUseFlags::ALWAYS_VISIBLE);
        assert_eq!(registry.creature_data(2).unwrap().meta.phase_id, 0);
    }

    #[test]
    fn creature_movement_is_made_consistent() {
        let mut rows = WorldDataFile::default();
        let mut random = creature_row(1, 0, vec![0]);
        random.movement_type = 1;
        let mut idle = creature_row(2, 0, vec![0]);
        idle.wander_distance = 8.0;
        rows.creatures.push(random);
        rows.creatures.push(idle);

        let (registry, _) = build(&rows);
        let random = registry.creature_data(1).and_then(|s| s.creature_payload()).unwrap();
        assert_eq!(random.movement_type, MovementType::Idle);
        let idle = registry.creature_data(2).and_then(|s| s.creature_payload()).unwrap();
        assert_eq!(idle.wander_distance, 0.0);
    }

    #[test]
    fn game_object_rotation_is_normalized() {
        let mut rows = WorldDataFile::default();
        let mut row = game_object_row(7, 0);
        row.rotation = [0.0, 0.0, 2.0, 0.0];
        rows.game_objects.push(row);
        let mut zero = game_object_row(8, 0);
        zero.rotation = [0.0; 4];
        rows.game_objects.push(zero);

        let (registry, report) = build(&rows);
        assert_eq!(report.game_objects, 2);
        let rotation = registry.game_object_data(7).and_then(|s| s.game_object_payload()).unwrap().rotation;
        assert_eq!(rotation, [0.0, 0.0, 1.0, 0.0]);
        let rotation = registry.game_object_data(8).and_then(|s| s.game_object_payload()).unwrap().rotation;
        assert_eq!(rotation, [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn transport_spawns_are_legacy_and_unindexed() {
        let mut rows = WorldDataFile::default();
        let mut row = creature_row(1, 582, vec![0]);
        row.position = Position::new(1.0, 2.0, 3.0);
        rows.creatures.push(row);

        let (registry, report) = build(&rows);
        assert_eq!(report.creatures, 1);
        assert_eq!(registry.creature_data(1).unwrap().meta.spawn_group_id, LEGACY_SPAWN_GROUP);
        let cell = CellCoord::from_xy(1.0, 2.0).id();
        assert!(registry.cell_object_guids(582, Difficulty::NONE, cell).is_empty());
    }

    #[test]
    fn area_triggers_are_stored_but_not_indexed() {
        let mut rows = WorldDataFile::default();
        rows.area_triggers.push(AreaTriggerSpawnRow {
            guid: 3,
            entry: 12,
            is_custom: true,
            map: 0,
            spawn_difficulties: vec![0],
            phase_use_flags: 0,
            phase_id: 0,
            phase_group: 0,
            position: Position::new(0.0, 0.0, 0.0),
        });

        let (registry, report) = build(&rows);
        assert_eq!(report.area_triggers, 1);
        assert!(registry.spawn_data(SpawnKey::new(SpawnKind::AreaTrigger, 3)).is_some());
        assert_eq!(registry.grid().placed_count(), 0);
    }

    #[test]
    fn group_membership_binds_and_rejects_cross_map_members() {
        let mut rows = WorldDataFile::default();
        rows.creatures.push(creature_row(1, 0, vec![0]));
        rows.creatures.push(creature_row(2, 36, vec![1]));
        rows.game_objects.push(game_object_row(3, 0));
        rows.spawn_group_templates.push(SpawnGroupTemplateRow {
            group_id: 10,
            name: "Goldshire guards".into(),
            flags: 0,
        });
        rows.spawn_group_templates.push(SpawnGroupTemplateRow {
            group_id: 11,
            name: "Never used".into(),
            flags: 0,
        });
        for (kind, id) in [
            (SpawnKind::Creature, 1),
            (SpawnKind::Creature, 2),
            (SpawnKind::GameObject, 3),
            (SpawnKind::Creature, 404),
        ] {
            rows.spawn_group_members.push(SpawnGroupMemberRow {
                group_id: 10,
                spawn_type: kind,
                spawn_id: id,
            });
        }

        let (registry, report) = build(&rows);
        assert_eq!(report.group_members, 2);
        assert_eq!(report.rejected_members, 2);
        assert_eq!(report.pruned_groups, 1);
        assert!(registry.spawn_group_data(11).is_none());
        assert_eq!(registry.spawn_group_data(10).map(|t| t.map), Some(SpawnGroupMap::Bound(0)));
        assert_eq!(registry.spawn_metadata_for_group(10).count(), 2);
        assert_eq!(registry.creature_data(2).unwrap().meta.spawn_group_id, DEFAULT_SPAWN_GROUP);
    }

    #[test]
    fn instance_bindings_require_a_bound_group() {
        let mut rows = WorldDataFile::default();
        rows.creatures.push(creature_row(1, 36, vec![1]));
        rows.spawn_group_templates.push(SpawnGroupTemplateRow {
            group_id: 10,
            name: "Van Cleef's crew".into(),
            flags: 0,
        });
        rows.spawn_group_members.push(SpawnGroupMemberRow {
            group_id: 10,
            spawn_type: SpawnKind::Creature,
            spawn_id: 1,
        });
        rows.instance_spawn_groups.push(InstanceSpawnGroupRow {
            instance_map_id: 36,
            boss_state_id: 0,
            boss_states: EncounterState::Done.bit().bits(),
            spawn_group_id: 10,
            flags: 1,
        });
        rows.instance_spawn_groups.push(InstanceSpawnGroupRow {
            instance_map_id: 0,
            boss_state_id: 0,
            boss_states: 1,
            spawn_group_id: 10,
            flags: 1,
        });

        let (registry, report) = build(&rows);
        assert_eq!(report.instance_bindings, 1);
        assert_eq!(report.rejected_bindings, 1);
        assert_eq!(registry.instance_spawn_groups_for_map(36).len(), 1);

        let plan = registry.instance_spawn_plan(36, |_| EncounterState::Done, Some(Team::Horde));
        assert_eq!(plan.get(&10), Some(&SpawnGroupAction::Spawn));
        let plan = registry.instance_spawn_plan(36, |_| EncounterState::InProgress, None);
        assert_eq!(plan.get(&10), Some(&SpawnGroupAction::Despawn));
    }

    #[test]
    fn graveyard_rows_are_validated() {
        let mut rows = WorldDataFile::default();
        rows.world_safe_locs.push(WorldSafeLocRow {
            id: 4,
            map_id: 0,
            position: Position::new(-9100.0, 410.0, 93.0),
        });
        rows.world_safe_locs.push(WorldSafeLocRow {
            id: 5,
            map_id: 999,
            position: Position::new(0.0, 0.0, 0.0),
        });
        rows.graveyard_zones.push(GraveyardZoneRow { safe_loc_id: 4, zone_id: 12 });
        rows.graveyard_zones.push(GraveyardZoneRow { safe_loc_id: 4, zone_id: 12 });
        rows.graveyard_zones.push(GraveyardZoneRow { safe_loc_id: 4, zone_id: 77 });
        rows.graveyard_zones.push(GraveyardZoneRow { safe_loc_id: 5, zone_id: 12 });
        rows.graveyard_conditions.push(GraveyardConditionRow {
            zone_id: 12,
            safe_loc_id: 4,
            kind: wc_core::condition::CONDITION_TYPE_TEAM,
            value1: Team::Alliance.id(),
            value2: 0,
        });
        rows.graveyard_conditions.push(GraveyardConditionRow {
            zone_id: 12,
            safe_loc_id: 4,
            kind: wc_core::condition::CONDITION_TYPE_TEAM,
            value1: 12345,
            value2: 0,
        });

        let (registry, report) = build(&rows);
        assert_eq!(report.safe_locs, 1);
        assert_eq!(report.graveyard_links, 1);
        assert_eq!(report.rejected_graveyard_rows, 5);
        let data = registry.find_graveyard_data(4, 12).unwrap();
        assert_eq!(data.conditions, vec![Condition::Team(Team::Alliance)]);
    }
}
