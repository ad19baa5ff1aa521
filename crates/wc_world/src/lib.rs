use bevy::prelude::*;

pub mod config;
pub mod loader;
pub mod registry;
pub mod shared;

pub use config::{ConfigError, RegistryConfig, CONFIG_PATH};
pub use loader::{build_registry, stage_registry, LoadReport, WorldLoadError};
pub use registry::{SpawnError, WorldDataRegistry};
pub use shared::SharedRegistry;

/// Request a full rebuild of the registry from the configured files.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct ReloadWorldData;

/// Counts from the most recent successful load.
#[derive(Resource, Debug, Clone, Default)]
pub struct LastLoadReport(pub Option<LoadReport>);

/// World data plugin.
/// Loads the registry at startup and rebuilds it on [`ReloadWorldData`].
#[derive(Default)]
pub struct WcWorldPlugin {
    pub config: RegistryConfig,
}

impl Plugin for WcWorldPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone())
            .init_resource::<SharedRegistry>()
            .init_resource::<LastLoadReport>()
            .add_event::<ReloadWorldData>()
            .add_systems(Startup, load_world_data_system)
            .add_systems(Update, reload_world_data_system);
    }
}

/// Build a new registry off to the side and swap it in. On failure the
/// current registry stays published.
fn stage_and_publish(config: &RegistryConfig, shared: &SharedRegistry, last: &mut LastLoadReport) {
    match stage_registry(config) {
        Ok((registry, report)) => {
            shared.publish(registry);
            last.0 = Some(report);
        }
        Err(err) => error!("world data not loaded, keeping the current registry: {}", err),
    }
}

fn load_world_data_system(
    config: Res<RegistryConfig>,
    shared: Res<SharedRegistry>,
    mut last: ResMut<LastLoadReport>,
) {
    stage_and_publish(&config, &shared, &mut last);
}

fn reload_world_data_system(
    mut events: EventReader<ReloadWorldData>,
    config: Res<RegistryConfig>,
    shared: Res<SharedRegistry>,
    mut last: ResMut<LastLoadReport>,
) {
    if events.read().count() == 0 {
        return;
    }
    info!("reloading world data from {}", config.data_path.display());
    stage_and_publish(&config, &shared, &mut last);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::tempdir;
    use wc_core::{MapEntry, Position, StaticReferenceData};
    use wc_persistence::{save_reference_data, save_world_data, CreatureSpawnRow, WorldDataFile};

    fn creature_row(guid: u64) -> CreatureSpawnRow {
        CreatureSpawnRow {
            guid,
            entry: 68,
            map: 0,
            spawn_difficulties: vec![0],
            phase_use_flags: 0,
            phase_id: 0,
            phase_group: 0,
            position: Position::new(-8800.0, 640.0, 95.0),
            spawn_time_secs: 60,
            wander_distance: 0.0,
            movement_type: 0,
        }
    }

    fn write_files(dir: &Path, guids: &[u64]) -> RegistryConfig {
        let config = RegistryConfig {
            data_path: dir.join("world_data.ron"),
            reference_path: dir.join("reference.ron"),
            ..Default::default()
        };
        let reference = StaticReferenceData::default().with_map(MapEntry::new(0, "Eastern Kingdoms"));
        save_reference_data(&config.reference_path, &reference).unwrap();
        let rows = WorldDataFile {
            creatures: guids.iter().map(|&guid| creature_row(guid)).collect(),
            ..Default::default()
        };
        save_world_data(&config.data_path, &rows).unwrap();
        config
    }

    #[test]
    fn plugin_loads_at_startup_and_reloads_on_event() {
        let dir = tempdir().unwrap();
        let config = write_files(dir.path(), &[1, 2]);

        let mut app = App::new();
        app.add_plugins(WcWorldPlugin { config });
        app.update();

        let snapshot = app.world().resource::<SharedRegistry>().snapshot();
        assert_eq!(snapshot.spawn_count(), 2);
        assert_eq!(
            app.world().resource::<LastLoadReport>().0.as_ref().map(|r| r.creatures),
            Some(2)
        );

        write_files(dir.path(), &[3]);
        app.world_mut().send_event(ReloadWorldData);
        app.update();

        let reloaded = app.world().resource::<SharedRegistry>().snapshot();
        assert_eq!(reloaded.spawn_count(), 1);
        assert!(reloaded.creature_data(3).is_some());
        // The snapshot taken before the reload is untouched.
        assert_eq!(snapshot.spawn_count(), 2);
    }

    #[test]
    fn missing_files_leave_an_empty_registry() {
        let dir = tempdir().unwrap();
        let config = RegistryConfig {
            data_path: dir.path().join("absent.ron"),
            reference_path: dir.path().join("absent_reference.ron"),
            ..Default::default()
        };

        let mut app = App::new();
        app.add_plugins(WcWorldPlugin { config });
        app.update();

        assert_eq!(app.world().resource::<SharedRegistry>().snapshot().spawn_count(), 0);
        assert!(app.world().resource::<LastLoadReport>().0.is_none());
    }
}
