use bevy::log::LogPlugin;
use bevy::prelude::*;
use std::path::PathBuf;
use wc_core::{StandardConditionEvaluator, Team, WorldLocation};
use wc_world::{LastLoadReport, RegistryConfig, SharedRegistry, WcWorldPlugin, CONFIG_PATH};

fn main() {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_PATH));

    let mut app = App::new();
    app.add_plugins((MinimalPlugins, LogPlugin::default()));

    let config = match RegistryConfig::load_or_default(&config_path) {
        Ok(config) => config,
        Err(err) => {
            error!("cannot read {}: {}", config_path.display(), err);
            std::process::exit(1);
        }
    };

    app.add_plugins(WcWorldPlugin { config })
        .add_systems(PostStartup, log_registry_summary);
    app.finish();
    app.cleanup();
    app.update();
}

/// Print what was loaded and resolve a sample graveyard for each team.
fn log_registry_summary(shared: Res<SharedRegistry>, report: Res<LastLoadReport>) {
    let Some(report) = report.0.as_ref() else {
        warn!("no world data loaded");
        return;
    };
    let registry = shared.snapshot();
    info!(
        "registry ready: {} spawns in {} cells, {} spawn groups, {} graveyard links",
        registry.spawn_count(),
        registry.grid().cell_count(),
        report.spawn_groups,
        registry.graveyards().link_count()
    );

    let evaluator = StandardConditionEvaluator;
    let env = registry.resolver_env(&evaluator);
    let Some(probe) = registry
        .spawns()
        .min_by_key(|spawn| spawn.key())
        .map(|spawn| WorldLocation::new(spawn.meta.map_id, spawn.position))
    else {
        return;
    };
    for team in [Team::Alliance, Team::Horde] {
        match registry.closest_graveyard(&probe, Some(team), None, &env) {
            Some(entry) => info!(
                "{} graveyard for map {} ({:.1}, {:.1}): {}",
                team.name(),
                probe.map_id,
                probe.position.x,
                probe.position.y,
                entry.id
            ),
            None => info!("{} has no graveyard near map {}", team.name(), probe.map_id),
        }
    }
}
