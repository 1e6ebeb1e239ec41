//! Data layer: loads the plant database and opens the farm session.
//!
//! This plugin runs in OnEnter(GameState::Loading). It parses the bundled
//! plant database, builds the session from the `FarmConfig` resource,
//! registers the day observers, then transitions into GameState::Playing.
//!
//! No other domain needs to seed these resources. All domain plugins can
//! safely read `FarmSession` once GameState has advanced past Loading.

pub mod plants;

use std::sync::Arc;

use bevy::prelude::*;

use crate::save::{AutosaveObserver, JsonFileStore, SaveSettings};
use crate::session::{FarmRng, FarmSession};
use crate::shared::*;

pub use plants::{
    load_plants, parse_config, validate_config, DataError, PlantDatabase, BUNDLED_PLANTS,
};

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FarmConfig>()
            .add_systems(OnEnter(GameState::Loading), load_all_data);
    }
}

fn load_all_data(
    mut commands: Commands,
    config: Res<FarmConfig>,
    save_settings: Option<Res<SaveSettings>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    info!("[Data] Loading plant database…");

    let (catalog, rules) = match load_plants(BUNDLED_PLANTS) {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("[Data] {}", e);
            return;
        }
    };
    info!(
        "[Data]   Species loaded: {} across {} families, {} companion rules",
        catalog.len(),
        catalog.families().count(),
        rules.len()
    );

    if let Err(e) = validate_config(&config) {
        warn!("[Data] {}; using the default temperature band", e);
    }

    for key in config.starter_seeds.keys() {
        if catalog.get(key).is_none() {
            warn!("[Data] Starter seed '{}' is not in the plant database", key);
        }
    }

    let mut rng = FarmRng::from_seed(config.seed);
    let mut session = FarmSession::new(
        config.clone(),
        Arc::new(catalog),
        Arc::new(rules),
        &mut rng.0,
    );

    if let Some(settings) = save_settings.filter(|s| s.autosave) {
        session.add_observer(Box::new(AutosaveObserver::new(JsonFileStore::new(
            settings.path.clone(),
        ))));
    }

    info!(
        "[Data] Farm ready: {}x{} plots, biome {:?}",
        config.grid_size,
        config.grid_size,
        session.weather().biome()
    );

    commands.insert_resource(session);
    commands.insert_resource(rng);
    next_state.set(GameState::Playing);
}
