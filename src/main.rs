use std::collections::BTreeMap;
use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use cana_farm::calendar::CalendarPlugin;
use cana_farm::data::{parse_config, DataPlugin};
use cana_farm::farming::{FarmUpdateSet, FarmingPlugin};
use cana_farm::save::SavePlugin;
use cana_farm::session::FarmSession;
use cana_farm::shared::*;
use cana_farm::ui::{forecast_lines, status_line, UiPlugin};

/// One season of play, then exit.
const DAYS_TO_PLAY: u32 = DAYS_PER_SEASON;

/// The 3×3 bed the autoplayer keeps planted.
const BED: [(i32, i32); 9] = [
    (4, 4), (5, 4), (6, 4),
    (4, 5), (5, 5), (6, 5),
    (4, 6), (5, 6), (6, 6),
];

/// Preference order when choosing what to plant.
const PLANTING_ORDER: [&str; 4] = ["tomato", "carrot", "lettuce", "lavender"];

fn main() {
    let config = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|src| parse_config(&src).map_err(|e| e.to_string()))
        {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Could not load config {path}: {e}");
                std::process::exit(1);
            }
        },
        None => FarmConfig::default(),
    };

    App::new()
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_millis(10))),
        )
        .add_plugins(LogPlugin::default())
        .add_plugins(StatesPlugin)
        // Game state
        .init_state::<GameState>()
        .insert_resource(config)
        // Domain plugins
        .add_plugins(CalendarPlugin)
        .add_plugins(FarmingPlugin)
        .add_plugins(UiPlugin)
        .add_plugins(SavePlugin)
        // Data loading
        .add_plugins(DataPlugin)
        .add_systems(
            Update,
            autoplay
                .before(FarmUpdateSet)
                .run_if(in_state(GameState::Playing)),
        )
        .run();
}

/// A simple scripted farmer: keeps the bed planted, harvests what is ripe,
/// waters the rest, restocks seeds, then sleeps. One day per frame.
fn autoplay(
    session: Res<FarmSession>,
    mut actions: EventWriter<FarmActionEvent>,
    mut sleep: EventWriter<SleepEvent>,
    mut exit: EventWriter<AppExit>,
    mut days_played: Local<u32>,
) {
    if *days_played >= DAYS_TO_PLAY {
        info!("[Autoplay] Finished: {}", status_line(&session));
        let stats = session.stats();
        info!(
            "[Autoplay] Planted {}, harvested {}, lost {}, earned {} coins",
            stats.plants_planted,
            stats.plants_harvested,
            stats.plants_lost,
            stats.total_coins_earned
        );
        exit.send(AppExit::Success);
        return;
    }

    if *days_played == 0 {
        for line in forecast_lines(session.weather()) {
            info!("[Autoplay] {}", line);
        }
    }

    let mut stock: BTreeMap<&str, u32> = PLANTING_ORDER
        .iter()
        .map(|&key| (key, session.economy().seeds(key)))
        .collect();

    let mut send = |action: FarmAction| {
        actions.send(FarmActionEvent { action });
    };

    send(FarmAction::HarvestAll);

    for (x, y) in BED {
        let pos = GridPosition::new(x, y);
        let Ok(plot) = session.grid().get(pos) else {
            continue;
        };
        if plot.occupant.is_some() {
            continue;
        }
        if !plot.tilled {
            send(FarmAction::Till(pos));
        }
        let choice = PLANTING_ORDER
            .iter()
            .copied()
            .find(|key| stock.get(key).copied().unwrap_or(0) > 0);
        if let Some(key) = choice {
            if let Some(count) = stock.get_mut(key) {
                *count -= 1;
            }
            send(FarmAction::Plant(pos, key.to_string()));
        }
    }

    send(FarmAction::WaterAll);

    if session.economy().seeds("tomato") < 3 && session.economy().coins > 100 {
        send(FarmAction::BuySeeds("tomato".to_string()));
    }

    sleep.send(SleepEvent);
    *days_played += 1;
}
