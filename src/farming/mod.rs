//! Farming domain: soil, planting, daily growth, companions, harvest.
//!
//! The submodules are plain functions over a [`grid::PlotGrid`]; the
//! plugin here only bridges Bevy events into the farm session.

use bevy::prelude::*;
use crate::shared::*;

pub mod companion;
pub mod crops;
pub mod events_handler;
pub mod grid;
pub mod harvest;
pub mod soil;

/// System set for everything that mutates the farm session, so other
/// plugins can order their readers after it.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct FarmUpdateSet;

pub struct FarmingPlugin;

impl Plugin for FarmingPlugin {
    fn build(&self, app: &mut App) {
        app
            // Events
            .add_event::<FarmActionEvent>()
            .add_event::<ActionResultEvent>()
            .add_event::<SleepEvent>()
            .add_event::<DayEndEvent>()
            .add_event::<SeasonChangeEvent>()
            .add_event::<ToastEvent>()
            // ------------------------------------------------------------------
            // Actions first, then the day-advance, so a frame that queues both
            // applies the actions to the day that is ending.
            // ------------------------------------------------------------------
            .add_systems(
                Update,
                (
                    events_handler::handle_farm_actions,
                    events_handler::handle_sleep,
                )
                    .chain()
                    .in_set(FarmUpdateSet)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}
