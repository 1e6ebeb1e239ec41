//! Presentation adapter: text views over the farm session and toasts.
//!
//! Nothing here mutates the farm. Views are plain functions so a renderer,
//! a chat front-end or a test can call them directly.

pub mod hud;
pub mod toast;
pub mod tooltip;

use bevy::prelude::*;

use crate::farming::FarmUpdateSet;
use crate::shared::*;

pub use hud::{forecast_lines, status_line};
pub use toast::ToastLog;
pub use tooltip::{companion_tooltip, growth_stage, plot_info, GrowthStage, PlotInfo};

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ToastLog>()
            .add_event::<ToastEvent>()
            .add_event::<DayEndEvent>()
            .add_systems(
                Update,
                (
                    toast::handle_toast_events,
                    toast::expire_toasts,
                    hud::report_day_end,
                )
                    .after(FarmUpdateSet)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}
