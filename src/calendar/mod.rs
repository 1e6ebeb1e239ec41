//! Calendar domain: day counter, season rotation and weather.
//!
//! The calendar only moves when the farm session advances a day. Seasons
//! rotate Spring → Summer → Fall → Winter every [`DAYS_PER_SEASON`] days.

pub mod weather;

use bevy::prelude::*;

use crate::shared::*;

impl Calendar {
    /// Move to the next day. Returns the new season when one begins.
    pub fn advance(&mut self) -> Option<Season> {
        self.day += 1;
        if self.day % DAYS_PER_SEASON == 0 {
            self.season = self.season.next();
            Some(self.season)
        } else {
            None
        }
    }
}

pub struct CalendarPlugin;

impl Plugin for CalendarPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SeasonChangeEvent>()
            .add_event::<ToastEvent>()
            .add_systems(
                Update,
                announce_season_change.run_if(in_state(GameState::Playing)),
            );
    }
}

fn announce_season_change(
    mut season_events: EventReader<SeasonChangeEvent>,
    mut toasts: EventWriter<ToastEvent>,
) {
    for event in season_events.read() {
        info!("[Calendar] {} has begun", event.new_season.label());
        toasts.send(ToastEvent {
            message: format!("{} has arrived!", event.new_season.label()),
            duration_secs: 4.0,
        });
    }
}
