//! Bevy adapter systems: player action requests and the sleep trigger.

use bevy::prelude::*;
use crate::session::{FarmRng, FarmSession};
use crate::shared::*;

// ─────────────────────────────────────────────────────────────────────────────
// Player actions
// ─────────────────────────────────────────────────────────────────────────────

pub fn handle_farm_actions(
    mut requests: EventReader<FarmActionEvent>,
    mut session: ResMut<FarmSession>,
    mut rng: ResMut<FarmRng>,
    mut results: EventWriter<ActionResultEvent>,
    mut toasts: EventWriter<ToastEvent>,
) {
    for request in requests.read() {
        let result = session.apply(&request.action, &mut rng.0);

        match &result {
            Ok(ActionOutcome::Harvested(h)) => {
                toasts.send(ToastEvent {
                    message: format!("Harvested {} for {} coins", h.species, h.coins),
                    duration_secs: 2.0,
                });
            }
            Ok(ActionOutcome::Planted(p)) if p.selection_cleared => {
                toasts.send(ToastEvent {
                    message: "Out of seeds for that plant".to_string(),
                    duration_secs: 2.0,
                });
            }
            Ok(ActionOutcome::Bulk(bulk)) if !bulk.succeeded.is_empty() => {
                debug!(
                    "[Farming] Bulk action: {} done, {} skipped",
                    bulk.succeeded.len(),
                    bulk.skipped.len()
                );
            }
            Ok(_) => {}
            Err(err) => {
                toasts.send(ToastEvent {
                    message: capitalize(&err.to_string()),
                    duration_secs: 2.0,
                });
            }
        }

        results.send(ActionResultEvent {
            action: request.action.clone(),
            result,
        });
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sleep / day end
// ─────────────────────────────────────────────────────────────────────────────

/// Each SleepEvent advances exactly one day.
pub fn handle_sleep(
    mut sleeps: EventReader<SleepEvent>,
    mut session: ResMut<FarmSession>,
    mut rng: ResMut<FarmRng>,
    mut day_end: EventWriter<DayEndEvent>,
    mut season_change: EventWriter<SeasonChangeEvent>,
    mut toasts: EventWriter<ToastEvent>,
) {
    for _ in sleeps.read() {
        let report = session.advance_day(&mut rng.0);

        for (pos, species) in &report.growth.died {
            toasts.send(ToastEvent {
                message: format!("Your {} at {} withered away", species, pos),
                duration_secs: 3.0,
            });
        }

        if let Some(new_season) = report.season_changed {
            season_change.send(SeasonChangeEvent { new_season });
        }

        day_end.send(DayEndEvent {
            day: report.day,
            season: report.season,
            weather: report.weather,
            plants_ready: report.growth.became_ready.len(),
            plants_lost: report.growth.died.len(),
        });
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
