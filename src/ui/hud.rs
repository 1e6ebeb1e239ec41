use bevy::prelude::*;

use crate::calendar::weather::WeatherEngine;
use crate::economy::format_coins;
use crate::session::FarmSession;
use crate::shared::*;

fn weather_icon(kind: WeatherKind) -> &'static str {
    match kind {
        WeatherKind::Sunny => "☀️",
        WeatherKind::Cloudy => "☁️",
        WeatherKind::Rainy => "🌧️",
        WeatherKind::Stormy => "⛈️",
        WeatherKind::Foggy => "🌫️",
    }
}

/// One line per forecast day, starting with today.
pub fn forecast_lines(weather: &WeatherEngine) -> Vec<String> {
    weather
        .forecast()
        .iter()
        .enumerate()
        .map(|(i, day)| {
            let label = match i {
                0 => "Today".to_string(),
                1 => "Tomorrow".to_string(),
                n => format!("Day +{n}"),
            };
            let mut line = format!(
                "{label}: {} {} {:.0}°F",
                weather_icon(day.kind),
                day.kind.label(),
                day.temperature_f.round()
            );
            if day.is_raining() {
                line.push_str(" (auto-water)");
            }
            line
        })
        .collect()
}

pub fn status_line(session: &FarmSession) -> String {
    let calendar = session.calendar();
    let economy = session.economy();
    format!(
        "Day {} of {} | Energy {}/{} | {} | {} planted, {} tilled | {:?}",
        calendar.day,
        calendar.season.label(),
        economy.energy,
        MAX_ENERGY,
        format_coins(economy.coins),
        session.grid().count_planted(),
        session.grid().count_tilled(),
        session.weather().biome(),
    )
}

/// Log the farm status and the new forecast after each day ends.
pub fn report_day_end(mut day_end: EventReader<DayEndEvent>, session: Res<FarmSession>) {
    for _ in day_end.read() {
        info!("[HUD] {}", status_line(&session));
        if let Some(today) = forecast_lines(session.weather()).first() {
            info!("[HUD] {}", today);
        }
    }
}
