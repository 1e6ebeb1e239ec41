//! Weather generator: categorical daily weather and a 7-day forecast.
//!
//! Each forecast day is rolled independently from the weight table, with a
//! uniform temperature drawn from the table's band. The forecast is rebuilt
//! once per day-advance and stays fixed until the next one.

use rand::Rng;

use crate::shared::*;

const ALL_KINDS: [WeatherKind; 5] = [
    WeatherKind::Sunny,
    WeatherKind::Cloudy,
    WeatherKind::Rainy,
    WeatherKind::Stormy,
    WeatherKind::Foggy,
];

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherEngine {
    table: WeatherTable,
    biome: Biome,
    forecast: Vec<WeatherDay>,
}

impl WeatherEngine {
    pub fn new(table: WeatherTable, biome: Biome, rng: &mut impl Rng) -> Self {
        let mut engine = Self {
            table,
            biome,
            forecast: Vec::new(),
        };
        engine.regenerate(rng);
        engine
    }

    pub fn biome(&self) -> Biome {
        self.biome
    }

    pub fn table(&self) -> &WeatherTable {
        &self.table
    }

    /// Conditions for the current day.
    pub fn today(&self) -> WeatherDay {
        self.forecast.first().copied().unwrap_or(WeatherDay {
            kind: WeatherKind::Sunny,
            temperature_f: (self.table.temperature_min_f + self.table.temperature_max_f) / 2.0,
        })
    }

    pub fn forecast(&self) -> &[WeatherDay] {
        &self.forecast
    }

    /// Replace the held forecast with a fresh one.
    pub fn regenerate(&mut self, rng: &mut impl Rng) {
        self.forecast = generate_forecast(&self.table, rng, FORECAST_DAYS);
    }
}

pub fn generate_forecast(table: &WeatherTable, rng: &mut impl Rng, days: usize) -> Vec<WeatherDay> {
    (0..days).map(|_| roll_day(table, rng)).collect()
}

pub fn roll_day(table: &WeatherTable, rng: &mut impl Rng) -> WeatherDay {
    let kind = roll_kind(table, rng);
    let temperature_f = roll_temperature(table, rng);
    WeatherDay {
        kind,
        temperature_f,
    }
}

fn roll_kind(table: &WeatherTable, rng: &mut impl Rng) -> WeatherKind {
    let total: f32 = ALL_KINDS.iter().map(|&k| table.weight(k).max(0.0)).sum();
    if total <= 0.0 {
        return WeatherKind::Sunny;
    }

    let roll: f32 = rng.gen::<f32>() * total; // 0.0 ..< total
    let mut cumulative = 0.0;
    for kind in ALL_KINDS {
        let weight = table.weight(kind).max(0.0);
        cumulative += weight;
        if weight > 0.0 && roll < cumulative {
            return kind;
        }
    }

    // Float rounding can leave `roll` a hair above the last threshold.
    ALL_KINDS
        .iter()
        .rev()
        .copied()
        .find(|&k| table.weight(k) > 0.0)
        .unwrap_or(WeatherKind::Sunny)
}

fn roll_temperature(table: &WeatherTable, rng: &mut impl Rng) -> f32 {
    let (lo, hi) = if table.has_finite_temperatures() {
        (table.temperature_min_f, table.temperature_max_f)
    } else {
        let fallback = WeatherTable::default();
        (fallback.temperature_min_f, fallback.temperature_max_f)
    };
    rng.gen_range(lo.min(hi)..=lo.max(hi))
}
