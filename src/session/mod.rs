//! The farm session: one farm's complete state and the only entry point
//! for changing it.
//!
//! Player actions validate and apply through the farming and economy
//! helpers; `advance_day` runs the daily tick and then hands a report to
//! every registered [`TickObserver`] in registration order.

use std::sync::Arc;

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::calendar::weather::WeatherEngine;
use crate::economy;
use crate::farming::companion::compute_bonus;
use crate::farming::crops::{self, GrowthReport};
use crate::farming::grid::PlotGrid;
use crate::farming::{harvest, soil};
use crate::save::{FarmSnapshot, SaveError, SAVE_VERSION};
use crate::shared::*;

// ─────────────────────────────────────────────────────────────────────────────
// Observers
// ─────────────────────────────────────────────────────────────────────────────

/// Hook run after every day-advance, once the tick has fully applied.
pub trait TickObserver: Send + Sync {
    fn name(&self) -> &str;
    fn after_day(&mut self, session: &FarmSession, report: &DayReport);
}

/// Everything that happened during one day-advance.
#[derive(Debug, Clone, PartialEq)]
pub struct DayReport {
    /// Day number after advancing.
    pub day: u32,
    pub season: Season,
    /// The weather that applied to the day that just ended.
    pub weather: WeatherDay,
    pub season_changed: Option<Season>,
    pub growth: GrowthReport,
}

impl DayReport {
    pub fn summary(&self) -> String {
        format!(
            "day {} ({}) after {} {:.0}°F: {} grew, {} ready, {} lost",
            self.day,
            self.season.label(),
            self.weather.kind.label(),
            self.weather.temperature_f,
            self.growth.grew.len(),
            self.growth.became_ready.len(),
            self.growth.died.len(),
        )
    }
}

/// Seeded random source shared by the Bevy adapter systems.
#[derive(Resource)]
pub struct FarmRng(pub StdRng);

impl FarmRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Resource)]
pub struct FarmSession {
    catalog: Arc<PlantCatalog>,
    rules: Arc<CompanionRules>,
    config: FarmConfig,
    grid: PlotGrid,
    economy: EconomyState,
    calendar: Calendar,
    weather: WeatherEngine,
    stats: FarmStats,
    observers: Vec<Box<dyn TickObserver>>,
}

impl FarmSession {
    /// A brand new farm: empty grid, starter coins and seeds, day 1 of Spring.
    pub fn new(
        config: FarmConfig,
        catalog: Arc<PlantCatalog>,
        rules: Arc<CompanionRules>,
        rng: &mut impl Rng,
    ) -> Self {
        let biome = Biome::from_latitude(config.latitude);
        let weather = WeatherEngine::new(config.weather, biome, rng);
        Self {
            grid: PlotGrid::new(config.grid_size),
            economy: EconomyState::starter(&config),
            calendar: Calendar::default(),
            weather,
            stats: FarmStats::default(),
            observers: Vec::new(),
            catalog,
            rules,
            config,
        }
    }

    pub fn with_observer(mut self, observer: impl TickObserver + 'static) -> Self {
        self.add_observer(Box::new(observer));
        self
    }

    pub fn add_observer(&mut self, observer: Box<dyn TickObserver>) {
        info!("[Farming] Registered day observer '{}'", observer.name());
        self.observers.push(observer);
    }

    pub fn observer_names(&self) -> Vec<&str> {
        self.observers.iter().map(|o| o.name()).collect()
    }

    // ── Read access ─────────────────────────────────────────────────────

    pub fn catalog(&self) -> &PlantCatalog {
        &self.catalog
    }

    pub fn rules(&self) -> &CompanionRules {
        &self.rules
    }

    pub fn config(&self) -> &FarmConfig {
        &self.config
    }

    pub fn grid(&self) -> &PlotGrid {
        &self.grid
    }

    pub fn economy(&self) -> &EconomyState {
        &self.economy
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn weather(&self) -> &WeatherEngine {
        &self.weather
    }

    pub fn stats(&self) -> &FarmStats {
        &self.stats
    }

    pub fn companion_bonus(&self, pos: GridPosition) -> Result<CompanionBonus, ActionError> {
        self.grid.get(pos)?;
        Ok(compute_bonus(&self.grid, &self.catalog, &self.rules, pos))
    }

    // ── Player actions ──────────────────────────────────────────────────

    pub fn till(&mut self, pos: GridPosition) -> Result<(), ActionError> {
        soil::till(&mut self.grid, &mut self.economy, self.config.till_cost, pos)
    }

    pub fn plant(&mut self, pos: GridPosition, key: &str) -> Result<PlantOutcome, ActionError> {
        let outcome = crops::plant(&mut self.grid, &mut self.economy, &self.catalog, pos, key)?;
        self.stats.plants_planted += 1;
        Ok(outcome)
    }

    pub fn water(&mut self, pos: GridPosition) -> Result<(), ActionError> {
        soil::water(&mut self.grid, &mut self.economy, self.config.water_cost, pos)
    }

    pub fn water_all(&mut self) -> BulkOutcome {
        soil::water_all(&mut self.grid, &mut self.economy, self.config.water_cost)
    }

    pub fn harvest(
        &mut self,
        pos: GridPosition,
        rng: &mut impl Rng,
    ) -> Result<HarvestOutcome, ActionError> {
        let outcome = harvest::harvest(
            &mut self.grid,
            &mut self.economy,
            &self.catalog,
            &self.rules,
            pos,
            rng,
        )?;
        self.stats.plants_harvested += 1;
        self.stats.total_coins_earned += u64::from(outcome.coins);
        Ok(outcome)
    }

    pub fn harvest_all(&mut self, rng: &mut impl Rng) -> BulkOutcome {
        let (outcome, harvested) = harvest::harvest_all(
            &mut self.grid,
            &mut self.economy,
            &self.catalog,
            &self.rules,
            rng,
        );
        self.stats.plants_harvested += harvested.len() as u64;
        self.stats.total_coins_earned += u64::from(outcome.coins_earned);
        outcome
    }

    pub fn buy_seeds(&mut self, key: &str) -> Result<u32, ActionError> {
        economy::buy_seeds(
            &mut self.economy,
            &self.catalog,
            key,
            self.config.seed_pack_size,
        )
    }

    /// Dispatch a [`FarmAction`] to the matching operation.
    pub fn apply(
        &mut self,
        action: &FarmAction,
        rng: &mut impl Rng,
    ) -> Result<ActionOutcome, ActionError> {
        match action {
            FarmAction::Till(pos) => self.till(*pos).map(|()| ActionOutcome::Tilled),
            FarmAction::Plant(pos, key) => self.plant(*pos, key).map(ActionOutcome::Planted),
            FarmAction::Water(pos) => self.water(*pos).map(|()| ActionOutcome::Watered),
            FarmAction::Harvest(pos) => self.harvest(*pos, rng).map(ActionOutcome::Harvested),
            FarmAction::WaterAll => Ok(ActionOutcome::Bulk(self.water_all())),
            FarmAction::HarvestAll => Ok(ActionOutcome::Bulk(self.harvest_all(rng))),
            FarmAction::BuySeeds(key) => self.buy_seeds(key).map(|stock| {
                ActionOutcome::SeedsBought {
                    species: key.clone(),
                    stock,
                }
            }),
        }
    }

    // ── Daily tick ──────────────────────────────────────────────────────

    /// Advance one day: grow or decay every planting under today's weather,
    /// move the calendar, refill energy, roll a new forecast, then notify
    /// observers.
    pub fn advance_day(&mut self, rng: &mut impl Rng) -> DayReport {
        let today = self.weather.today();
        let growth = crops::advance_growth(
            &mut self.grid,
            &self.catalog,
            &self.rules,
            &today,
        );
        for anomaly in &growth.anomalies {
            warn!("[Farming] Reset {}", anomaly);
        }
        self.stats.plants_lost += growth.died.len() as u64;

        let season_changed = self.calendar.advance();
        self.economy.restore_energy();
        self.weather.regenerate(rng);

        let report = DayReport {
            day: self.calendar.day,
            season: self.calendar.season,
            weather: today,
            season_changed,
            growth,
        };
        info!("[Farming] Advanced to {}", report.summary());

        let mut observers = std::mem::take(&mut self.observers);
        for observer in observers.iter_mut() {
            observer.after_day(self, &report);
        }
        self.observers = observers;

        report
    }

    // ── Persistence ─────────────────────────────────────────────────────

    pub fn snapshot(&self) -> FarmSnapshot {
        FarmSnapshot {
            version: SAVE_VERSION,
            grid: self.grid.clone(),
            economy: self.economy.clone(),
            day: self.calendar.day,
            season: self.calendar.season,
            stats: self.stats.clone(),
        }
    }

    /// Replace the farm state with a loaded snapshot. Plots that break an
    /// invariant are reset to empty and untilled and returned for logging.
    /// A fresh forecast is rolled; snapshots do not carry weather.
    pub fn restore(
        &mut self,
        snapshot: FarmSnapshot,
        rng: &mut impl Rng,
    ) -> Result<Vec<PlotAnomaly>, SaveError> {
        if snapshot.version > SAVE_VERSION {
            return Err(SaveError::UnsupportedVersion {
                found: snapshot.version,
                supported: SAVE_VERSION,
            });
        }
        if !snapshot.grid.is_well_formed() {
            return Err(SaveError::Corrupt(format!(
                "grid of size {} does not hold {} plots",
                snapshot.grid.size(),
                snapshot.grid.size() * snapshot.grid.size()
            )));
        }

        let mut grid = snapshot.grid;
        let anomalies = crops::sanitize_grid(&mut grid, &self.catalog);
        for anomaly in &anomalies {
            warn!("[Save] Reset {}", anomaly);
        }

        let mut economy = snapshot.economy;
        if economy.energy > MAX_ENERGY {
            warn!(
                "[Save] Energy {} exceeds the maximum; restoring to {}",
                economy.energy, MAX_ENERGY
            );
            economy.energy = MAX_ENERGY;
        }
        economy.inventory.retain(|_, count| *count > 0);

        self.grid = grid;
        self.economy = economy;
        self.calendar = Calendar {
            day: snapshot.day.max(1),
            season: snapshot.season,
        };
        self.stats = snapshot.stats;
        self.weather.regenerate(rng);

        Ok(anomalies)
    }
}
