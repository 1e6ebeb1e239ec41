//! Shared components, resources, events, and states for the farm.
//!
//! This is the type contract. Every domain module imports from here.
//! No domain imports from any other domain directly; the session in
//! `crate::session` is the only place where domains meet.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE: top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const DEFAULT_GRID_SIZE: usize = 12;
pub const MAX_HEALTH: u32 = 100;
pub const MAX_ENERGY: u32 = 100;
/// Health lost by a planting that went a whole day without water.
pub const NEGLECT_DAMAGE: u32 = 20;
/// Extra health lost by every planting on a stormy day.
pub const STORM_DAMAGE: u32 = 10;
pub const DAYS_PER_SEASON: u32 = 30;
pub const FORECAST_DAYS: usize = 7;
/// Seeds returned by a lucky harvest.
pub const SEED_REFUND: u32 = 2;
pub const SEED_REFUND_CHANCE: f64 = 0.5;
/// Below this temperature (°F) growth is halved.
pub const COLD_THRESHOLD_F: f32 = 40.0;
/// Above this temperature (°F) growth is halved.
pub const HOT_THRESHOLD_F: f32 = 95.0;

pub type SpeciesKey = String;

// ═══════════════════════════════════════════════════════════════════════
// CALENDAR
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Season {
    #[default]
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub fn next(self) -> Self {
        match self {
            Season::Spring => Season::Summer,
            Season::Summer => Season::Fall,
            Season::Fall => Season::Winter,
            Season::Winter => Season::Spring,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Season::Spring => 0,
            Season::Summer => 1,
            Season::Fall => 2,
            Season::Winter => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Winter => "Winter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    /// Days elapsed since the farm was founded, starting at 1.
    pub day: u32,
    pub season: Season,
}

impl Default for Calendar {
    fn default() -> Self {
        Self {
            day: 1,
            season: Season::Spring,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// WEATHER
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeatherKind {
    Sunny,
    Cloudy,
    Rainy,
    Stormy,
    Foggy,
}

impl WeatherKind {
    /// Only rain waters every planted plot. Storms damage without watering.
    pub fn is_raining(self) -> bool {
        self == WeatherKind::Rainy
    }

    pub fn label(self) -> &'static str {
        match self {
            WeatherKind::Sunny => "Sunny",
            WeatherKind::Cloudy => "Cloudy",
            WeatherKind::Rainy => "Rainy",
            WeatherKind::Stormy => "Stormy",
            WeatherKind::Foggy => "Foggy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherDay {
    pub kind: WeatherKind,
    pub temperature_f: f32,
}

impl WeatherDay {
    pub fn is_raining(&self) -> bool {
        self.kind.is_raining()
    }

    /// Growth multiplier from temperature: halved outside the comfortable band.
    pub fn temperature_factor(&self) -> f32 {
        if self.temperature_f < COLD_THRESHOLD_F || self.temperature_f > HOT_THRESHOLD_F {
            0.5
        } else {
            1.0
        }
    }
}

/// Relative weights for each weather kind plus the temperature band.
/// Weights need not sum to 1; they are normalised when rolling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherTable {
    pub sunny: f32,
    pub cloudy: f32,
    pub rainy: f32,
    pub stormy: f32,
    pub foggy: f32,
    pub temperature_min_f: f32,
    pub temperature_max_f: f32,
}

impl Default for WeatherTable {
    fn default() -> Self {
        Self {
            sunny: 0.40,
            cloudy: 0.25,
            rainy: 0.20,
            stormy: 0.10,
            foggy: 0.05,
            temperature_min_f: 60.0,
            temperature_max_f: 90.0,
        }
    }
}

impl WeatherTable {
    /// A table that always produces `kind`.
    pub fn always(kind: WeatherKind) -> Self {
        let mut table = Self {
            sunny: 0.0,
            cloudy: 0.0,
            rainy: 0.0,
            stormy: 0.0,
            foggy: 0.0,
            ..Self::default()
        };
        *table.weight_mut(kind) = 1.0;
        table
    }

    /// Pin the temperature to a single value.
    pub fn with_temperature(mut self, temperature_f: f32) -> Self {
        self.temperature_min_f = temperature_f;
        self.temperature_max_f = temperature_f;
        self
    }

    pub fn has_finite_temperatures(&self) -> bool {
        self.temperature_min_f.is_finite() && self.temperature_max_f.is_finite()
    }

    pub fn weight(&self, kind: WeatherKind) -> f32 {
        match kind {
            WeatherKind::Sunny => self.sunny,
            WeatherKind::Cloudy => self.cloudy,
            WeatherKind::Rainy => self.rainy,
            WeatherKind::Stormy => self.stormy,
            WeatherKind::Foggy => self.foggy,
        }
    }

    fn weight_mut(&mut self, kind: WeatherKind) -> &mut f32 {
        match kind {
            WeatherKind::Sunny => &mut self.sunny,
            WeatherKind::Cloudy => &mut self.cloudy,
            WeatherKind::Rainy => &mut self.rainy,
            WeatherKind::Stormy => &mut self.stormy,
            WeatherKind::Foggy => &mut self.foggy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Biome {
    Tropical,
    Desert,
    #[default]
    Temperate,
    Arctic,
}

impl Biome {
    /// Classify a latitude in degrees. No location means temperate.
    pub fn from_latitude(latitude: Option<f64>) -> Self {
        let Some(lat) = latitude else {
            return Biome::Temperate;
        };
        let lat = lat.abs();
        if lat < 23.5 {
            Biome::Tropical
        } else if lat < 35.0 {
            Biome::Desert
        } else if lat < 60.0 {
            Biome::Temperate
        } else {
            Biome::Arctic
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLANTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Family {
    Asteraceae,
    Fabaceae,
    Lamiaceae,
    Apiaceae,
    Solanaceae,
    Brassicaceae,
    Rosaceae,
    Poaceae,
    Premium,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantSpecies {
    pub key: SpeciesKey,
    pub id: u32,
    pub name: String,
    pub family: Family,
    pub emoji: String,
    /// Days of watered growth to maturity. Always at least 1.
    pub growth_time: u32,
    pub base_sell_price: u32,
    pub seed_cost: u32,
    pub water_needed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Helps {
    /// Boosts every family, its own included.
    All,
    Families(Vec<Family>),
}

impl Helps {
    pub fn contains(&self, family: Family) -> bool {
        match self {
            Helps::All => true,
            Helps::Families(families) => families.contains(&family),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanionRule {
    pub family: Family,
    pub helps: Helps,
    pub bonus_factor: f32,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CatalogError {
    #[error("duplicate species key '{0}'")]
    DuplicateKey(SpeciesKey),
    #[error("duplicate species id {0}")]
    DuplicateId(u32),
    #[error("species '{0}' has a growth time of zero")]
    ZeroGrowthTime(SpeciesKey),
    #[error("more than one companion rule for {0}")]
    DuplicateRule(Family),
}

/// Read-only table of every plant species, indexed by key, numeric id,
/// and family. Built once at load time.
#[derive(Debug, Clone, Default)]
pub struct PlantCatalog {
    species: Vec<PlantSpecies>,
    by_key: HashMap<SpeciesKey, usize>,
    by_id: HashMap<u32, usize>,
    by_family: BTreeMap<Family, Vec<usize>>,
}

impl PlantCatalog {
    pub fn new(mut species: Vec<PlantSpecies>) -> Result<Self, CatalogError> {
        species.sort_by_key(|s| s.id);

        let mut by_key = HashMap::with_capacity(species.len());
        let mut by_id = HashMap::with_capacity(species.len());
        let mut by_family: BTreeMap<Family, Vec<usize>> = BTreeMap::new();

        for (idx, s) in species.iter().enumerate() {
            if s.growth_time == 0 {
                return Err(CatalogError::ZeroGrowthTime(s.key.clone()));
            }
            if by_key.insert(s.key.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateKey(s.key.clone()));
            }
            if by_id.insert(s.id, idx).is_some() {
                return Err(CatalogError::DuplicateId(s.id));
            }
            by_family.entry(s.family).or_default().push(idx);
        }

        Ok(Self {
            species,
            by_key,
            by_id,
            by_family,
        })
    }

    pub fn get(&self, key: &str) -> Option<&PlantSpecies> {
        self.by_key.get(key).map(|&idx| &self.species[idx])
    }

    pub fn get_by_id(&self, id: u32) -> Option<&PlantSpecies> {
        self.by_id.get(&id).map(|&idx| &self.species[idx])
    }

    pub fn lookup(&self, key: &str) -> Result<&PlantSpecies, ActionError> {
        self.get(key)
            .ok_or_else(|| ActionError::UnknownSpecies(key.to_string()))
    }

    /// Species of one family, ordered by id.
    pub fn by_family(&self, family: Family) -> impl Iterator<Item = &PlantSpecies> + '_ {
        self.by_family
            .get(&family)
            .into_iter()
            .flatten()
            .map(|&idx| &self.species[idx])
    }

    pub fn families(&self) -> impl Iterator<Item = Family> + '_ {
        self.by_family.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlantSpecies> {
        self.species.iter()
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}

/// Companion rules keyed by the family that gives the bonus.
#[derive(Debug, Clone, Default)]
pub struct CompanionRules {
    rules: HashMap<Family, CompanionRule>,
}

impl CompanionRules {
    pub fn new(rules: Vec<CompanionRule>) -> Result<Self, CatalogError> {
        let mut map = HashMap::with_capacity(rules.len());
        for rule in rules {
            let family = rule.family;
            if map.insert(family, rule).is_some() {
                return Err(CatalogError::DuplicateRule(family));
            }
        }
        Ok(Self { rules: map })
    }

    /// The factor a `source` neighbour grants to a `target` plant, if any.
    pub fn factor(&self, source: Family, target: Family) -> Option<f32> {
        self.rules
            .get(&source)
            .filter(|rule| rule.helps.contains(target))
            .map(|rule| rule.bonus_factor)
    }

    pub fn rule(&self, source: Family) -> Option<&CompanionRule> {
        self.rules.get(&source)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// FARM GRID
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The 8 Chebyshev neighbours, row by row. May fall outside the grid.
    pub fn neighbors(self) -> impl Iterator<Item = GridPosition> {
        (-1..=1).flat_map(move |dy| {
            (-1..=1).filter_map(move |dx| {
                if dx == 0 && dy == 0 {
                    None
                } else {
                    Some(GridPosition::new(self.x + dx, self.y + dy))
                }
            })
        })
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planting {
    pub species: SpeciesKey,
    pub growth_progress: u32,
    pub watered: bool,
    pub health: u32,
    pub ready: bool,
}

impl Planting {
    pub fn new(species: impl Into<SpeciesKey>) -> Self {
        Self {
            species: species.into(),
            growth_progress: 0,
            watered: false,
            health: MAX_HEALTH,
            ready: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Plot {
    pub tilled: bool,
    pub occupant: Option<Planting>,
}

impl Plot {
    pub fn tilled() -> Self {
        Self {
            tilled: true,
            occupant: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }
}

/// A plot that was reset because its stored state broke an invariant.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotAnomaly {
    pub pos: GridPosition,
    pub kind: AnomalyKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnomalyKind {
    UnknownSpecies(SpeciesKey),
    HealthOutOfRange(u32),
    GrowthOutOfRange { progress: u32, growth_time: u32 },
    ReadyMismatch,
    UntilledOccupant,
}

impl fmt::Display for PlotAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            AnomalyKind::UnknownSpecies(key) => {
                write!(f, "plot {} held unknown species '{}'", self.pos, key)
            }
            AnomalyKind::HealthOutOfRange(health) => {
                write!(f, "plot {} had health {} (max {})", self.pos, health, MAX_HEALTH)
            }
            AnomalyKind::GrowthOutOfRange { progress, growth_time } => write!(
                f,
                "plot {} had growth {}/{}",
                self.pos, progress, growth_time
            ),
            AnomalyKind::ReadyMismatch => {
                write!(f, "plot {} had a readiness flag that disagreed with growth", self.pos)
            }
            AnomalyKind::UntilledOccupant => {
                write!(f, "plot {} had a plant in untilled soil", self.pos)
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// COMPANION BONUS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusSource {
    pub neighbor_species: SpeciesKey,
    pub neighbor_family: Family,
    pub factor: f32,
    pub pos: GridPosition,
}

/// Stacked multipliers a plot receives from its neighbours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanionBonus {
    pub growth_speed: f32,
    pub health: f32,
    pub yield_multiplier: f32,
    pub pest_resistance: f32,
    pub sources: Vec<BonusSource>,
}

impl Default for CompanionBonus {
    fn default() -> Self {
        Self {
            growth_speed: 1.0,
            health: 1.0,
            yield_multiplier: 1.0,
            pest_resistance: 1.0,
            sources: Vec::new(),
        }
    }
}

impl CompanionBonus {
    pub fn is_neutral(&self) -> bool {
        self.sources.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// ECONOMY
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyState {
    pub energy: u32,
    pub coins: u32,
    /// Seed stock per species. A key is removed when its count reaches zero.
    pub inventory: BTreeMap<SpeciesKey, u32>,
}

impl Default for EconomyState {
    fn default() -> Self {
        Self {
            energy: MAX_ENERGY,
            coins: 0,
            inventory: BTreeMap::new(),
        }
    }
}

/// Lifetime counters for the farm. Persisted with the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FarmStats {
    pub plants_planted: u64,
    pub plants_harvested: u64,
    pub plants_lost: u64,
    pub total_coins_earned: u64,
}

// ═══════════════════════════════════════════════════════════════════════
// ERRORS
// ═══════════════════════════════════════════════════════════════════════

/// Why a player action was rejected. Nothing is mutated when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("plot ({x}, {y}) is outside the farm")]
    OutOfBounds { x: i32, y: i32 },
    #[error("this plot is already tilled")]
    AlreadyTilled,
    #[error("till the soil first")]
    NotTilled,
    #[error("something is already growing here")]
    Occupied,
    #[error("nothing is planted here")]
    EmptyPlot,
    #[error("already watered today")]
    AlreadyWatered,
    #[error("not enough energy (need {needed}, have {available})")]
    InsufficientEnergy { needed: u32, available: u32 },
    #[error("no {0} seeds left")]
    InsufficientSeedStock(SpeciesKey),
    #[error("unknown plant '{0}'")]
    UnknownSpecies(SpeciesKey),
    #[error("not ready to harvest yet")]
    NotReady,
    #[error("not enough coins (need {needed}, have {available})")]
    InsufficientCoins { needed: u32, available: u32 },
}

// ═══════════════════════════════════════════════════════════════════════
// CONFIG
// ═══════════════════════════════════════════════════════════════════════

/// Tunables for a new farm. Every field has a default, so a config file
/// only needs the values it overrides.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FarmConfig {
    pub grid_size: usize,
    pub seed: u64,
    /// Location of the farm in degrees; picks the biome.
    pub latitude: Option<f64>,
    pub starting_coins: u32,
    pub till_cost: u32,
    pub water_cost: u32,
    pub seed_pack_size: u32,
    pub starter_seeds: BTreeMap<SpeciesKey, u32>,
    pub weather: WeatherTable,
}

impl Default for FarmConfig {
    fn default() -> Self {
        let starter_seeds = [
            ("tomato", 10),
            ("carrot", 10),
            ("lettuce", 10),
            ("lavender", 5),
            ("ginseng", 2),
        ]
        .into_iter()
        .map(|(key, count)| (key.to_string(), count))
        .collect();

        Self {
            grid_size: DEFAULT_GRID_SIZE,
            seed: 0x00CA_4A00,
            latitude: None,
            starting_coins: 500,
            till_cost: 5,
            water_cost: 2,
            seed_pack_size: 5,
            starter_seeds,
            weather: WeatherTable::default(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════

/// A discrete player request against the farm.
#[derive(Debug, Clone, PartialEq)]
pub enum FarmAction {
    Till(GridPosition),
    Plant(GridPosition, SpeciesKey),
    Water(GridPosition),
    Harvest(GridPosition),
    WaterAll,
    HarvestAll,
    BuySeeds(SpeciesKey),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlantOutcome {
    pub seeds_remaining: u32,
    /// The species' seed stock ran out; the caller should clear its selection.
    pub selection_cleared: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HarvestOutcome {
    pub species: SpeciesKey,
    pub coins: u32,
    pub seeds_refunded: u32,
}

/// Result of a bulk action. Plots that failed are skipped, not fatal.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BulkOutcome {
    pub succeeded: Vec<GridPosition>,
    pub skipped: Vec<(GridPosition, ActionError)>,
    pub coins_earned: u32,
    pub seeds_refunded: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Tilled,
    Planted(PlantOutcome),
    Watered,
    Harvested(HarvestOutcome),
    Bulk(BulkOutcome),
    SeedsBought { species: SpeciesKey, stock: u32 },
}

#[derive(Event, Debug, Clone)]
pub struct FarmActionEvent {
    pub action: FarmAction,
}

#[derive(Event, Debug, Clone)]
pub struct ActionResultEvent {
    pub action: FarmAction,
    pub result: Result<ActionOutcome, ActionError>,
}

/// Player goes to bed: advance one day.
#[derive(Event, Debug, Clone)]
pub struct SleepEvent;

#[derive(Event, Debug, Clone)]
pub struct DayEndEvent {
    /// The new day number after advancing.
    pub day: u32,
    pub season: Season,
    pub weather: WeatherDay,
    pub plants_ready: usize,
    pub plants_lost: usize,
}

#[derive(Event, Debug, Clone)]
pub struct SeasonChangeEvent {
    pub new_season: Season,
}

#[derive(Event, Debug, Clone)]
pub struct ToastEvent {
    pub message: String,
    pub duration_secs: f32,
}

// ═══════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════
