//! Plant database: species and companion rules, stored as RON.

use serde::Deserialize;

use crate::shared::*;

/// The bundled plant database.
pub const BUNDLED_PLANTS: &str = include_str!("../../assets/data/plants.ron");

#[derive(Debug, Clone, Deserialize)]
pub struct PlantDatabase {
    pub species: Vec<PlantSpecies>,
    pub companions: Vec<CompanionRule>,
}

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("could not parse RON: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid plant database: {0}")]
    Catalog(#[from] CatalogError),
    #[error("invalid farm config: {0}")]
    Config(String),
}

pub fn parse_plant_database(source: &str) -> Result<PlantDatabase, DataError> {
    Ok(ron::from_str(source)?)
}

/// Parse and index a plant database.
pub fn load_plants(source: &str) -> Result<(PlantCatalog, CompanionRules), DataError> {
    let db = parse_plant_database(source)?;
    let catalog = PlantCatalog::new(db.species)?;
    let rules = CompanionRules::new(db.companions)?;
    Ok((catalog, rules))
}

/// Parse a farm config override. Missing fields keep their defaults.
pub fn parse_config(source: &str) -> Result<FarmConfig, DataError> {
    let config: FarmConfig = ron::from_str(source)?;
    validate_config(&config)?;
    Ok(config)
}

/// Reject values the simulation cannot roll or index with.
pub fn validate_config(config: &FarmConfig) -> Result<(), DataError> {
    let table = &config.weather;
    if !table.has_finite_temperatures() {
        return Err(DataError::Config(format!(
            "temperature band {}..{} must be finite",
            table.temperature_min_f, table.temperature_max_f
        )));
    }
    if config.latitude.is_some_and(|lat| !lat.is_finite()) {
        return Err(DataError::Config("latitude must be finite".into()));
    }
    Ok(())
}
