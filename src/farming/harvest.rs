//! Harvesting mature plants for coins and the occasional seed refund.

use rand::Rng;

use crate::shared::*;
use super::companion::compute_bonus;
use super::grid::PlotGrid;

/// Harvest the ready plant at `pos`. The plot is left empty and untilled.
///
/// Coins are `floor(base_sell_price * yield_multiplier)`, with the yield
/// multiplier taken from the plant's current neighbours. Half of all
/// harvests also return [`SEED_REFUND`] seeds of the same species.
pub fn harvest(
    grid: &mut PlotGrid,
    economy: &mut EconomyState,
    catalog: &PlantCatalog,
    rules: &CompanionRules,
    pos: GridPosition,
    rng: &mut impl Rng,
) -> Result<HarvestOutcome, ActionError> {
    let plot = grid.get(pos)?;
    let Some(planting) = plot.occupant.as_ref() else {
        return Err(ActionError::EmptyPlot);
    };
    if !planting.ready {
        return Err(ActionError::NotReady);
    }
    let species = catalog.lookup(&planting.species)?;

    let bonus = compute_bonus(grid, catalog, rules, pos);
    let coins = (species.base_sell_price as f32 * bonus.yield_multiplier).floor() as u32;
    let seeds_refunded = if rng.gen_bool(SEED_REFUND_CHANCE) {
        SEED_REFUND
    } else {
        0
    };
    let key = species.key.clone();

    economy.earn(coins);
    if seeds_refunded > 0 {
        economy.add_seeds(&key, seeds_refunded);
    }
    grid.set(pos, Plot::default())?;

    Ok(HarvestOutcome {
        species: key,
        coins,
        seeds_refunded,
    })
}

/// Harvest every planted plot in traversal order. Plots that are not ready
/// are recorded and skipped. Each harvest sees the grid as earlier harvests
/// in the same batch left it.
pub fn harvest_all(
    grid: &mut PlotGrid,
    economy: &mut EconomyState,
    catalog: &PlantCatalog,
    rules: &CompanionRules,
    rng: &mut impl Rng,
) -> (BulkOutcome, Vec<HarvestOutcome>) {
    let targets: Vec<GridPosition> = grid.plantings().map(|(pos, _)| pos).collect();
    let mut outcome = BulkOutcome::default();
    let mut harvested = Vec::new();

    for pos in targets {
        match harvest(grid, economy, catalog, rules, pos, rng) {
            Ok(h) => {
                outcome.succeeded.push(pos);
                outcome.coins_earned += h.coins;
                outcome.seeds_refunded += h.seeds_refunded;
                harvested.push(h);
            }
            Err(err) => outcome.skipped.push((pos, err)),
        }
    }

    (outcome, harvested)
}
