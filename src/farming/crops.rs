//! Planting and the daily growth pass.

use std::collections::HashMap;

use crate::shared::*;
use super::companion::snapshot_bonuses;
use super::grid::PlotGrid;

// ─────────────────────────────────────────────────────────────────────────────
// Plant
// ─────────────────────────────────────────────────────────────────────────────

pub fn plant(
    grid: &mut PlotGrid,
    economy: &mut EconomyState,
    catalog: &PlantCatalog,
    pos: GridPosition,
    key: &str,
) -> Result<PlantOutcome, ActionError> {
    let plot = grid.get_mut(pos)?;
    if !plot.tilled {
        return Err(ActionError::NotTilled);
    }
    if plot.occupant.is_some() {
        return Err(ActionError::Occupied);
    }
    let species = catalog.lookup(key)?;
    let seeds_remaining = economy.take_seed(key)?;

    plot.occupant = Some(Planting::new(species.key.clone()));

    Ok(PlantOutcome {
        seeds_remaining,
        selection_cleared: seeds_remaining == 0,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Daily growth
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrowthReport {
    /// Plantings that gained at least one day of growth.
    pub grew: Vec<GridPosition>,
    /// Plantings that reached maturity during this pass.
    pub became_ready: Vec<GridPosition>,
    pub died: Vec<(GridPosition, SpeciesKey)>,
    pub anomalies: Vec<PlotAnomaly>,
}

/// Advance every planting by one day, visiting plots in row-major order.
pub fn advance_growth(
    grid: &mut PlotGrid,
    catalog: &PlantCatalog,
    rules: &CompanionRules,
    today: &WeatherDay,
) -> GrowthReport {
    let order: Vec<GridPosition> = grid.positions().collect();
    advance_growth_in_order(grid, catalog, rules, today, order)
}

/// Same as [`advance_growth`] with an explicit visiting order. Bonuses are
/// captured before any plot changes, so the order cannot affect the result.
pub fn advance_growth_in_order(
    grid: &mut PlotGrid,
    catalog: &PlantCatalog,
    rules: &CompanionRules,
    today: &WeatherDay,
    order: impl IntoIterator<Item = GridPosition>,
) -> GrowthReport {
    let bonuses = snapshot_bonuses(grid, catalog, rules);
    let mut report = GrowthReport::default();

    for pos in order {
        let Ok(plot) = grid.get_mut(pos) else {
            continue;
        };
        tick_plot(plot, pos, catalog, &bonuses, today, &mut report);
    }

    report
}

fn tick_plot(
    plot: &mut Plot,
    pos: GridPosition,
    catalog: &PlantCatalog,
    bonuses: &HashMap<GridPosition, CompanionBonus>,
    today: &WeatherDay,
    report: &mut GrowthReport,
) {
    if plot.occupant.is_none() {
        return;
    }
    if let Some(kind) = check_plot(plot, catalog) {
        report.anomalies.push(PlotAnomaly { pos, kind });
        *plot = Plot::default();
        return;
    }
    let Some(planting) = plot.occupant.as_mut() else {
        return;
    };
    let Some(species) = catalog.get(&planting.species) else {
        return;
    };

    if today.is_raining() {
        planting.watered = true;
    }

    if planting.watered {
        let speed = bonuses.get(&pos).map_or(1.0, |b| b.growth_speed);
        let increment = (speed * today.temperature_factor()).floor();
        let increment = increment.max(0.0) as u32;
        let was_ready = planting.ready;

        planting.growth_progress = planting
            .growth_progress
            .saturating_add(increment)
            .min(species.growth_time);
        planting.ready = planting.growth_progress == species.growth_time;

        if increment > 0 {
            report.grew.push(pos);
        }
        if planting.ready && !was_ready {
            report.became_ready.push(pos);
        }
    } else {
        planting.health = planting.health.saturating_sub(NEGLECT_DAMAGE);
    }

    if today.kind == WeatherKind::Stormy {
        planting.health = planting.health.saturating_sub(STORM_DAMAGE);
    }

    planting.watered = false;

    if planting.health == 0 {
        report.died.push((pos, planting.species.clone()));
        // Dead plants leave the soil tilled.
        plot.occupant = None;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Invariant checks
// ─────────────────────────────────────────────────────────────────────────────

/// Find the first invariant an occupied plot breaks, if any.
pub fn check_plot(plot: &Plot, catalog: &PlantCatalog) -> Option<AnomalyKind> {
    let planting = plot.occupant.as_ref()?;
    let Some(species) = catalog.get(&planting.species) else {
        return Some(AnomalyKind::UnknownSpecies(planting.species.clone()));
    };
    if !plot.tilled {
        return Some(AnomalyKind::UntilledOccupant);
    }
    if planting.health == 0 || planting.health > MAX_HEALTH {
        return Some(AnomalyKind::HealthOutOfRange(planting.health));
    }
    if planting.growth_progress > species.growth_time {
        return Some(AnomalyKind::GrowthOutOfRange {
            progress: planting.growth_progress,
            growth_time: species.growth_time,
        });
    }
    if planting.ready != (planting.growth_progress == species.growth_time) {
        return Some(AnomalyKind::ReadyMismatch);
    }
    None
}

/// Reset every plot that breaks an invariant to empty and untilled.
pub fn sanitize_grid(grid: &mut PlotGrid, catalog: &PlantCatalog) -> Vec<PlotAnomaly> {
    let positions: Vec<GridPosition> = grid.positions().collect();
    let mut anomalies = Vec::new();

    for pos in positions {
        let Ok(plot) = grid.get_mut(pos) else {
            continue;
        };
        if let Some(kind) = check_plot(plot, catalog) {
            *plot = Plot::default();
            anomalies.push(PlotAnomaly { pos, kind });
        }
    }

    anomalies
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> PlantCatalog {
        PlantCatalog::new(vec![
            PlantSpecies {
                key: "tomato".into(),
                id: 60,
                name: "Tomato".into(),
                family: Family::Solanaceae,
                emoji: String::new(),
                growth_time: 4,
                base_sell_price: 20,
                seed_cost: 7,
                water_needed: 3,
            },
            PlantSpecies {
                key: "basil".into(),
                id: 28,
                name: "Basil".into(),
                family: Family::Lamiaceae,
                emoji: String::new(),
                growth_time: 3,
                base_sell_price: 12,
                seed_cost: 4,
                water_needed: 2,
            },
        ])
        .unwrap()
    }

    fn rules() -> CompanionRules {
        CompanionRules::new(vec![CompanionRule {
            family: Family::Lamiaceae,
            helps: Helps::Families(vec![Family::Solanaceae]),
            bonus_factor: 1.0,
        }])
        .unwrap()
    }

    fn sunny() -> WeatherDay {
        WeatherDay {
            kind: WeatherKind::Sunny,
            temperature_f: 72.0,
        }
    }

    fn put(grid: &mut PlotGrid, pos: GridPosition, planting: Planting) {
        grid.set(
            pos,
            Plot {
                tilled: true,
                occupant: Some(planting),
            },
        )
        .unwrap();
    }

    fn planting_at(grid: &PlotGrid, pos: GridPosition) -> &Planting {
        grid.get(pos).unwrap().occupant.as_ref().unwrap()
    }

    #[test]
    fn test_plant_requires_tilled_empty_plot_and_seed() {
        let catalog = catalog();
        let mut grid = PlotGrid::new(4);
        let mut eco = EconomyState::default();
        eco.add_seeds("tomato", 2);
        let pos = GridPosition::new(1, 1);

        assert_eq!(
            plant(&mut grid, &mut eco, &catalog, pos, "tomato"),
            Err(ActionError::NotTilled)
        );
        grid.set(pos, Plot::tilled()).unwrap();

        assert!(matches!(
            plant(&mut grid, &mut eco, &catalog, pos, "kelp"),
            Err(ActionError::UnknownSpecies(_))
        ));
        assert_eq!(
            plant(&mut grid, &mut eco, &catalog, pos, "basil"),
            Err(ActionError::InsufficientSeedStock("basil".into()))
        );

        let outcome = plant(&mut grid, &mut eco, &catalog, pos, "tomato").unwrap();
        assert_eq!(outcome.seeds_remaining, 1);
        assert!(!outcome.selection_cleared);
        assert_eq!(planting_at(&grid, pos), &Planting::new("tomato"));

        assert_eq!(
            plant(&mut grid, &mut eco, &catalog, pos, "tomato"),
            Err(ActionError::Occupied)
        );
        assert_eq!(eco.seeds("tomato"), 1);
    }

    #[test]
    fn test_planting_last_seed_clears_selection() {
        let catalog = catalog();
        let mut grid = PlotGrid::new(4);
        let mut eco = EconomyState::default();
        eco.add_seeds("basil", 1);
        let pos = GridPosition::new(0, 0);
        grid.set(pos, Plot::tilled()).unwrap();

        let outcome = plant(&mut grid, &mut eco, &catalog, pos, "basil").unwrap();
        assert_eq!(outcome.seeds_remaining, 0);
        assert!(outcome.selection_cleared);
        assert!(!eco.inventory.contains_key("basil"));
    }

    #[test]
    fn test_watered_plant_grows_and_watered_resets() {
        let catalog = catalog();
        let rules = CompanionRules::default();
        let mut grid = PlotGrid::new(4);
        let pos = GridPosition::new(2, 2);
        let mut p = Planting::new("tomato");
        p.watered = true;
        put(&mut grid, pos, p);

        let report = advance_growth(&mut grid, &catalog, &rules, &sunny());
        assert_eq!(report.grew, vec![pos]);
        let planting = planting_at(&grid, pos);
        assert_eq!(planting.growth_progress, 1);
        assert_eq!(planting.health, 100);
        assert!(!planting.watered);
        assert!(!planting.ready);
    }

    #[test]
    fn test_unwatered_plant_loses_health() {
        let catalog = catalog();
        let mut grid = PlotGrid::new(4);
        let pos = GridPosition::new(0, 3);
        put(&mut grid, pos, Planting::new("tomato"));

        advance_growth(&mut grid, &catalog, &CompanionRules::default(), &sunny());
        let planting = planting_at(&grid, pos);
        assert_eq!(planting.health, 80);
        assert_eq!(planting.growth_progress, 0);
    }

    #[test]
    fn test_rain_waters_and_storm_damages() {
        let catalog = catalog();
        let rules = CompanionRules::default();
        let mut grid = PlotGrid::new(4);
        let pos = GridPosition::new(1, 1);
        put(&mut grid, pos, Planting::new("tomato"));

        let rainy = WeatherDay {
            kind: WeatherKind::Rainy,
            temperature_f: 70.0,
        };
        advance_growth(&mut grid, &catalog, &rules, &rainy);
        assert_eq!(planting_at(&grid, pos).growth_progress, 1);
        assert_eq!(planting_at(&grid, pos).health, 100);

        // Storms do not water: no growth, neglect plus storm damage.
        let fresh = GridPosition::new(3, 3);
        put(&mut grid, fresh, Planting::new("tomato"));
        let stormy = WeatherDay {
            kind: WeatherKind::Stormy,
            temperature_f: 70.0,
        };
        advance_growth(&mut grid, &catalog, &rules, &stormy);
        let planting = planting_at(&grid, pos);
        assert_eq!(planting.growth_progress, 1);
        assert_eq!(planting.health, 70);
        assert!(!planting.watered);
        let planting = planting_at(&grid, fresh);
        assert_eq!(planting.growth_progress, 0);
        assert_eq!(planting.health, 70);

        // Watering by hand on a stormy day still grows, storm still hurts.
        let mut p = Planting::new("tomato");
        p.watered = true;
        put(&mut grid, fresh, p);
        advance_growth(&mut grid, &catalog, &rules, &stormy);
        let planting = planting_at(&grid, fresh);
        assert_eq!(planting.growth_progress, 1);
        assert_eq!(planting.health, 90);
    }

    #[test]
    fn test_extreme_temperature_halves_growth_before_flooring() {
        let catalog = catalog();
        let rules = rules();
        let mut grid = PlotGrid::new(4);
        let tomato = GridPosition::new(1, 1);
        let mut p = Planting::new("tomato");
        p.watered = true;
        put(&mut grid, tomato, p);
        // Basil next door doubles tomato growth speed to 2.0.
        put(&mut grid, GridPosition::new(2, 1), Planting::new("basil"));

        let hot = WeatherDay {
            kind: WeatherKind::Sunny,
            temperature_f: 100.0,
        };
        advance_growth(&mut grid, &catalog, &rules, &hot);
        assert_eq!(planting_at(&grid, tomato).growth_progress, 1);

        // Without the companion, 1.0 * 0.5 floors to zero growth.
        let mut lone = PlotGrid::new(4);
        let mut p = Planting::new("tomato");
        p.watered = true;
        put(&mut lone, tomato, p);
        let report = advance_growth(&mut lone, &catalog, &rules, &hot);
        assert!(report.grew.is_empty());
        assert_eq!(planting_at(&lone, tomato).growth_progress, 0);
        assert_eq!(planting_at(&lone, tomato).health, 100);
    }

    #[test]
    fn test_growth_clamps_at_growth_time_and_marks_ready() {
        let catalog = catalog();
        let mut grid = PlotGrid::new(4);
        let pos = GridPosition::new(0, 0);
        let mut p = Planting::new("tomato");
        p.growth_progress = 3;
        p.watered = true;
        put(&mut grid, pos, p);
        // Basil doubles the speed, so 3 + 2 would overshoot.
        put(&mut grid, GridPosition::new(1, 0), Planting::new("basil"));

        let report = advance_growth(&mut grid, &catalog, &rules(), &sunny());
        let planting = planting_at(&grid, pos);
        assert_eq!(planting.growth_progress, 4);
        assert!(planting.ready);
        assert_eq!(report.became_ready, vec![pos]);
    }

    #[test]
    fn test_death_clears_occupant_but_keeps_tilled() {
        let catalog = catalog();
        let mut grid = PlotGrid::new(4);
        let pos = GridPosition::new(3, 3);
        let mut p = Planting::new("basil");
        p.health = 20;
        put(&mut grid, pos, p);

        let report = advance_growth(
            &mut grid,
            &catalog,
            &CompanionRules::default(),
            &sunny(),
        );
        assert_eq!(report.died, vec![(pos, "basil".to_string())]);
        let plot = grid.get(pos).unwrap();
        assert!(plot.occupant.is_none());
        assert!(plot.tilled);
    }

    #[test]
    fn test_unknown_species_is_reset_and_reported() {
        let catalog = catalog();
        let mut grid = PlotGrid::new(4);
        let pos = GridPosition::new(1, 2);
        put(&mut grid, pos, Planting::new("triffid"));

        let report = advance_growth(
            &mut grid,
            &catalog,
            &CompanionRules::default(),
            &sunny(),
        );
        assert_eq!(
            report.anomalies,
            vec![PlotAnomaly {
                pos,
                kind: AnomalyKind::UnknownSpecies("triffid".into())
            }]
        );
        assert_eq!(grid.get(pos).unwrap(), &Plot::default());
    }

    #[test]
    fn test_tick_result_does_not_depend_on_visit_order() {
        let catalog = catalog();
        let rules = rules();
        let mut grid = PlotGrid::new(5);
        for (x, y, key) in [(1, 1, "tomato"), (2, 1, "basil"), (1, 2, "tomato"), (3, 3, "basil")] {
            let mut p = Planting::new(key);
            p.watered = x == 1;
            put(&mut grid, GridPosition::new(x, y), p);
        }

        let mut forward = grid.clone();
        let mut backward = grid.clone();
        let order: Vec<_> = grid.positions().collect();
        let reversed: Vec<_> = order.iter().rev().copied().collect();

        advance_growth_in_order(&mut forward, &catalog, &rules, &sunny(), order);
        advance_growth_in_order(&mut backward, &catalog, &rules, &sunny(), reversed);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_sanitize_grid_resets_broken_plots() {
        let catalog = catalog();
        let mut grid = PlotGrid::new(3);
        let mut sick = Planting::new("tomato");
        sick.health = 150;
        put(&mut grid, GridPosition::new(0, 0), sick);
        let mut overgrown = Planting::new("basil");
        overgrown.growth_progress = 9;
        put(&mut grid, GridPosition::new(1, 0), overgrown);
        put(&mut grid, GridPosition::new(2, 0), Planting::new("basil"));
        let mut dead = Planting::new("tomato");
        dead.health = 0;
        put(&mut grid, GridPosition::new(0, 1), dead);

        let anomalies = sanitize_grid(&mut grid, &catalog);
        assert_eq!(anomalies.len(), 3);
        assert_eq!(anomalies[0].kind, AnomalyKind::HealthOutOfRange(150));
        assert_eq!(
            anomalies[1].kind,
            AnomalyKind::GrowthOutOfRange {
                progress: 9,
                growth_time: 3
            }
        );
        assert_eq!(
            anomalies[2],
            PlotAnomaly {
                pos: GridPosition::new(0, 1),
                kind: AnomalyKind::HealthOutOfRange(0)
            }
        );
        assert_eq!(grid.get(GridPosition::new(0, 0)).unwrap(), &Plot::default());
        assert_eq!(grid.get(GridPosition::new(0, 1)).unwrap(), &Plot::default());
        assert!(grid.get(GridPosition::new(2, 0)).unwrap().occupant.is_some());
    }
}
