//! Companion planting: adjacency bonuses between plant families.
//!
//! Pure functions of a grid snapshot. A plot's bonus is the sum of the
//! factors granted by every occupied neighbour (8-way) whose family has a
//! rule that helps the plot's own family. Bonuses stack without a cap.

use std::collections::HashMap;

use crate::shared::*;
use super::grid::PlotGrid;

/// Stacked bonus for the plant at `pos`. Empty or out-of-range plots,
/// and plants of unknown species, get the neutral bonus.
pub fn compute_bonus(
    grid: &PlotGrid,
    catalog: &PlantCatalog,
    rules: &CompanionRules,
    pos: GridPosition,
) -> CompanionBonus {
    let mut bonus = CompanionBonus::default();

    let Some(subject) = grid
        .get(pos)
        .ok()
        .and_then(|plot| plot.occupant.as_ref())
        .and_then(|planting| catalog.get(&planting.species))
    else {
        return bonus;
    };

    for neighbor_pos in pos.neighbors() {
        let Ok(neighbor_plot) = grid.get(neighbor_pos) else {
            continue;
        };
        let Some(neighbor) = neighbor_plot
            .occupant
            .as_ref()
            .and_then(|planting| catalog.get(&planting.species))
        else {
            continue;
        };
        let Some(factor) = rules.factor(neighbor.family, subject.family) else {
            continue;
        };

        bonus.growth_speed += factor;
        bonus.health += factor * 0.5;
        bonus.yield_multiplier += factor * 0.75;
        bonus.pest_resistance += factor;
        bonus.sources.push(BonusSource {
            neighbor_species: neighbor.key.clone(),
            neighbor_family: neighbor.family,
            factor,
            pos: neighbor_pos,
        });
    }

    bonus
}

/// Bonuses for every occupied plot, taken from one consistent view of the
/// grid. The daily tick reads only from this map, never from the grid it
/// is mutating.
pub fn snapshot_bonuses(
    grid: &PlotGrid,
    catalog: &PlantCatalog,
    rules: &CompanionRules,
) -> HashMap<GridPosition, CompanionBonus> {
    grid.plantings()
        .map(|(pos, _)| (pos, compute_bonus(grid, catalog, rules, pos)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn species(key: &str, id: u32, family: Family) -> PlantSpecies {
        PlantSpecies {
            key: key.to_string(),
            id,
            name: key.to_string(),
            family,
            emoji: String::new(),
            growth_time: 4,
            base_sell_price: 20,
            seed_cost: 5,
            water_needed: 1,
        }
    }

    fn fixtures() -> (PlantCatalog, CompanionRules) {
        let catalog = PlantCatalog::new(vec![
            species("yarrow", 1, Family::Asteraceae),
            species("dill", 2, Family::Apiaceae),
            species("basil", 3, Family::Lamiaceae),
            species("ginseng", 4, Family::Premium),
        ])
        .unwrap();
        let rules = CompanionRules::new(vec![
            CompanionRule {
                family: Family::Asteraceae,
                helps: Helps::Families(vec![Family::Apiaceae]),
                bonus_factor: 0.25,
            },
            CompanionRule {
                family: Family::Premium,
                helps: Helps::All,
                bonus_factor: 0.1,
            },
        ])
        .unwrap();
        (catalog, rules)
    }

    fn put(grid: &mut PlotGrid, x: i32, y: i32, key: &str) {
        grid.set(
            GridPosition::new(x, y),
            Plot {
                tilled: true,
                occupant: Some(Planting::new(key)),
            },
        )
        .unwrap();
    }

    #[test]
    fn test_empty_plot_gets_neutral_bonus() {
        let (catalog, rules) = fixtures();
        let grid = PlotGrid::new(6);
        let bonus = compute_bonus(&grid, &catalog, &rules, GridPosition::new(2, 2));
        assert_eq!(bonus, CompanionBonus::default());
    }

    #[test]
    fn test_single_helping_neighbor() {
        let (catalog, rules) = fixtures();
        let mut grid = PlotGrid::new(6);
        put(&mut grid, 3, 3, "yarrow");
        put(&mut grid, 3, 4, "dill");

        let bonus = compute_bonus(&grid, &catalog, &rules, GridPosition::new(3, 4));
        assert!((bonus.growth_speed - 1.25).abs() < 1e-6);
        assert!((bonus.health - 1.125).abs() < 1e-6);
        assert!((bonus.yield_multiplier - 1.1875).abs() < 1e-6);
        assert!((bonus.pest_resistance - 1.25).abs() < 1e-6);
        assert_eq!(bonus.sources.len(), 1);
        assert_eq!(bonus.sources[0].neighbor_species, "yarrow");
        assert_eq!(bonus.sources[0].pos, GridPosition::new(3, 3));

        // Apiaceae has no rule that helps Asteraceae in these fixtures.
        let reverse = compute_bonus(&grid, &catalog, &rules, GridPosition::new(3, 3));
        assert!(reverse.is_neutral());
    }

    #[test]
    fn test_bonuses_stack_without_cap() {
        let (catalog, rules) = fixtures();
        let mut grid = PlotGrid::new(5);
        put(&mut grid, 2, 2, "dill");
        for pos in GridPosition::new(2, 2).neighbors() {
            put(&mut grid, pos.x, pos.y, "yarrow");
        }
        let bonus = compute_bonus(&grid, &catalog, &rules, GridPosition::new(2, 2));
        assert_eq!(bonus.sources.len(), 8);
        assert!((bonus.growth_speed - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_wildcard_family_helps_itself() {
        let (catalog, rules) = fixtures();
        let mut grid = PlotGrid::new(4);
        put(&mut grid, 0, 0, "ginseng");
        put(&mut grid, 1, 0, "ginseng");
        let bonus = compute_bonus(&grid, &catalog, &rules, GridPosition::new(0, 0));
        assert_eq!(bonus.sources.len(), 1);
        assert!((bonus.growth_speed - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_corner_plot_ignores_out_of_bounds_neighbors() {
        let (catalog, rules) = fixtures();
        let mut grid = PlotGrid::new(3);
        put(&mut grid, 0, 0, "dill");
        put(&mut grid, 1, 1, "yarrow");
        let bonus = compute_bonus(&grid, &catalog, &rules, GridPosition::new(0, 0));
        assert_eq!(bonus.sources.len(), 1);
    }

    #[test]
    fn test_snapshot_covers_only_occupied_plots() {
        let (catalog, rules) = fixtures();
        let mut grid = PlotGrid::new(4);
        put(&mut grid, 0, 0, "dill");
        put(&mut grid, 1, 0, "yarrow");
        let snap = snapshot_bonuses(&grid, &catalog, &rules);
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[&GridPosition::new(0, 0)].sources.len(), 1);
        assert!(snap[&GridPosition::new(1, 0)].is_neutral());
    }
}
