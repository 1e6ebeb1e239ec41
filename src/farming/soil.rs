//! Soil actions: tilling and watering.

use crate::shared::*;
use super::grid::PlotGrid;

// ─────────────────────────────────────────────────────────────────────────────
// Till
// ─────────────────────────────────────────────────────────────────────────────

pub fn till(
    grid: &mut PlotGrid,
    economy: &mut EconomyState,
    cost: u32,
    pos: GridPosition,
) -> Result<(), ActionError> {
    let plot = grid.get_mut(pos)?;
    if plot.tilled {
        return Err(ActionError::AlreadyTilled);
    }
    if plot.occupant.is_some() {
        return Err(ActionError::Occupied);
    }
    economy.spend_energy(cost)?;
    plot.tilled = true;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Water
// ─────────────────────────────────────────────────────────────────────────────

pub fn water(
    grid: &mut PlotGrid,
    economy: &mut EconomyState,
    cost: u32,
    pos: GridPosition,
) -> Result<(), ActionError> {
    let plot = grid.get_mut(pos)?;
    let Some(planting) = plot.occupant.as_mut() else {
        return Err(ActionError::EmptyPlot);
    };
    if planting.watered {
        return Err(ActionError::AlreadyWatered);
    }
    economy.spend_energy(cost)?;
    planting.watered = true;
    Ok(())
}

/// Water every planted plot in traversal order. Plots that fail (already
/// watered, or the energy ran out) are recorded and skipped.
pub fn water_all(grid: &mut PlotGrid, economy: &mut EconomyState, cost: u32) -> BulkOutcome {
    let targets: Vec<GridPosition> = grid.plantings().map(|(pos, _)| pos).collect();
    let mut outcome = BulkOutcome::default();

    for pos in targets {
        match water(grid, economy, cost, pos) {
            Ok(()) => outcome.succeeded.push(pos),
            Err(err) => outcome.skipped.push((pos, err)),
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn economy(energy: u32) -> EconomyState {
        EconomyState {
            energy,
            ..Default::default()
        }
    }

    fn planted(grid: &mut PlotGrid, x: i32, y: i32) {
        grid.set(
            GridPosition::new(x, y),
            Plot {
                tilled: true,
                occupant: Some(Planting::new("basil")),
            },
        )
        .unwrap();
    }

    #[test]
    fn test_till_costs_energy() {
        let mut grid = PlotGrid::new(4);
        let mut eco = economy(100);
        till(&mut grid, &mut eco, 5, GridPosition::new(1, 1)).unwrap();
        assert!(grid.get(GridPosition::new(1, 1)).unwrap().tilled);
        assert_eq!(eco.energy, 95);
    }

    #[test]
    fn test_till_twice_fails_already_tilled() {
        let mut grid = PlotGrid::new(4);
        let mut eco = economy(100);
        let pos = GridPosition::new(2, 2);
        till(&mut grid, &mut eco, 5, pos).unwrap();
        assert_eq!(till(&mut grid, &mut eco, 5, pos), Err(ActionError::AlreadyTilled));
        assert_eq!(eco.energy, 95);
    }

    #[test]
    fn test_till_rejects_occupied_untilled_plot() {
        let mut grid = PlotGrid::new(4);
        let mut eco = economy(100);
        let pos = GridPosition::new(0, 0);
        grid.set(
            pos,
            Plot {
                tilled: false,
                occupant: Some(Planting::new("basil")),
            },
        )
        .unwrap();
        assert_eq!(till(&mut grid, &mut eco, 5, pos), Err(ActionError::Occupied));
    }

    #[test]
    fn test_till_without_energy_leaves_plot_untouched() {
        let mut grid = PlotGrid::new(4);
        let mut eco = economy(4);
        let pos = GridPosition::new(0, 0);
        assert!(matches!(
            till(&mut grid, &mut eco, 5, pos),
            Err(ActionError::InsufficientEnergy { .. })
        ));
        assert!(!grid.get(pos).unwrap().tilled);
        assert_eq!(eco.energy, 4);
    }

    #[test]
    fn test_till_out_of_bounds() {
        let mut grid = PlotGrid::new(4);
        let mut eco = economy(100);
        assert_eq!(
            till(&mut grid, &mut eco, 5, GridPosition::new(4, 0)),
            Err(ActionError::OutOfBounds { x: 4, y: 0 })
        );
        assert_eq!(eco.energy, 100);
    }

    #[test]
    fn test_water_rules() {
        let mut grid = PlotGrid::new(4);
        let mut eco = economy(100);
        let pos = GridPosition::new(1, 1);

        assert_eq!(water(&mut grid, &mut eco, 2, pos), Err(ActionError::EmptyPlot));

        planted(&mut grid, 1, 1);
        water(&mut grid, &mut eco, 2, pos).unwrap();
        assert_eq!(eco.energy, 98);
        assert!(grid.get(pos).unwrap().occupant.as_ref().unwrap().watered);

        assert_eq!(water(&mut grid, &mut eco, 2, pos), Err(ActionError::AlreadyWatered));
        assert_eq!(eco.energy, 98);
    }

    #[test]
    fn test_water_all_skips_failures_and_continues() {
        let mut grid = PlotGrid::new(4);
        planted(&mut grid, 0, 0);
        planted(&mut grid, 1, 0);
        planted(&mut grid, 2, 0);
        planted(&mut grid, 3, 0);
        grid.get_mut(GridPosition::new(1, 0))
            .unwrap()
            .occupant
            .as_mut()
            .unwrap()
            .watered = true;

        // Enough energy for two waterings.
        let mut eco = economy(4);
        let outcome = water_all(&mut grid, &mut eco, 2);

        assert_eq!(
            outcome.succeeded,
            vec![GridPosition::new(0, 0), GridPosition::new(2, 0)]
        );
        assert_eq!(outcome.skipped.len(), 2);
        assert_eq!(outcome.skipped[0], (GridPosition::new(1, 0), ActionError::AlreadyWatered));
        assert!(matches!(
            outcome.skipped[1],
            (_, ActionError::InsufficientEnergy { .. })
        ));
        assert_eq!(eco.energy, 0);
    }
}
