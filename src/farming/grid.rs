//! Fixed-size square grid of plots, stored row-major.

use serde::{Deserialize, Serialize};

use crate::shared::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotGrid {
    size: usize,
    plots: Vec<Plot>,
}

impl Default for PlotGrid {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_SIZE)
    }
}

impl PlotGrid {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            plots: vec![Plot::default(); size * size],
        }
    }

    /// Side length. The grid holds `size * size` plots.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn in_bounds(&self, pos: GridPosition) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.size && (pos.y as usize) < self.size
    }

    /// Deserialized grids may carry a plot list of the wrong length.
    pub fn is_well_formed(&self) -> bool {
        self.plots.len() == self.size * self.size
    }

    fn index(&self, pos: GridPosition) -> Result<usize, ActionError> {
        if self.in_bounds(pos) {
            Ok(pos.y as usize * self.size + pos.x as usize)
        } else {
            Err(ActionError::OutOfBounds { x: pos.x, y: pos.y })
        }
    }

    fn position(&self, index: usize) -> GridPosition {
        GridPosition::new((index % self.size) as i32, (index / self.size) as i32)
    }

    pub fn get(&self, pos: GridPosition) -> Result<&Plot, ActionError> {
        let idx = self.index(pos)?;
        self.plots
            .get(idx)
            .ok_or(ActionError::OutOfBounds { x: pos.x, y: pos.y })
    }

    pub fn get_mut(&mut self, pos: GridPosition) -> Result<&mut Plot, ActionError> {
        let idx = self.index(pos)?;
        self.plots
            .get_mut(idx)
            .ok_or(ActionError::OutOfBounds { x: pos.x, y: pos.y })
    }

    /// Replace the plot at `pos`, returning what was there.
    pub fn set(&mut self, pos: GridPosition, plot: Plot) -> Result<Plot, ActionError> {
        let slot = self.get_mut(pos)?;
        Ok(std::mem::replace(slot, plot))
    }

    /// Row-major traversal: y outer, x inner.
    pub fn iter(&self) -> impl Iterator<Item = (GridPosition, &Plot)> {
        self.plots
            .iter()
            .enumerate()
            .map(|(idx, plot)| (self.position(idx), plot))
    }

    pub fn positions(&self) -> impl Iterator<Item = GridPosition> + '_ {
        (0..self.plots.len()).map(|idx| self.position(idx))
    }

    pub fn for_each(&self, mut visitor: impl FnMut(GridPosition, &Plot)) {
        for (pos, plot) in self.iter() {
            visitor(pos, plot);
        }
    }

    /// Occupied plots in traversal order.
    pub fn plantings(&self) -> impl Iterator<Item = (GridPosition, &Planting)> {
        self.iter()
            .filter_map(|(pos, plot)| plot.occupant.as_ref().map(|p| (pos, p)))
    }

    pub fn count_planted(&self) -> usize {
        self.plots.iter().filter(|p| p.occupant.is_some()).count()
    }

    pub fn count_tilled(&self) -> usize {
        self.plots.iter().filter(|p| p.tilled).count()
    }
}
