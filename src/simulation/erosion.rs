//! Grid erosion and corruption spread
//!
//! Each stability pass wears non-sanctuary cells down toward the erosion
//! floor and grows their corruption in proportion to how unstable they
//! already are. The sanctuary is re-pinned on every pass.

use crate::core::config::EngineConfig;
use crate::core::types::unit;
use crate::spatial::grid::{CellType, GridCell};

/// Decay model for the world grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSimulator {
    pub erosion_step: f32,
    pub erosion_floor: f32,
    pub corruption_growth: f32,
}

impl GridSimulator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            erosion_step: config.erosion_step,
            erosion_floor: config.erosion_floor,
            corruption_growth: config.corruption_growth,
        }
    }

    /// Advance every cell by one stability pass
    ///
    /// Returns the number of non-sanctuary cells that were processed.
    pub fn advance(&self, cells: &mut [GridCell]) -> usize {
        let mut advanced = 0;
        for cell in cells.iter_mut() {
            if cell.cell_type == CellType::Sanctuary {
                pin_sanctuary(cell);
                continue;
            }
            self.erode(cell);
            advanced += 1;
        }
        advanced
    }

    fn erode(&self, cell: &mut GridCell) {
        let mut stability = cell.stability();
        let mut corruption = cell.corruption();

        // Erosion stops at the floor; only external stabilization goes lower
        if stability > self.erosion_floor {
            stability = (stability - self.erosion_step).max(0.0);
        }

        if corruption < 1.0 {
            corruption = (corruption + self.corruption_growth * (1.0 - stability)).min(1.0);
        }

        cell.stability_index = unit(stability);
        cell.corruption_level = unit(corruption);
    }
}

/// Sanctuary cells are always fully stable and clean
pub fn pin_sanctuary(cell: &mut GridCell) {
    cell.stability_index = 1.0;
    cell.corruption_level = 0.0;
}

/// External stabilizing action on a single cell
pub fn stabilize(cell: &mut GridCell, config: &EngineConfig) {
    if cell.cell_type == CellType::Sanctuary {
        pin_sanctuary(cell);
        return;
    }
    cell.stability_index = unit(config.stabilized_stability);
    cell.corruption_level = unit(config.stabilized_corruption);
}
