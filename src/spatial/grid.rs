//! The world grid: a fixed square of cells centered on the sanctuary
//!
//! Cells are addressed by integer coordinates `(x, z)` in
//! `-radius..=radius`. Cell `(0, 0)` is centered on the world origin.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::config::EngineConfig;
use crate::core::types::{unit, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CellType {
    /// The single pinned cell at the origin
    Sanctuary,
    SafeZone,
    Wilderness,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Biome {
    City,
    Forest,
    Mountain,
    Plains,
}

/// Biome of a cell, derived from its coordinates alone
///
/// Stable under recomputation, so it never needs its own random draw.
pub fn biome_for_cell(x: i32, z: i32) -> Biome {
    if x == 0 && z == 0 {
        return Biome::City;
    }
    let raw = ((x as f64) * 12.9898 + (z as f64) * 78.233).sin() * 43758.5453;
    let value = raw.abs() % 1.0;
    if value < 0.35 {
        Biome::Forest
    } else if value < 0.60 {
        Biome::Mountain
    } else {
        Biome::Plains
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub x: i32,
    pub z: i32,
    pub cell_type: CellType,
    pub biome: Biome,
    /// 0.0 (collapsed) - 1.0 (fully stable)
    pub stability_index: f32,
    /// 0.0 (clean) - 1.0 (saturated)
    pub corruption_level: f32,
    pub last_invasion: Option<DateTime<Utc>>,
}

impl GridCell {
    pub fn new(x: i32, z: i32, config: &EngineConfig) -> Self {
        let cell_type = classify(x, z, config.safe_zone_radius);
        let (stability_index, corruption_level) = match cell_type {
            CellType::Sanctuary => (1.0, 0.0),
            CellType::SafeZone => (
                config.safe_zone_initial_stability,
                config.safe_zone_initial_corruption,
            ),
            CellType::Wilderness => (
                config.wilderness_initial_stability,
                config.wilderness_initial_corruption,
            ),
        };
        Self {
            x,
            z,
            cell_type,
            biome: biome_for_cell(x, z),
            stability_index,
            corruption_level,
            last_invasion: None,
        }
    }

    /// Stability clamped into [0, 1]
    pub fn stability(&self) -> f32 {
        unit(self.stability_index)
    }

    /// Corruption clamped into [0, 1]
    pub fn corruption(&self) -> f32 {
        unit(self.corruption_level)
    }

    /// Chebyshev distance from the origin, in cells
    pub fn ring(&self) -> i32 {
        self.x.abs().max(self.z.abs())
    }

    /// World-space center of the cell
    pub fn center(&self, cell_size: f32) -> Position {
        Position::new(self.x as f32 * cell_size, self.z as f32 * cell_size)
    }
}

fn classify(x: i32, z: i32, safe_zone_radius: i32) -> CellType {
    if x == 0 && z == 0 {
        CellType::Sanctuary
    } else if x.abs().max(z.abs()) <= safe_zone_radius {
        CellType::SafeZone
    } else {
        CellType::Wilderness
    }
}

/// Dense square grid of cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldGrid {
    pub radius: i32,
    pub cell_size: f32,
    cells: Vec<GridCell>,
}

impl WorldGrid {
    /// Create the full grid covering the configured extent
    pub fn new(config: &EngineConfig) -> Self {
        let radius = config.grid_radius.max(0);
        let side = (2 * radius + 1) as usize;
        let mut cells = Vec::with_capacity(side * side);
        for x in -radius..=radius {
            for z in -radius..=radius {
                cells.push(GridCell::new(x, z, config));
            }
        }
        Self {
            radius,
            cell_size: config.cell_size,
            cells,
        }
    }

    #[inline]
    fn index(&self, x: i32, z: i32) -> Option<usize> {
        if x.abs() > self.radius || z.abs() > self.radius {
            return None;
        }
        let side = 2 * self.radius + 1;
        Some(((x + self.radius) * side + (z + self.radius)) as usize)
    }

    #[inline]
    pub fn get(&self, x: i32, z: i32) -> Option<&GridCell> {
        self.index(x, z).and_then(|i| self.cells.get(i))
    }

    #[inline]
    pub fn get_mut(&mut self, x: i32, z: i32) -> Option<&mut GridCell> {
        self.index(x, z).and_then(move |i| self.cells.get_mut(i))
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [GridCell] {
        &mut self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Convert world position to cell coordinates (clamped to the grid)
    pub fn world_to_cell(&self, pos: Position) -> (i32, i32) {
        let x = (pos.x / self.cell_size).round() as i32;
        let z = (pos.z / self.cell_size).round() as i32;
        (x.clamp(-self.radius, self.radius), z.clamp(-self.radius, self.radius))
    }

    /// Sample grid at world position
    pub fn sample(&self, pos: Position) -> Option<&GridCell> {
        let (x, z) = self.world_to_cell(pos);
        self.get(x, z)
    }

    /// Mean (stability, corruption) across every cell
    pub fn averages(&self) -> (f32, f32) {
        if self.cells.is_empty() {
            return (1.0, 0.0);
        }
        let (s, c) = self
            .cells
            .iter()
            .fold((0.0f32, 0.0f32), |(s, c), cell| (s + cell.stability(), c + cell.corruption()));
        let n = self.cells.len() as f32;
        (s / n, c / n)
    }
}
