pub mod grid;

pub use grid::{biome_for_cell, Biome, CellType, GridCell, WorldGrid};
