//! Domain entities - Core game objects with identity

mod character;
mod grid;
mod monster;

pub use character::Character;
pub use grid::{CellCode, Grid, GridError, GridMarker, TileFeature};
pub use monster::Monster;
