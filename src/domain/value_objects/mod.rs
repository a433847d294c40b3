//! Value objects - Immutable objects defined by their attributes

mod ids;
mod position;
mod reach;

pub use ids::*;
pub use position::{Direction, Position};
pub use reach::{in_range, Reach};
