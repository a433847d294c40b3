//! Reach - the radius used by every range check in the game

use super::Position;

/// Radius of an action or a field of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reach {
    Within(u32),
    Unlimited,
}

impl Reach {
    /// Attack eligibility against monsters.
    pub const MELEE: Reach = Reach::Within(2);
    /// How close a character must be for a monster to notice it.
    pub const AWARENESS: Reach = Reach::Within(1);
    /// Default radius for `look` and `map`.
    pub const SIGHT: Reach = Reach::Within(3);
    /// Radius for `examine`.
    pub const EXAMINE: Reach = Reach::Within(4);

    /// True iff `floor(distance(a, b)) < radius`.
    ///
    /// For a whole radius `r`, `floor(d) < r` holds exactly when `d < r`, which is
    /// `d² < r²` on integer coordinates.
    pub fn contains(self, a: Position, b: Position) -> bool {
        match self {
            Reach::Unlimited => true,
            Reach::Within(radius) => {
                let radius = i64::from(radius);
                a.distance_squared(b) < radius * radius
            }
        }
    }
}

/// Free-function form of [`Reach::contains`].
pub fn in_range(a: Position, b: Position, reach: Reach) -> bool {
    reach.contains(a, b)
}
