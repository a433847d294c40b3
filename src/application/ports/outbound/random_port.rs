//! Randomness port - Dice are injected so monster turns can be replayed in tests

/// A source of die rolls.
pub trait DiceRoller: Send + Sync {
    /// Roll one die with `sides` faces, returning a value in `1..=sides`.
    fn roll(&self, sides: u32) -> u32;
}
