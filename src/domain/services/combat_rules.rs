//! Combat rules
//!
//! Damage is deterministic: attack power minus the defender's defense, floored at
//! zero. Dice only decide what monsters do, never how hard anything hits.

use crate::domain::entities::Character;

/// Damage dealt by `power` against `defense`. Never negative.
pub fn damage(power: i32, defense: i32) -> i32 {
    power.saturating_sub(defense).max(0)
}

/// Credit a character with experience for a defeated monster.
///
/// Characters have no experience or level fields yet, so the award is only traced.
/// This is where levelling will hook in.
pub fn award_experience(character: &Character, amount: u32) {
    tracing::debug!(
        character = %character.name,
        uid = %character.uid,
        amount,
        "Experience awarded (not tracked)"
    );
}
