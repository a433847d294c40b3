//! Character entity - A player's avatar inside a campaign

use crate::domain::value_objects::{Position, UserId};

/// A player character
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Character {
    /// Chat platform id of the owning user
    pub uid: UserId,
    pub name: String,
    pub position: Position,
    pub current_health: i32,
    pub max_health: i32,
    pub power: i32,
    pub defense: i32,
    /// Map glyph (emoji shortcode)
    pub glyph: String,
}

impl Character {
    pub fn new(uid: impl Into<UserId>, name: impl Into<String>, position: Position) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            position,
            current_health: 10,
            max_health: 10,
            power: 1,
            defense: 1,
            glyph: ":slight_smile:".to_string(),
        }
    }

    pub fn with_health(mut self, current: i32, max: i32) -> Self {
        self.max_health = max.max(0);
        self.current_health = current.clamp(0, self.max_health);
        self
    }

    pub fn with_stats(mut self, power: i32, defense: i32) -> Self {
        self.power = power.max(0);
        self.defense = defense.max(0);
        self
    }

    pub fn with_glyph(mut self, glyph: impl Into<String>) -> Self {
        self.glyph = glyph.into();
        self
    }

    /// Knocked out: still part of the campaign but unable to act.
    pub fn is_incapacitated(&self) -> bool {
        self.current_health <= 0
    }

    pub fn is_unhurt(&self) -> bool {
        self.current_health == self.max_health
    }

    /// Apply damage, never dropping below zero. Returns the remaining health.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        self.current_health = (self.current_health - amount.max(0)).max(0);
        self.current_health
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_damage_floors_at_zero() {
        let mut character = Character::new("u1", "Aria", Position::new(0, 0)).with_health(3, 5);
        assert_eq!(character.take_damage(2), 1);
        assert!(!character.is_incapacitated());
        assert_eq!(character.take_damage(10), 0);
        assert!(character.is_incapacitated());
        assert_eq!(character.take_damage(-4), 0);
    }

    #[test]
    fn test_builder_clamps_health() {
        let character = Character::new("u1", "Aria", Position::new(0, 0)).with_health(12, 8);
        assert_eq!(character.current_health, 8);
        assert!(character.is_unhurt());
    }
}
