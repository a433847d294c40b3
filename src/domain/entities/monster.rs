//! Monster entity - Adversaries placed in the dungeon at generation time

use crate::domain::value_objects::{MonsterId, Position};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Monster {
    pub id: MonsterId,
    pub name: String,
    pub level: u32,
    pub position: Position,
    pub current_health: i32,
    pub max_health: i32,
    pub power: i32,
    pub defense: i32,
    /// Experience granted to whoever defeats it
    pub experience: u32,
    pub glyph: String,
}

impl Monster {
    pub fn new(name: impl Into<String>, level: u32, position: Position) -> Self {
        Self {
            id: MonsterId::new(),
            name: name.into(),
            level,
            position,
            current_health: 3,
            max_health: 3,
            power: 1,
            defense: 0,
            experience: 1,
            glyph: ":japanese_ogre:".to_string(),
        }
    }

    pub fn with_id(mut self, id: MonsterId) -> Self {
        self.id = id;
        self
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

    pub fn with_experience(mut self, experience: u32) -> Self {
        self.experience = experience;
        self
    }

    pub fn with_glyph(mut self, glyph: impl Into<String>) -> Self {
        self.glyph = glyph.into();
        self
    }

    pub fn is_defeated(&self) -> bool {
        self.current_health <= 0
    }

    /// Apply damage, never dropping below zero. Returns the remaining health.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        self.current_health = (self.current_health - amount.max(0)).max(0);
        self.current_health
    }
}
