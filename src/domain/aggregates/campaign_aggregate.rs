//! Campaign Aggregate - The root aggregate for one running dungeon crawl
//!
//! A campaign exclusively owns its grid, characters and monsters. Every command
//! mutates the campaign through this root and the whole aggregate is persisted
//! as a unit afterwards.

use chrono::{DateTime, Utc};

use super::Roster;
use crate::domain::entities::{Character, Grid, Monster};
use crate::domain::value_objects::{CampaignId, MonsterId, Position, UserId};

/// The Campaign Aggregate Root
#[derive(Debug, Clone, PartialEq)]
pub struct Campaign {
    id: CampaignId,
    grid: Grid,
    characters: Roster<UserId, Character>,
    monsters: Roster<MonsterId, Monster>,
    created_at: DateTime<Utc>,
}

impl Campaign {
    pub fn new(id: CampaignId, grid: Grid) -> Self {
        Self {
            id,
            grid,
            characters: Roster::new(),
            monsters: Roster::new(),
            created_at: Utc::now(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn id(&self) -> &CampaignId {
        &self.id
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Characters in join order
    pub fn characters(&self) -> impl Iterator<Item = &Character> + '_ {
        self.characters.iter()
    }

    /// Monsters in generation order
    pub fn monsters(&self) -> impl Iterator<Item = &Monster> + '_ {
        self.monsters.iter()
    }

    pub fn character_count(&self) -> usize {
        self.characters.len()
    }

    pub fn monster_count(&self) -> usize {
        self.monsters.len()
    }

    pub fn monster_ids(&self) -> Vec<MonsterId> {
        self.monsters.keys()
    }

    // ========================================================================
    // Finders
    // ========================================================================

    pub fn character(&self, uid: &UserId) -> Option<&Character> {
        self.characters.get(uid)
    }

    pub fn character_mut(&mut self, uid: &UserId) -> Option<&mut Character> {
        self.characters.get_mut(uid)
    }

    pub fn monster(&self, id: &MonsterId) -> Option<&Monster> {
        self.monsters.get(id)
    }

    pub fn monster_mut(&mut self, id: &MonsterId) -> Option<&mut Monster> {
        self.monsters.get_mut(id)
    }

    /// First character whose name matches exactly
    pub fn character_named(&self, name: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.name == name)
    }

    /// First monster whose name matches exactly
    pub fn monster_named(&self, name: &str) -> Option<&Monster> {
        self.monsters.iter().find(|m| m.name == name)
    }

    pub fn character_at(&self, pos: Position) -> Option<&Character> {
        self.characters.iter().find(|c| c.position == pos)
    }

    pub fn monster_at(&self, pos: Position) -> Option<&Monster> {
        self.monsters.iter().find(|m| m.position == pos)
    }

    /// Whether a character that is still standing occupies `pos`
    pub fn is_live_character_at(&self, pos: Position) -> bool {
        self.characters
            .iter()
            .any(|c| !c.is_incapacitated() && c.position == pos)
    }

    // ========================================================================
    // Mutators
    // ========================================================================

    /// Add a character to the campaign
    ///
    /// # Invariants
    /// - Character name must not be empty
    /// - The character must stand on a walkable cell inside the grid
    pub fn add_character(&mut self, character: Character) -> Result<(), AggregateError> {
        if character.name.trim().is_empty() {
            return Err(AggregateError::Validation(
                "Character name cannot be empty".to_string(),
            ));
        }
        self.check_placement(&character.name, character.position)?;
        if self.characters.contains(&character.uid) {
            return Err(AggregateError::Duplicate(character.uid.to_string()));
        }
        self.characters.insert(character.uid.clone(), character);
        Ok(())
    }

    /// Add a monster to the campaign, with the same placement rules as characters
    pub fn add_monster(&mut self, monster: Monster) -> Result<(), AggregateError> {
        if monster.name.trim().is_empty() {
            return Err(AggregateError::Validation(
                "Monster name cannot be empty".to_string(),
            ));
        }
        self.check_placement(&monster.name, monster.position)?;
        if self.monsters.contains(&monster.id) {
            return Err(AggregateError::Duplicate(monster.id.to_string()));
        }
        self.monsters.insert(monster.id, monster);
        Ok(())
    }

    pub fn remove_character(&mut self, uid: &UserId) -> Option<Character> {
        self.characters.remove(uid)
    }

    pub fn remove_monster(&mut self, id: &MonsterId) -> Option<Monster> {
        self.monsters.remove(id)
    }

    fn check_placement(&self, name: &str, pos: Position) -> Result<(), AggregateError> {
        if !self.grid.contains(pos) {
            return Err(AggregateError::Placement(format!(
                "{} at {} is outside the {}x{} grid",
                name,
                pos,
                self.grid.width(),
                self.grid.height()
            )));
        }
        if self.grid.is_blocking(pos) {
            return Err(AggregateError::Placement(format!(
                "{} at {} stands inside a wall",
                name, pos
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Bulk Loading
    // ========================================================================

    /// Load characters into the aggregate (for hydration from persistence)
    pub fn with_characters(mut self, characters: Vec<Character>) -> Self {
        for character in characters {
            self.characters.insert(character.uid.clone(), character);
        }
        self
    }

    /// Load monsters into the aggregate (for hydration from persistence)
    pub fn with_monsters(mut self, monsters: Vec<Monster>) -> Self {
        for monster in monsters {
            self.monsters.insert(monster.id, monster);
        }
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

/// Errors that can occur when populating the aggregate
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregateError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Invalid placement: {0}")]
    Placement(String),
    #[error("Duplicate entity: {0}")]
    Duplicate(String),
}
