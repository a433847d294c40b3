//! Repository port - Interface for campaign persistence
//!
//! Application services depend on this trait, not on a concrete database. A
//! campaign is loaded and saved as a unit; individual characters and monsters can
//! also be written on their own when only one of them changed.

use async_trait::async_trait;

use crate::domain::aggregates::Campaign;
use crate::domain::entities::{Character, GridError, Monster};
use crate::domain::value_objects::{CampaignId, UserId};

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Campaign not found: {0}")]
    NotFound(CampaignId),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<GridError> for PersistenceError {
    fn from(error: GridError) -> Self {
        PersistenceError::Serialization(error.to_string())
    }
}

/// Repository port for the Campaign aggregate
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CampaignRepositoryPort: Send + Sync {
    /// Load a campaign with its grid decoded and its rosters hydrated
    async fn load_campaign(&self, id: &CampaignId) -> Result<Campaign, PersistenceError>;

    /// Write the whole aggregate, dropping entities no longer in it
    async fn save_campaign(&self, campaign: &Campaign) -> Result<(), PersistenceError>;

    /// Write a single character record
    async fn save_character(
        &self,
        campaign_id: &CampaignId,
        character: &Character,
    ) -> Result<(), PersistenceError>;

    /// Write a single monster record
    async fn save_monster(
        &self,
        campaign_id: &CampaignId,
        monster: &Monster,
    ) -> Result<(), PersistenceError>;

    /// Delete a campaign and everything in it
    async fn delete_campaign(&self, id: &CampaignId) -> Result<(), PersistenceError>;

    /// Look up one character without loading the campaign
    async fn find_character(
        &self,
        campaign_id: &CampaignId,
        uid: &UserId,
    ) -> Result<Option<Character>, PersistenceError>;

    /// Look up the first monster with the given name
    async fn find_monster(
        &self,
        campaign_id: &CampaignId,
        name: &str,
    ) -> Result<Option<Monster>, PersistenceError>;
}
