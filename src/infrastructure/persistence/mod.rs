//! Campaign persistence adapters
//!
//! Two backends implement [`CampaignRepositoryPort`]: SQLite through sqlx for real
//! deployments and a map in memory for development. [`CampaignStore`] picks one at
//! startup.

mod in_memory_campaign_repository;
mod sqlite_campaign_repository;

pub use in_memory_campaign_repository::InMemoryCampaignRepository;
pub use sqlite_campaign_repository::SqliteCampaignRepository;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;

use crate::application::ports::outbound::{CampaignRepositoryPort, PersistenceError};
use crate::domain::aggregates::Campaign;
use crate::domain::entities::{Character, Monster};
use crate::domain::value_objects::{CampaignId, UserId};
use crate::infrastructure::config::{AppConfig, PersistenceBackend};

/// Enum wrapper for repository backends to enable runtime selection
pub enum CampaignStore {
    Memory(InMemoryCampaignRepository),
    Sqlite(SqliteCampaignRepository),
}

impl CampaignStore {
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        match config.persistence_backend {
            PersistenceBackend::Memory => {
                tracing::warn!("Using the in-memory campaign store; nothing survives a restart");
                Ok(CampaignStore::Memory(InMemoryCampaignRepository::new()))
            }
            PersistenceBackend::Sqlite => {
                let pool = SqlitePoolOptions::new()
                    .max_connections(5)
                    .connect(&config.database_url)
                    .await
                    .context("Failed to connect to the SQLite campaign database")?;
                tracing::info!("Connected to SQLite campaign database: {}", config.database_url);
                let repository = SqliteCampaignRepository::new(pool)
                    .await
                    .context("Failed to create campaign tables")?;
                Ok(CampaignStore::Sqlite(repository))
            }
        }
    }
}

#[async_trait]
impl CampaignRepositoryPort for CampaignStore {
    async fn load_campaign(&self, id: &CampaignId) -> Result<Campaign, PersistenceError> {
        match self {
            CampaignStore::Memory(repo) => repo.load_campaign(id).await,
            CampaignStore::Sqlite(repo) => repo.load_campaign(id).await,
        }
    }

    async fn save_campaign(&self, campaign: &Campaign) -> Result<(), PersistenceError> {
        match self {
            CampaignStore::Memory(repo) => repo.save_campaign(campaign).await,
            CampaignStore::Sqlite(repo) => repo.save_campaign(campaign).await,
        }
    }

    async fn save_character(
        &self,
        campaign_id: &CampaignId,
        character: &Character,
    ) -> Result<(), PersistenceError> {
        match self {
            CampaignStore::Memory(repo) => repo.save_character(campaign_id, character).await,
            CampaignStore::Sqlite(repo) => repo.save_character(campaign_id, character).await,
        }
    }

    async fn save_monster(
        &self,
        campaign_id: &CampaignId,
        monster: &Monster,
    ) -> Result<(), PersistenceError> {
        match self {
            CampaignStore::Memory(repo) => repo.save_monster(campaign_id, monster).await,
            CampaignStore::Sqlite(repo) => repo.save_monster(campaign_id, monster).await,
        }
    }

    async fn delete_campaign(&self, id: &CampaignId) -> Result<(), PersistenceError> {
        match self {
            CampaignStore::Memory(repo) => repo.delete_campaign(id).await,
            CampaignStore::Sqlite(repo) => repo.delete_campaign(id).await,
        }
    }

    async fn find_character(
        &self,
        campaign_id: &CampaignId,
        uid: &UserId,
    ) -> Result<Option<Character>, PersistenceError> {
        match self {
            CampaignStore::Memory(repo) => repo.find_character(campaign_id, uid).await,
            CampaignStore::Sqlite(repo) => repo.find_character(campaign_id, uid).await,
        }
    }

    async fn find_monster(
        &self,
        campaign_id: &CampaignId,
        name: &str,
    ) -> Result<Option<Monster>, PersistenceError> {
        match self {
            CampaignStore::Memory(repo) => repo.find_monster(campaign_id, name).await,
            CampaignStore::Sqlite(repo) => repo.find_monster(campaign_id, name).await,
        }
    }
}
