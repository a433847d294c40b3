//! Application configuration

use std::env;

use anyhow::{bail, Context, Result};

use crate::application::services::{CampaignSettings, MonsterBounds};
use crate::domain::value_objects::RoleId;

/// Which campaign store backs the repository port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceBackend {
    Sqlite,
    Memory,
}

impl PersistenceBackend {
    fn parse(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(PersistenceBackend::Sqlite),
            "memory" => Ok(PersistenceBackend::Memory),
            other => bail!("PERSISTENCE_BACKEND must be 'sqlite' or 'memory', got '{}'", other),
        }
    }
}

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Prefix that marks a chat message as a campaign command
    pub campaign_trigger: String,
    /// Role id allowed to stop campaigns
    pub moderator_role_id: String,

    pub persistence_backend: PersistenceBackend,
    /// sqlx connection string, only used by the SQLite backend
    pub database_url: String,
    /// Extra attempts after a failed campaign write
    pub save_retries: u32,

    /// HTTP/WebSocket server port
    pub server_port: u16,
    /// Longest single message the chat platform accepts
    pub message_size_limit: usize,
    /// Where outbound replies are POSTed; replies are only logged when unset
    pub outbound_webhook_url: Option<String>,

    /// Seed for reproducible dice
    pub dice_seed: Option<u64>,
    /// Let monsters step one cell past the far grid edges, as older campaigns did
    pub monster_legacy_bounds: bool,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            campaign_trigger: env::var("CAMPAIGN_TRIGGER").unwrap_or_else(|_| "!c".to_string()),
            moderator_role_id: env::var("CAMPAIGN_MODERATOR_ROLE_ID")
                .context("CAMPAIGN_MODERATOR_ROLE_ID environment variable is required")?,

            persistence_backend: PersistenceBackend::parse(
                &env::var("PERSISTENCE_BACKEND").unwrap_or_else(|_| "sqlite".to_string()),
            )?,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:carp.db?mode=rwc".to_string()),
            save_retries: env::var("SAVE_RETRIES")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .context("SAVE_RETRIES must be a non-negative integer")?,

            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
            message_size_limit: env::var("MESSAGE_SIZE_LIMIT")
                .unwrap_or_else(|_| "2000".to_string())
                .parse()
                .context("MESSAGE_SIZE_LIMIT must be a positive integer")?,
            outbound_webhook_url: env::var("OUTBOUND_WEBHOOK_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),

            dice_seed: env::var("DICE_SEED")
                .ok()
                .map(|seed| seed.parse())
                .transpose()
                .context("DICE_SEED must be an unsigned integer")?,
            monster_legacy_bounds: env::var("MONSTER_LEGACY_BOUNDS")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        })
    }

    pub fn campaign_settings(&self) -> CampaignSettings {
        CampaignSettings {
            trigger: self.campaign_trigger.clone(),
            moderator_role: RoleId::new(self.moderator_role_id.clone()),
            save_retries: self.save_retries,
        }
    }

    pub fn monster_bounds(&self) -> MonsterBounds {
        if self.monster_legacy_bounds {
            MonsterBounds::Legacy
        } else {
            MonsterBounds::Strict
        }
    }
}

#[cfg(test)]
impl AppConfig {
    /// In-memory configuration for router tests
    pub(crate) fn for_tests() -> Self {
        Self {
            campaign_trigger: "!c".to_string(),
            moderator_role_id: "role-mod".to_string(),
            persistence_backend: PersistenceBackend::Memory,
            database_url: "sqlite::memory:".to_string(),
            save_retries: 0,
            server_port: 0,
            message_size_limit: 2000,
            outbound_webhook_url: None,
            dice_seed: Some(7),
            monster_legacy_bounds: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_names() {
        assert_eq!(
            PersistenceBackend::parse("SQLite").unwrap(),
            PersistenceBackend::Sqlite
        );
        assert_eq!(
            PersistenceBackend::parse("memory").unwrap(),
            PersistenceBackend::Memory
        );
        assert!(PersistenceBackend::parse("neo4j").is_err());
    }

    #[test]
    fn test_settings_derive_from_config() {
        let mut config = AppConfig::for_tests();

        let settings = config.campaign_settings();
        assert_eq!(settings.trigger, "!c");
        assert_eq!(settings.moderator_role, RoleId::from("role-mod"));
        assert_eq!(config.monster_bounds(), MonsterBounds::Strict);

        config.monster_legacy_bounds = true;
        assert_eq!(config.monster_bounds(), MonsterBounds::Legacy);
    }
}
