//! Shared application state

use std::sync::Arc;

use anyhow::Result;

use crate::application::ports::outbound::{
    CampaignRepositoryPort, DiceRoller, MessageTransportPort,
};
use crate::application::services::CampaignCommandService;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::persistence::CampaignStore;
use crate::infrastructure::random::{SeededDice, SystemDice};
use crate::infrastructure::transport::{LogTransport, WebhookTransport};

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    pub repository: Arc<dyn CampaignRepositoryPort>,
    /// Where replies to HTTP-submitted commands are delivered
    pub transport: Arc<dyn MessageTransportPort>,
    pub commands: CampaignCommandService,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self> {
        let repository: Arc<dyn CampaignRepositoryPort> =
            Arc::new(CampaignStore::from_config(&config).await?);

        let dice: Arc<dyn DiceRoller> = match config.dice_seed {
            Some(seed) => {
                tracing::info!("Using seeded dice ({})", seed);
                Arc::new(SeededDice::new(seed))
            }
            None => Arc::new(SystemDice::new()),
        };

        let transport: Arc<dyn MessageTransportPort> = match &config.outbound_webhook_url {
            Some(url) => Arc::new(WebhookTransport::new(url, config.message_size_limit)),
            None => {
                tracing::warn!("OUTBOUND_WEBHOOK_URL not set; replies will only be logged");
                Arc::new(LogTransport::new())
            }
        };

        Ok(Self::from_parts(config, repository, dice, transport))
    }

    pub fn from_parts(
        config: AppConfig,
        repository: Arc<dyn CampaignRepositoryPort>,
        dice: Arc<dyn DiceRoller>,
        transport: Arc<dyn MessageTransportPort>,
    ) -> Self {
        let commands = CampaignCommandService::new(
            repository.clone(),
            dice,
            config.campaign_settings(),
            config.monster_bounds(),
        );
        Self {
            config,
            repository,
            transport,
            commands,
        }
    }
}
