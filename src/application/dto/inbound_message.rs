//! Inbound chat message as handed over by a transport

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{CampaignId, ChannelId, RoleId, UserId};

/// One chat message addressed to a campaign
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    pub campaign_id: CampaignId,
    pub channel_id: ChannelId,
    pub author_id: UserId,
    /// Role ids the author holds in the guild/server
    #[serde(default)]
    pub author_roles: Vec<RoleId>,
    /// Messages written by bots are never treated as commands
    #[serde(default)]
    pub author_is_bot: bool,
    pub content: String,
}

impl InboundMessage {
    pub fn has_role(&self, role: &RoleId) -> bool {
        self.author_roles.iter().any(|r| r == role)
    }
}
