//! Data transfer objects for the application layer

mod campaign_command;
mod campaign_document;
mod command_outcome;
mod inbound_message;

pub use campaign_command::{CampaignCommand, Heading, MapScope, ParsedInput};
pub use campaign_document::{
    CampaignDocument, CharacterDocument, DocumentError, MonsterDocument,
};
pub use command_outcome::{CommandOutcome, PersistenceReport, Reply, TurnEffects};
pub use inbound_message::InboundMessage;
