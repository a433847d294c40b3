//! Command error taxonomy
//!
//! Every variant except `Persistence` is resolved into a chat reply right where it
//! happens. Persistence failures are also logged and reported in the outcome.

use crate::application::dto::Reply;
use crate::application::ports::outbound::PersistenceError;
use crate::domain::value_objects::{CampaignId, UserId};

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{user} lacks the {requirement} role")]
    PermissionDenied { user: UserId, requirement: String },

    #[error("{actor} found no target named {target:?}")]
    TargetNotFound { actor: String, target: String },

    #[error("{target} is out of {actor}'s reach")]
    OutOfRange { actor: String, target: String },

    #[error("{actor} tried to leave the grid")]
    OutOfBounds { actor: String },

    #[error("{actor} walked into a wall")]
    Blocked { actor: String },

    #[error("{user} used unknown verb {verb:?}")]
    UnknownCommand { user: UserId, verb: String },

    #[error("{user} has no character in this campaign")]
    MissingCharacter { user: UserId },

    #[error("{actor} is incapacitated")]
    Incapacitated { actor: String },

    #[error("No campaign {0}")]
    NoCampaign(CampaignId),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl CommandError {
    /// The user-facing reply for this error
    pub fn reply(&self) -> Reply {
        match self {
            CommandError::PermissionDenied { user, requirement } => Reply::mention(
                user,
                format!(
                    "unfortunately you do not have permission to run that command, it requires the {} role. Contact a moderator to discuss your intentions.",
                    requirement
                ),
            ),
            CommandError::TargetNotFound { actor, .. } => {
                Reply::text(format!("> **{}** stares blankly in front of them.", actor))
            }
            CommandError::OutOfRange { actor, .. } => Reply::text(format!(
                "> **{}** swings widely into the air, hitting nothing.",
                actor
            )),
            CommandError::OutOfBounds { actor } | CommandError::Blocked { actor } => {
                Reply::text(format!("> {} cannot pass that way.", actor))
            }
            CommandError::UnknownCommand { user, .. } => Reply::mention(
                user,
                "I don't recognize that command. Try again or type `help` for a list of commands.",
            ),
            CommandError::MissingCharacter { user } => Reply::mention(
                user,
                "I couldn't find your character. Reach out to a moderator to help you out with this issue.",
            ),
            CommandError::Incapacitated { actor } => Reply::text(format!(
                "> **{}** lies motionless on the floor and cannot act.",
                actor
            )),
            CommandError::NoCampaign(_) => {
                Reply::text("There is no campaign running here. Ask a moderator to start one.")
            }
            CommandError::Persistence(_) => Reply::text(
                "> The dungeon trembles... that last action could not be recorded. Try again, or ask a moderator if this keeps happening.",
            ),
        }
    }
}
