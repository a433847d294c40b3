//! Movement Service - Single-step cardinal movement for characters

use tracing::debug;

use crate::application::services::CommandError;
use crate::domain::aggregates::Campaign;
use crate::domain::value_objects::{Direction, Position, UserId};

/// A successful step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveReport {
    pub from: Position,
    pub to: Position,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MovementService;

impl MovementService {
    pub fn new() -> Self {
        Self
    }

    /// Move a character one cell. On failure the campaign is left untouched.
    ///
    /// Other characters and monsters never block a character; only the grid does.
    pub fn walk(
        &self,
        campaign: &mut Campaign,
        uid: &UserId,
        direction: Direction,
    ) -> Result<MoveReport, CommandError> {
        let character = campaign
            .character(uid)
            .ok_or_else(|| CommandError::MissingCharacter { user: uid.clone() })?;
        let from = character.position;
        let to = from.step(direction);
        let actor = character.name.clone();

        if !campaign.grid().contains(to) {
            debug!(%uid, %from, %to, "Move rejected: out of bounds");
            return Err(CommandError::OutOfBounds { actor });
        }
        if campaign.grid().is_blocking(to) {
            debug!(%uid, %from, %to, "Move rejected: blocked");
            return Err(CommandError::Blocked { actor });
        }

        if let Some(character) = campaign.character_mut(uid) {
            character.position = to;
        }

        Ok(MoveReport {
            from,
            to,
            message: format!("> {} takes a step, {}ward.", actor, direction.cardinal()),
        })
    }
}
