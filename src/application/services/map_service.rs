//! Map Service - Emoji rendering of the dungeon around a character

use crate::application::services::CommandError;
use crate::domain::aggregates::Campaign;
use crate::domain::value_objects::{in_range, Position, Reach, UserId};

#[derive(Debug, Clone, Copy, Default)]
pub struct MapService;

impl MapService {
    pub fn new() -> Self {
        Self
    }

    /// Row-major glyph lines for every cell within `reach` of the character.
    ///
    /// A cell shows the glyph of a character standing on it, else of a monster,
    /// else of its terrain. There is one line per grid row; rows out of reach
    /// come back empty.
    pub fn render(
        &self,
        campaign: &Campaign,
        uid: &UserId,
        reach: Reach,
    ) -> Result<Vec<String>, CommandError> {
        let viewer = campaign
            .character(uid)
            .ok_or_else(|| CommandError::MissingCharacter { user: uid.clone() })?;
        Ok(render_from(campaign, viewer.position, reach))
    }

    pub fn location(&self, campaign: &Campaign, uid: &UserId) -> Result<String, CommandError> {
        let viewer = campaign
            .character(uid)
            .ok_or_else(|| CommandError::MissingCharacter { user: uid.clone() })?;
        Ok(format!("> **{}** stands at {}.", viewer.name, viewer.position))
    }
}

fn render_from(campaign: &Campaign, origin: Position, reach: Reach) -> Vec<String> {
    let grid = campaign.grid();
    let mut lines = vec![String::new(); grid.height() as usize];

    for (pos, cell) in grid.cells() {
        if !in_range(origin, pos, reach) {
            continue;
        }
        let glyph = campaign
            .character_at(pos)
            .map(|c| c.glyph.as_str())
            .or_else(|| campaign.monster_at(pos).map(|m| m.glyph.as_str()))
            .unwrap_or_else(|| cell.glyph());
        if let Some(line) = lines.get_mut(pos.y as usize) {
            line.push_str(glyph);
        }
    }
    lines
}
