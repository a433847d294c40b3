//! Campaign document - JSON shape used to import and export a whole campaign

use serde::{Deserialize, Serialize};

use crate::domain::aggregates::{AggregateError, Campaign};
use crate::domain::entities::{Character, Grid, GridError, Monster};
use crate::domain::value_objects::{CampaignId, MonsterId, Position, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterDocument {
    pub uid: UserId,
    pub name: String,
    pub position: Position,
    pub current_health: i32,
    pub max_health: i32,
    pub power: i32,
    pub defense: i32,
    pub glyph: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterDocument {
    #[serde(default)]
    pub id: Option<MonsterId>,
    pub name: String,
    pub level: u32,
    pub position: Position,
    pub current_health: i32,
    pub max_health: i32,
    pub power: i32,
    pub defense: i32,
    #[serde(alias = "expvalue")]
    pub experience: u32,
    pub glyph: String,
}

/// A campaign with its dungeon blob kept as the raw JSON value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignDocument {
    /// Grid blob: `{width, height, enter, exit, world}`
    pub dungeon: serde_json::Value,
    #[serde(default)]
    pub characters: Vec<CharacterDocument>,
    #[serde(default)]
    pub monsters: Vec<MonsterDocument>,
}

/// Highest `max_health` a document may carry
pub const MAX_HEALTH: i32 = 1_000;

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error(
        "{name} has health {current}/{max}; expected 0 <= current <= max <= {limit}",
        limit = MAX_HEALTH
    )]
    Health { name: String, current: i32, max: i32 },
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

impl CampaignDocument {
    /// Build a validated campaign; every entity must stand on a walkable cell.
    pub fn into_campaign(self, id: CampaignId) -> Result<Campaign, DocumentError> {
        let grid = Grid::decode(&self.dungeon.to_string())?;
        let mut campaign = Campaign::new(id, grid);
        for doc in self.characters {
            check_health(&doc.name, doc.current_health, doc.max_health)?;
            let character = Character::new(doc.uid, doc.name, doc.position)
                .with_health(doc.current_health, doc.max_health)
                .with_stats(doc.power, doc.defense)
                .with_glyph(doc.glyph);
            campaign.add_character(character)?;
        }
        for doc in self.monsters {
            check_health(&doc.name, doc.current_health, doc.max_health)?;
            let mut monster = Monster::new(doc.name, doc.level, doc.position)
                .with_health(doc.current_health, doc.max_health)
                .with_stats(doc.power, doc.defense)
                .with_experience(doc.experience)
                .with_glyph(doc.glyph);
            if let Some(id) = doc.id {
                monster = monster.with_id(id);
            }
            campaign.add_monster(monster)?;
        }
        Ok(campaign)
    }

    pub fn from_campaign(campaign: &Campaign) -> Result<Self, GridError> {
        let dungeon = serde_json::from_str(&campaign.grid().encode()?)?;
        Ok(Self {
            dungeon,
            characters: campaign.characters().map(CharacterDocument::from).collect(),
            monsters: campaign.monsters().map(MonsterDocument::from).collect(),
        })
    }
}

fn check_health(name: &str, current: i32, max: i32) -> Result<(), DocumentError> {
    if (0..=MAX_HEALTH).contains(&max) && (0..=max).contains(&current) {
        Ok(())
    } else {
        Err(DocumentError::Health {
            name: name.to_string(),
            current,
            max,
        })
    }
}

impl From<&Character> for CharacterDocument {
    fn from(c: &Character) -> Self {
        Self {
            uid: c.uid.clone(),
            name: c.name.clone(),
            position: c.position,
            current_health: c.current_health,
            max_health: c.max_health,
            power: c.power,
            defense: c.defense,
            glyph: c.glyph.clone(),
        }
    }
}

impl From<&Monster> for MonsterDocument {
    fn from(m: &Monster) -> Self {
        Self {
            id: Some(m.id),
            name: m.name.clone(),
            level: m.level,
            position: m.position,
            current_health: m.current_health,
            max_health: m.max_health,
            power: m.power,
            defense: m.defense,
            experience: m.experience,
            glyph: m.glyph.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(current: i32, max: i32) -> CampaignDocument {
        serde_json::from_value(serde_json::json!({
            "dungeon": { "width": 2, "height": 1, "world": [[0, 0]] },
            "characters": [{
                "uid": "u1",
                "name": "Aria",
                "position": { "x": 0, "y": 0 },
                "current_health": current,
                "max_health": max,
                "power": 2,
                "defense": 1,
                "glyph": "A"
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_health_is_bounded_on_import() {
        let id = CampaignId::from("c1");
        assert!(document(10, 10).into_campaign(id.clone()).is_ok());
        assert!(document(0, MAX_HEALTH).into_campaign(id.clone()).is_ok());

        assert!(matches!(
            document(1, 1_000_000_000).into_campaign(id.clone()),
            Err(DocumentError::Health { max: 1_000_000_000, .. })
        ));
        assert!(matches!(
            document(11, 10).into_campaign(id.clone()),
            Err(DocumentError::Health { .. })
        ));
        assert!(matches!(
            document(-1, 10).into_campaign(id),
            Err(DocumentError::Health { .. })
        ));
    }

    #[test]
    fn test_exported_document_imports_again() {
        let campaign = document(4, 10).into_campaign(CampaignId::from("c1")).unwrap();
        let exported = CampaignDocument::from_campaign(&campaign).unwrap();
        let again = exported.into_campaign(CampaignId::from("c1")).unwrap();

        let uid = UserId::from("u1");
        assert_eq!(again.character(&uid), campaign.character(&uid));
    }
}
