//! Perception Service - What a character can see around them
//!
//! `look` lists everything within sight, `examine` inspects a single named
//! thing within a slightly wider radius. Neither touches campaign state.

use crate::application::services::CommandError;
use crate::domain::aggregates::Campaign;
use crate::domain::entities::{Character, TileFeature};
use crate::domain::value_objects::{in_range, MonsterId, Position, Reach, UserId};

/// Something noticed in a character's surroundings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sighting {
    Character { uid: UserId, name: String },
    Monster { id: MonsterId, name: String, level: u32 },
    Feature(TileFeature),
}

impl Sighting {
    pub fn label(&self) -> String {
        match self {
            Sighting::Character { name, .. } => name.clone(),
            Sighting::Monster { name, level, .. } => format!("{} (Lv.{})", name, level),
            Sighting::Feature(feature) => feature.label().to_string(),
        }
    }

    /// Case-insensitive match against the name a player would type
    pub fn matches(&self, query: &str) -> bool {
        let name = match self {
            Sighting::Character { name, .. } | Sighting::Monster { name, .. } => name.as_str(),
            Sighting::Feature(feature) => feature.label(),
        };
        name.to_lowercase() == query.trim().to_lowercase()
    }
}

/// Everything within `reach` of `origin`: standing characters other than
/// `exclude`, then monsters, then door and start-flag tiles (each kind once).
pub fn surroundings(
    campaign: &Campaign,
    origin: Position,
    reach: Reach,
    exclude: &UserId,
) -> Vec<Sighting> {
    let mut found: Vec<Sighting> = campaign
        .characters()
        .filter(|c| &c.uid != exclude && !c.is_incapacitated())
        .filter(|c| in_range(origin, c.position, reach))
        .map(|c| Sighting::Character {
            uid: c.uid.clone(),
            name: c.name.clone(),
        })
        .collect();

    found.extend(
        campaign
            .monsters()
            .filter(|m| in_range(origin, m.position, reach))
            .map(|m| Sighting::Monster {
                id: m.id,
                name: m.name.clone(),
                level: m.level,
            }),
    );

    let mut features = Vec::new();
    for (pos, cell) in campaign.grid().cells() {
        if let Some(feature) = cell.feature() {
            if in_range(origin, pos, reach) && !features.contains(&feature) {
                features.push(feature);
            }
        }
    }
    found.extend(features.into_iter().map(Sighting::Feature));

    found
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PerceptionService;

impl PerceptionService {
    pub fn new() -> Self {
        Self
    }

    pub fn look(&self, campaign: &Campaign, uid: &UserId) -> Result<Vec<String>, CommandError> {
        let viewer = viewer(campaign, uid)?;
        let labels: Vec<String> = surroundings(campaign, viewer.position, Reach::SIGHT, uid)
            .iter()
            .map(Sighting::label)
            .collect();

        let seen = if labels.is_empty() {
            format!("> **{}** sees nothing of note.", viewer.name)
        } else {
            format!("> **{}** sees {}.", viewer.name, join_labels(&labels))
        };
        Ok(vec![format!("> **{}** looks around.", viewer.name), seen])
    }

    pub fn examine(
        &self,
        campaign: &Campaign,
        uid: &UserId,
        target: &str,
    ) -> Result<Vec<String>, CommandError> {
        let viewer = viewer(campaign, uid)?;
        let sighting = surroundings(campaign, viewer.position, Reach::EXAMINE, uid)
            .into_iter()
            .find(|s| s.matches(target))
            .ok_or_else(|| CommandError::TargetNotFound {
                actor: viewer.name.clone(),
                target: target.to_string(),
            })?;

        let lines = match sighting {
            Sighting::Character { uid: other, .. } => match campaign.character(&other) {
                Some(other) => vec![
                    format!("> **{}** examines **{}**.", viewer.name, other.name),
                    format!("> {}", compare(viewer, other).join(" ")),
                ],
                None => {
                    return Err(CommandError::TargetNotFound {
                        actor: viewer.name.clone(),
                        target: target.to_string(),
                    })
                }
            },
            Sighting::Monster { name, .. } => vec![format!("> That's a hostile **{}**!", name)],
            Sighting::Feature(TileFeature::Door) => {
                vec!["> The door seems accessible.".to_string()]
            }
            Sighting::Feature(TileFeature::StartFlag) => vec![
                "> That's the start flag, it is where we all started in this crazy place."
                    .to_string(),
            ],
        };
        Ok(lines)
    }
}

fn viewer<'a>(campaign: &'a Campaign, uid: &UserId) -> Result<&'a Character, CommandError> {
    campaign
        .character(uid)
        .ok_or_else(|| CommandError::MissingCharacter { user: uid.clone() })
}

fn compare(me: &Character, other: &Character) -> [&'static str; 3] {
    use std::cmp::Ordering::*;

    let power = match other.power.cmp(&me.power) {
        Greater => "They look pretty powerful.",
        Equal => "We look equally strong.",
        Less => "They don't look very strong.",
    };
    let defense = match other.defense.cmp(&me.defense) {
        Greater => "They look pretty defensive.",
        Equal => "We look equally guarded.",
        Less => "They don't look very shielded.",
    };
    let health = if other.is_unhurt() {
        "They look very healthy."
    } else {
        "It looks like they're wounded."
    };
    [power, defense, health]
}

/// `a`, `b` and `c`
fn join_labels(labels: &[String]) -> String {
    let quoted: Vec<String> = labels.iter().map(|l| format!("`{}`", l)).collect();
    match quoted.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{} and {}", rest.join(", "), last),
        Some((last, _)) => last.clone(),
        None => String::new(),
    }
}
