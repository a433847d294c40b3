//! Combat Service - Resolves a character's attack against a named target
//!
//! Targets resolve against characters first, then monsters. Hitting a character
//! works at any distance; hitting a monster requires melee reach. A monster at zero
//! health is removed from the campaign on the spot. A character at zero health stays
//! where it fell.

use tracing::{debug, info};

use crate::application::dto::TurnEffects;
use crate::application::services::CommandError;
use crate::domain::aggregates::Campaign;
use crate::domain::services::{award_experience, damage};
use crate::domain::value_objects::{in_range, MonsterId, Reach, UserId};

/// How an attack resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttackResult {
    HitCharacter { target: UserId, damage: i32, fallen: bool },
    HitMonster { target: MonsterId, damage: i32 },
    DefeatedMonster { target: MonsterId, experience: u32 },
    /// Nothing connected. The reason is kept for logs only.
    Missed { reason: String },
}

#[derive(Debug, Clone)]
pub struct AttackReport {
    pub result: AttackResult,
    pub messages: Vec<String>,
    pub effects: TurnEffects,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CombatService;

impl CombatService {
    pub fn new() -> Self {
        Self
    }

    pub fn attack(
        &self,
        campaign: &mut Campaign,
        attacker_uid: &UserId,
        target_name: &str,
    ) -> Result<AttackReport, CommandError> {
        let attacker = campaign
            .character(attacker_uid)
            .cloned()
            .ok_or_else(|| CommandError::MissingCharacter {
                user: attacker_uid.clone(),
            })?;

        let mut messages = Vec::new();
        let mut effects = TurnEffects::default();

        let character_target = campaign.character_named(target_name).map(|c| c.uid.clone());
        if let Some(target_uid) = character_target {
            let Some(target) = campaign.character_mut(&target_uid) else {
                return Err(CommandError::TargetNotFound {
                    actor: attacker.name,
                    target: target_name.to_string(),
                });
            };
            let dealt = damage(attacker.power, target.defense);
            target.take_damage(dealt);
            let fallen = target.is_incapacitated();

            messages.push(format!(
                "> **{}** attacks **{}** for {} damage!",
                attacker.name, target.name, dealt
            ));
            if fallen {
                messages.push(format!(
                    "> **{}** lets out a deathly scream and drops dead on the floor.",
                    target.name
                ));
            }
            effects.touch_character(&target_uid);
            info!(attacker = %attacker.uid, target = %target_uid, damage = dealt, fallen, "Character attacked character");

            return Ok(AttackReport {
                result: AttackResult::HitCharacter {
                    target: target_uid,
                    damage: dealt,
                    fallen,
                },
                messages,
                effects,
            });
        }

        let monster_target = campaign
            .monster_named(target_name)
            .map(|m| (m.id, m.position));
        let miss = match monster_target {
            Some((monster_id, position)) if in_range(attacker.position, position, Reach::MELEE) => {
                return Ok(self.strike_monster(campaign, &attacker.uid, monster_id));
            }
            Some(_) => CommandError::OutOfRange {
                actor: attacker.name.clone(),
                target: target_name.to_string(),
            },
            None => CommandError::TargetNotFound {
                actor: attacker.name.clone(),
                target: target_name.to_string(),
            },
        };

        debug!(attacker = %attacker.uid, reason = %miss, "Attack missed");
        messages.push(format!(
            "> **{}** swings widely into the air, hitting nothing.",
            attacker.name
        ));
        Ok(AttackReport {
            result: AttackResult::Missed {
                reason: miss.to_string(),
            },
            messages,
            effects,
        })
    }

    fn strike_monster(
        &self,
        campaign: &mut Campaign,
        attacker_uid: &UserId,
        monster_id: MonsterId,
    ) -> AttackReport {
        let mut messages = Vec::new();
        let mut effects = TurnEffects::default();

        let (attacker_name, attacker_power) = campaign
            .character(attacker_uid)
            .map(|c| (c.name.clone(), c.power))
            .unwrap_or_default();

        let Some(monster) = campaign.monster_mut(&monster_id) else {
            return AttackReport {
                result: AttackResult::Missed {
                    reason: "target vanished".to_string(),
                },
                messages: vec![format!(
                    "> **{}** swings widely into the air, hitting nothing.",
                    attacker_name
                )],
                effects,
            };
        };

        let dealt = damage(attacker_power, monster.defense);
        monster.take_damage(dealt);
        messages.push(format!(
            "> **{}** attacks **{}** for {} damage!",
            attacker_name, monster.name, dealt
        ));

        if !monster.is_defeated() {
            effects.touch_monster(monster_id);
            return AttackReport {
                result: AttackResult::HitMonster {
                    target: monster_id,
                    damage: dealt,
                },
                messages,
                effects,
            };
        }

        let experience = monster.experience;
        messages.push(format!(
            "> **{}** is defeated!\n> **{}** gets {} EXP!",
            monster.name, attacker_name, experience
        ));
        if let Some(attacker) = campaign.character(attacker_uid) {
            award_experience(attacker, experience);
        }
        if let Some(defeated) = campaign.remove_monster(&monster_id) {
            info!(monster = %defeated.id, name = %defeated.name, by = %attacker_uid, "Monster defeated");
        }
        effects.campaign = true;

        AttackReport {
            result: AttackResult::DefeatedMonster {
                target: monster_id,
                experience,
            },
            messages,
            effects,
        }
    }
}
