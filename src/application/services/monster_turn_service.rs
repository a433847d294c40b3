//! Monster Turn Service - One action per monster after every player turn
//!
//! Each monster rolls an action independently, in roster order:
//! - a favoured action (set after a player attack) wins when a d20 beats 12
//! - otherwise a d2 picks between idling and moving
//!
//! Attacking is only reachable through the favoured action.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::dto::TurnEffects;
use crate::application::ports::outbound::DiceRoller;
use crate::domain::aggregates::Campaign;
use crate::domain::entities::Grid;
use crate::domain::value_objects::{in_range, Direction, MonsterId, Position, Reach, UserId};

const FAVOURED_ACTION_THRESHOLD: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonsterAction {
    Idle,
    Move,
    Attack,
}

/// Where a monster may step.
///
/// `Strict` applies the character rule. `Legacy` accepts `0 <= x <= width` and
/// `0 <= y <= height`, one cell past the far edges, as older campaigns did; a
/// monster parked there is off the map and its campaign no longer re-imports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonsterBounds {
    #[default]
    Strict,
    Legacy,
}

impl MonsterBounds {
    pub fn permits(self, grid: &Grid, pos: Position) -> bool {
        match self {
            MonsterBounds::Strict => grid.contains(pos),
            MonsterBounds::Legacy => {
                pos.x >= 0
                    && pos.y >= 0
                    && pos.x as u32 <= grid.width()
                    && pos.y as u32 <= grid.height()
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MonsterTurnReport {
    pub messages: Vec<String>,
    pub effects: TurnEffects,
}

pub struct MonsterTurnService {
    dice: Arc<dyn DiceRoller>,
    bounds: MonsterBounds,
}

impl MonsterTurnService {
    pub fn new(dice: Arc<dyn DiceRoller>, bounds: MonsterBounds) -> Self {
        Self { dice, bounds }
    }

    /// Run one sweep over every monster. The campaign is always marked for saving.
    #[instrument(skip(self, campaign), fields(campaign_id = %campaign.id(), monsters = campaign.monster_count()))]
    pub fn take_turn(
        &self,
        campaign: &mut Campaign,
        favoured: Option<MonsterAction>,
    ) -> MonsterTurnReport {
        let mut report = MonsterTurnReport::default();

        for monster_id in campaign.monster_ids() {
            let action = self.roll_action(favoured);
            let witness = nearby_character(campaign, &monster_id);
            debug!(monster = %monster_id, ?action, witness = ?witness, "Monster acts");

            match action {
                MonsterAction::Idle => {
                    if witness.is_some() {
                        report
                            .messages
                            .push("> An eerie silence fills the room...".to_string());
                    }
                }
                MonsterAction::Move => self.move_monster(campaign, monster_id, witness, &mut report),
                MonsterAction::Attack => {
                    if let Some(uid) = witness {
                        strike_character(campaign, monster_id, &uid, &mut report);
                    }
                }
            }
        }

        report.effects.campaign = true;
        report
    }

    fn roll_action(&self, favoured: Option<MonsterAction>) -> MonsterAction {
        if let Some(action) = favoured {
            if self.dice.roll(20) > FAVOURED_ACTION_THRESHOLD {
                return action;
            }
        }
        match self.dice.roll(2) {
            2 => MonsterAction::Move,
            _ => MonsterAction::Idle,
        }
    }

    fn move_monster(
        &self,
        campaign: &mut Campaign,
        monster_id: MonsterId,
        witness: Option<UserId>,
        report: &mut MonsterTurnReport,
    ) {
        let Some(direction) = Direction::from_d4(self.dice.roll(4)) else {
            return;
        };
        let Some(monster) = campaign.monster(&monster_id) else {
            return;
        };
        let candidate = monster.position.step(direction);
        let name = monster.name.clone();

        let grid = campaign.grid();
        if !self.bounds.permits(grid, candidate)
            || grid.is_blocking(candidate)
            || campaign.is_live_character_at(candidate)
        {
            debug!(monster = %monster_id, %candidate, "Monster move rejected");
            return;
        }

        if let Some(monster) = campaign.monster_mut(&monster_id) {
            monster.position = candidate;
        }
        report.effects.touch_monster(monster_id);

        if let Some(witness) = witness.and_then(|uid| campaign.character(&uid)) {
            report.messages.push(format!(
                "> **{}** sees **{}** going {}!",
                witness.name,
                name,
                direction.cardinal()
            ));
        }
    }
}

/// The character a monster is aware of.
///
/// Every standing character within awareness reach qualifies; when several do, the
/// last one in roster order wins.
fn nearby_character(campaign: &Campaign, monster_id: &MonsterId) -> Option<UserId> {
    let monster = campaign.monster(monster_id)?;
    campaign
        .characters()
        .filter(|c| !c.is_incapacitated())
        .filter(|c| in_range(c.position, monster.position, Reach::AWARENESS))
        .last()
        .map(|c| c.uid.clone())
}

fn strike_character(
    campaign: &mut Campaign,
    monster_id: MonsterId,
    uid: &UserId,
    report: &mut MonsterTurnReport,
) {
    let monster_name = match campaign.monster(&monster_id) {
        Some(monster) => monster.name.clone(),
        None => return,
    };
    let Some(character) = campaign.character_mut(uid) else {
        return;
    };

    report.messages.push(format!(
        "> **{}** is hit by **{}**!",
        character.name, monster_name
    ));
    character.take_damage(1);
    if character.is_incapacitated() {
        report.messages.push(format!(
            "> **{}** lets out a deathly scream, and drops dead to the floor...",
            character.name
        ));
    }
    report.effects.touch_character(uid);
}
