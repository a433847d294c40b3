//! Shared builders for service tests

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::application::ports::outbound::DiceRoller;
use crate::domain::aggregates::Campaign;
use crate::domain::entities::{CellCode, Character, Grid, GridMarker, Monster};
use crate::domain::value_objects::{CampaignId, Position};

/// Build a campaign from rows of cell-code digits, e.g. `["010", "000"]`.
pub(crate) fn campaign_from_rows(rows: &[&str]) -> Campaign {
    let cells = rows
        .iter()
        .map(|row| {
            row.chars()
                .map(|c| {
                    c.to_digit(10)
                        .and_then(|d| CellCode::from_code(d as u8))
                        .unwrap()
                })
                .collect()
        })
        .collect();
    let grid = Grid::from_rows(cells, GridMarker::default(), GridMarker::default()).unwrap();
    Campaign::new(CampaignId::from("test-campaign"), grid)
}

pub(crate) fn hero(uid: &str, name: &str, x: i32, y: i32) -> Character {
    Character::new(uid, name, Position::new(x, y))
        .with_health(10, 10)
        .with_stats(5, 1)
        .with_glyph(":man_mage:")
}

pub(crate) fn goblin(name: &str, x: i32, y: i32) -> Monster {
    Monster::new(name, 1, Position::new(x, y))
        .with_health(3, 3)
        .with_stats(1, 2)
        .with_experience(7)
        .with_glyph(":goblin:")
}

/// Dice that replay a fixed script, then keep returning 1.
pub(crate) struct ScriptedDice {
    rolls: Mutex<VecDeque<(u32, u32)>>,
}

impl ScriptedDice {
    /// Each entry is `(sides, result)`; the sides are asserted on use.
    pub(crate) fn new(rolls: &[(u32, u32)]) -> Self {
        Self {
            rolls: Mutex::new(rolls.iter().copied().collect()),
        }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.rolls.lock().unwrap().len()
    }
}

impl DiceRoller for ScriptedDice {
    fn roll(&self, sides: u32) -> u32 {
        match self.rolls.lock().unwrap().pop_front() {
            Some((expected_sides, result)) => {
                assert_eq!(expected_sides, sides, "unexpected die");
                result
            }
            None => 1,
        }
    }
}
