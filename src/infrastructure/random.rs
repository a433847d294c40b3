//! Dice implementations

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::application::ports::outbound::DiceRoller;

/// System dice - uses the thread-local generator.
pub struct SystemDice;

impl SystemDice {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemDice {
    fn default() -> Self {
        Self::new()
    }
}

impl DiceRoller for SystemDice {
    fn roll(&self, sides: u32) -> u32 {
        rand::thread_rng().gen_range(1..=sides.max(1))
    }
}

/// Seeded dice - the same seed replays the same campaign.
pub struct SeededDice {
    rng: Mutex<StdRng>,
}

impl SeededDice {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl DiceRoller for SeededDice {
    fn roll(&self, sides: u32) -> u32 {
        let sides = sides.max(1);
        match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(1..=sides),
            Err(poisoned) => poisoned.into_inner().gen_range(1..=sides),
        }
    }
}
