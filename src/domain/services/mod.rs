//! Domain services - Pure rules that don't belong to a single entity

mod combat_rules;

pub use combat_rules::{award_experience, damage};
