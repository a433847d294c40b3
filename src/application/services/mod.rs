//! Application services - Use case implementations
//!
//! The resolvers (movement, combat, perception, map, monster turns) are pure
//! functions of the campaign aggregate. `CampaignCommandService` ties them to the
//! repository and transport ports.

mod campaign_command_service;
mod combat_service;
mod command_error;
mod map_service;
mod monster_turn_service;
mod movement_service;
mod perception_service;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use campaign_command_service::{CampaignCommandService, CampaignSettings};
pub use combat_service::{AttackReport, AttackResult, CombatService};
pub use command_error::CommandError;
pub use map_service::MapService;
pub use monster_turn_service::{MonsterAction, MonsterBounds, MonsterTurnReport, MonsterTurnService};
pub use movement_service::{MoveReport, MovementService};
pub use perception_service::{surroundings, PerceptionService, Sighting};
