//! Aggregates - Consistency boundaries for domain entities

mod campaign_aggregate;
mod roster;

pub use campaign_aggregate::{AggregateError, Campaign};
pub use roster::Roster;
