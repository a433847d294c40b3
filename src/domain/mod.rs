//! Domain layer - Core game rules with no I/O
//!
//! This layer contains:
//! - Entities: Character, Monster, Grid
//! - Value Objects: ids, Position, Direction, Reach
//! - Aggregates: the Campaign aggregate root
//! - Domain Services: combat math and the experience hook

pub mod aggregates;
pub mod entities;
pub mod services;
pub mod value_objects;
