//! Application layer - Use cases and orchestration
//!
//! - DTOs: parsed commands, outcomes and campaign documents
//! - Ports: interfaces to persistence, chat transport and dice
//! - Services: command dispatch and the turn resolvers

pub mod dto;
pub mod ports;
pub mod services;
