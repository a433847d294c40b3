//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - Persistence: SQLite and in-memory campaign stores
//! - HTTP: REST API routes
//! - WebSocket: Chat bridge gateway
//! - Transport: Outbound chat delivery
//! - Random: Dice implementations
//! - Config: Application configuration
//! - State: Shared application state

pub mod config;
pub mod http;
pub mod persistence;
pub mod random;
pub mod state;
pub mod transport;
pub mod websocket;
