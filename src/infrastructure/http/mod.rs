//! HTTP REST API routes

mod campaign_routes;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::infrastructure::state::AppState;

pub use campaign_routes::*;

/// Create all API routes
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/campaigns/{id}",
            get(campaign_routes::get_campaign).put(campaign_routes::put_campaign),
        )
        .route(
            "/api/campaigns/{id}/messages",
            post(campaign_routes::post_message),
        )
        .route(
            "/api/campaigns/{id}/characters/{uid}",
            get(campaign_routes::get_character),
        )
        .route(
            "/api/campaigns/{id}/monsters/{name}",
            get(campaign_routes::get_monster),
        )
}
