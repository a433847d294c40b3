//! Campaign API routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::application::dto::{
    CampaignDocument, CharacterDocument, InboundMessage, MonsterDocument,
};
use crate::application::ports::outbound::PersistenceError;
use crate::domain::value_objects::{CampaignId, ChannelId, RoleId, UserId};
use crate::infrastructure::state::AppState;

/// A chat message submitted over HTTP; the campaign comes from the path
#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub channel_id: ChannelId,
    pub author_id: UserId,
    #[serde(default)]
    pub author_roles: Vec<RoleId>,
    #[serde(default)]
    pub author_is_bot: bool,
    pub content: String,
}

fn persistence_status(error: PersistenceError) -> (StatusCode, String) {
    match error {
        PersistenceError::NotFound(_) => (StatusCode::NOT_FOUND, error.to_string()),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, error.to_string()),
    }
}

/// Run one chat message through the dispatcher
///
/// Replies go out on the configured transport. Messages that are not commands
/// answer `204 No Content`.
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<PostMessageRequest>,
) -> Response {
    let inbound = InboundMessage {
        campaign_id: CampaignId::from(id),
        channel_id: req.channel_id,
        author_id: req.author_id,
        author_roles: req.author_roles,
        author_is_bot: req.author_is_bot,
        content: req.content,
    };

    match state
        .commands
        .execute(&inbound, state.transport.as_ref())
        .await
    {
        Some(outcome) => Json(outcome).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Import or replace a whole campaign
pub async fn put_campaign(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(document): Json<CampaignDocument>,
) -> Result<Json<CampaignDocument>, (StatusCode, String)> {
    let campaign = document
        .into_campaign(CampaignId::from(id))
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    state
        .commands
        .import(&campaign)
        .await
        .map_err(persistence_status)?;

    let stored = CampaignDocument::from_campaign(&campaign)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(stored))
}

/// Export a campaign
pub async fn get_campaign(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CampaignDocument>, (StatusCode, String)> {
    let campaign = state
        .repository
        .load_campaign(&CampaignId::from(id))
        .await
        .map_err(persistence_status)?;

    let document = CampaignDocument::from_campaign(&campaign)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(document))
}

pub async fn get_character(
    State(state): State<Arc<AppState>>,
    Path((id, uid)): Path<(String, String)>,
) -> Result<Json<CharacterDocument>, (StatusCode, String)> {
    let character = state
        .repository
        .find_character(&CampaignId::from(id), &UserId::from(uid))
        .await
        .map_err(persistence_status)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Character not found".to_string()))?;

    Ok(Json(CharacterDocument::from(&character)))
}

/// First monster with the given name, in roster order
pub async fn get_monster(
    State(state): State<Arc<AppState>>,
    Path((id, name)): Path<(String, String)>,
) -> Result<Json<MonsterDocument>, (StatusCode, String)> {
    let monster = state
        .repository
        .find_monster(&CampaignId::from(id), &name)
        .await
        .map_err(persistence_status)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Monster not found".to_string()))?;

    Ok(Json(MonsterDocument::from(&monster)))
}
