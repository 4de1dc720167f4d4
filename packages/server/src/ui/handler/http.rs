//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    domain::RoomId,
    infrastructure::dto::{
        http::{HubStatsDto, MemberDto, RoomMembersDto, RoomMessagesDto},
        websocket::ChatMessageDto,
    },
    ui::state::AppState,
    usecase::QueryError,
};

/// Query parameters for the message history endpoint
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get the live members of a room
pub async fn get_room_members(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomMembersDto>, StatusCode> {
    let room_id = parse_room_id(room_id)?;
    let members = state
        .get_room_members_usecase
        .execute(&room_id)
        .await
        .map_err(query_error_status)?;

    // Domain Model から DTO への変換
    Ok(Json(RoomMembersDto {
        room_id: room_id.into_string(),
        members: members.into_iter().map(MemberDto::from).collect(),
    }))
}

/// Get the most recent stored messages of a room
pub async fn get_room_messages(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<RoomMessagesDto>, StatusCode> {
    let room_id = parse_room_id(room_id)?;
    let messages = state
        .get_room_messages_usecase
        .execute(&room_id, query.limit)
        .await
        .map_err(query_error_status)?;

    Ok(Json(RoomMessagesDto {
        room_id: room_id.into_string(),
        messages: messages.into_iter().map(ChatMessageDto::from).collect(),
    }))
}

/// Get hub-wide counters
pub async fn get_hub_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HubStatsDto>, StatusCode> {
    let stats = state
        .get_hub_stats_usecase
        .execute()
        .await
        .map_err(query_error_status)?;
    Ok(Json(HubStatsDto::from(stats)))
}

fn parse_room_id(room_id: String) -> Result<RoomId, StatusCode> {
    RoomId::try_from(room_id).map_err(|e| {
        tracing::warn!("Invalid room_id: {}", e);
        StatusCode::BAD_REQUEST
    })
}

fn query_error_status(e: QueryError) -> StatusCode {
    match e {
        QueryError::HubUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        QueryError::Storage(e) => {
            tracing::error!("Failed to read message history: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
