//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

use super::websocket::ChatMessageDto;

/// One live connection in a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDto {
    pub connection_id: String,
    pub user_id: String,
    pub user_usn: String,
}

/// `GET /api/rooms/{room_id}/members`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomMembersDto {
    pub room_id: String,
    pub members: Vec<MemberDto>,
}

/// `GET /api/rooms/{room_id}/messages`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomMessagesDto {
    pub room_id: String,
    pub messages: Vec<ChatMessageDto>,
}

/// `GET /api/hub/stats`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubStatsDto {
    pub rooms: usize,
    pub connections: usize,
}
