//! Conversion logic between domain entities and DTOs.

use hiroba_shared::time::timestamp_to_rfc3339;

use crate::domain::{BroadcastMessage, HubStats, MemberInfo, StoredMessage};
use crate::infrastructure::dto::{
    http::{HubStatsDto, MemberDto},
    websocket::ChatMessageDto,
};

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&BroadcastMessage> for ChatMessageDto {
    fn from(model: &BroadcastMessage) -> Self {
        Self {
            id: model.id.map(|id| id.to_string()),
            room_id: model.room_id.as_str().to_string(),
            user_id: model.sender_id.as_str().to_string(),
            user_usn: model.sender_label.as_str().to_string(),
            content: model.content.as_str().to_string(),
            created_at: timestamp_to_rfc3339(model.created_at.value()),
        }
    }
}

impl From<StoredMessage> for ChatMessageDto {
    fn from(model: StoredMessage) -> Self {
        Self::from(&BroadcastMessage::from(model))
    }
}

impl From<MemberInfo> for MemberDto {
    fn from(model: MemberInfo) -> Self {
        Self {
            connection_id: model.connection_id.into_string(),
            user_id: model.sender_id.into_string(),
            user_usn: model.sender_label.into_string(),
        }
    }
}

impl From<HubStats> for HubStatsDto {
    fn from(model: HubStats) -> Self {
        Self {
            rooms: model.rooms,
            connections: model.connections,
        }
    }
}
