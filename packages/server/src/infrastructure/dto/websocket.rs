//! WebSocket frame DTOs.

use serde::{Deserialize, Serialize};

/// Outbound chat frame, one per broadcast message.
///
/// Field names follow the browser client (`user_id`, `user_usn`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageDto {
    /// Store-assigned id, `null` when the message could not be persisted
    pub id: Option<String>,
    pub room_id: String,
    pub user_id: String,
    pub user_usn: String,
    pub content: String,
    /// RFC 3339 timestamp
    pub created_at: String,
}
