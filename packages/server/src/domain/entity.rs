//! エンティティ
//!
//! ハブはメッセージ履歴を保持しない。`ChatMessage` は受信フレームと接続情報から
//! 一時的に組み立てられ、永続化側で `StoredMessage` になり、`BroadcastMessage`
//! としてルームへ配信される。

use super::value_object::{
    ConnectionId, MessageContent, MessageId, RoomId, SenderId, SenderLabel, Timestamp,
};

/// 受信したばかりのメッセージ（永続化前）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub room_id: RoomId,
    pub sender_id: SenderId,
    pub sender_label: SenderLabel,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn new(
        room_id: RoomId,
        sender_id: SenderId,
        sender_label: SenderLabel,
        content: MessageContent,
    ) -> Self {
        Self {
            room_id,
            sender_id,
            sender_label,
            content,
        }
    }
}

/// 永続化済みのメッセージ（ID と作成時刻は永続化側が採番）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    pub id: MessageId,
    pub message: ChatMessage,
    pub created_at: Timestamp,
}

/// ルームへ配信するメッセージ
///
/// 永続化に失敗した場合でも配信するため、`id` は `None` になり得る。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastMessage {
    pub id: Option<MessageId>,
    pub room_id: RoomId,
    pub sender_id: SenderId,
    pub sender_label: SenderLabel,
    pub content: MessageContent,
    pub created_at: Timestamp,
}

impl BroadcastMessage {
    /// 永続化に失敗したメッセージを、ローカル時刻で配信用に組み立てる
    pub fn unsaved(message: ChatMessage, created_at: Timestamp) -> Self {
        Self {
            id: None,
            room_id: message.room_id,
            sender_id: message.sender_id,
            sender_label: message.sender_label,
            content: message.content,
            created_at,
        }
    }
}

impl From<StoredMessage> for BroadcastMessage {
    fn from(stored: StoredMessage) -> Self {
        Self {
            id: Some(stored.id),
            room_id: stored.message.room_id,
            sender_id: stored.message.sender_id,
            sender_label: stored.message.sender_label,
            content: stored.message.content,
            created_at: stored.created_at,
        }
    }
}

/// ルームの参加者（接続単位）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    pub connection_id: ConnectionId,
    pub sender_id: SenderId,
    pub sender_label: SenderLabel,
}

/// 一回の配信結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// 送信キューに積めた接続数
    pub delivered: usize,
    /// バックプレッシャーなどで強制切断した接続
    pub evicted: Vec<ConnectionId>,
}

/// ハブ全体の統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HubStats {
    pub rooms: usize,
    pub connections: usize,
}
