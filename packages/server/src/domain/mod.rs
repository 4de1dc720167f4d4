//! ドメイン層
//!
//! 値オブジェクト・エンティティ・接続・メンバーシップ表と、外部に実装を委ねる
//! trait（`MessageSink`, `ConnectionHub`）を定義します。

pub mod connection;
pub mod entity;
pub mod error;
pub mod hub;
pub mod membership;
pub mod repository;
pub mod value_object;

pub use connection::{ClosedSignal, Connection, ConnectionSession, Frame, OutboundQueue};
pub use entity::{
    BroadcastMessage, ChatMessage, DispatchReport, HubStats, MemberInfo, StoredMessage,
};
pub use error::{EnqueueError, HubError, MembershipError, PersistenceError, ValueObjectError};
pub use hub::ConnectionHub;
pub use membership::RoomMembershipTable;
#[cfg(test)]
pub use repository::MockMessageSink;
pub use repository::{MessageHistory, MessageSink};
pub use value_object::{
    ConnectionId, MessageContent, MessageId, RoomId, SenderId, SenderLabel, Timestamp,
};
