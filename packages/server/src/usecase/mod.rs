//! UseCase 層
//!
//! ドメイン層の trait（`ConnectionHub`, `MessageSink`, `MessageHistory`）だけに依存し、
//! 接続・送信・切断・参照の各処理を組み立てます。

mod connect_participant;
mod disconnect_participant;
mod error;
mod get_hub_stats;
mod get_room_members;
mod get_room_messages;
mod send_message;

pub use connect_participant::ConnectParticipantUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{ConnectError, QueryError, SendMessageError};
pub use get_hub_stats::GetHubStatsUseCase;
pub use get_room_members::GetRoomMembersUseCase;
pub use get_room_messages::{DEFAULT_HISTORY_LIMIT, GetRoomMessagesUseCase, MAX_HISTORY_LIMIT};
pub use send_message::{SendMessageUseCase, SendOutcome};
