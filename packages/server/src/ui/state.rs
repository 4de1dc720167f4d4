//! Shared application state.

use std::sync::Arc;

use crate::usecase::{
    ConnectParticipantUseCase, DisconnectParticipantUseCase, GetHubStatsUseCase,
    GetRoomMembersUseCase, GetRoomMessagesUseCase, SendMessageUseCase,
};

/// Shared application state
pub struct AppState {
    /// ConnectParticipantUseCase（参加者接続のユースケース）
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    /// DisconnectParticipantUseCase（参加者切断のユースケース）
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// GetRoomMembersUseCase（ルーム参加者一覧取得のユースケース）
    pub get_room_members_usecase: Arc<GetRoomMembersUseCase>,
    /// GetRoomMessagesUseCase（メッセージ履歴取得のユースケース）
    pub get_room_messages_usecase: Arc<GetRoomMessagesUseCase>,
    /// GetHubStatsUseCase（ハブ統計取得のユースケース）
    pub get_hub_stats_usecase: Arc<GetHubStatsUseCase>,
}
