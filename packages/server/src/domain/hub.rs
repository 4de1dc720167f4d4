//! ConnectionHub trait 定義
//!
//! 接続の登録・解除とルームへの配信を一本化した窓口。UseCase 層はこの trait に依存し、
//! 単一ディスパッチャによる実装（`infrastructure::hub`）には依存しない。

use async_trait::async_trait;

use super::{
    connection::ConnectionSession,
    entity::{BroadcastMessage, DispatchReport, HubStats, MemberInfo},
    error::HubError,
    value_object::{ConnectionId, RoomId, SenderId, SenderLabel},
};

/// Connection Hub trait
///
/// 全ての操作は互いに不可分に適用される。
#[async_trait]
pub trait ConnectionHub: Send + Sync {
    /// 接続をルームに登録し、セッション側の受信口を返す
    async fn register(
        &self,
        room_id: RoomId,
        connection_id: ConnectionId,
        sender_id: SenderId,
        sender_label: SenderLabel,
    ) -> Result<ConnectionSession, HubError>;

    /// 接続を登録解除する（冪等）。取り除いた場合は `true`
    async fn unregister(&self, connection_id: &ConnectionId) -> Result<bool, HubError>;

    /// メッセージをルームの現在の参加者全員に配信する
    async fn dispatch(&self, message: BroadcastMessage) -> Result<DispatchReport, HubError>;

    /// ルームの参加者一覧
    async fn members(&self, room_id: &RoomId) -> Result<Vec<MemberInfo>, HubError>;

    /// ハブ全体の統計
    async fn stats(&self) -> Result<HubStats, HubError>;

    /// ハブが停止済みで、以降の要求が全て `HubError::Stopped` になるか
    fn is_stopped(&self) -> bool;

    /// ハブを停止し、全ての接続を閉じる
    async fn shutdown(&self) -> Result<(), HubError>;
}
