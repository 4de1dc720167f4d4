//! UseCase: 参加者接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::execute() メソッド
//! - ハブへの接続登録（重複チェックはハブのディスパッチャが行う）
//!
//! ### なぜこのテストが必要か
//! - 接続は登録された瞬間からルームの配信対象になる
//! - 重複した接続 ID での登録がクラッシュせず拒否されることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規接続の登録
//! - 異常系：重複した接続 ID、停止済みのハブ
//! - エッジケース：登録後、切断処理を経ずにセッションが破棄された場合

use std::sync::Arc;

use crate::domain::{
    ConnectionHub, ConnectionId, ConnectionSession, RoomId, SenderId, SenderLabel,
};

use super::error::ConnectError;

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    /// ConnectionHub（接続管理と配信の抽象化）
    hub: Arc<dyn ConnectionHub>,
}

impl ConnectParticipantUseCase {
    /// 新しい ConnectParticipantUseCase を作成
    pub fn new(hub: Arc<dyn ConnectionHub>) -> Self {
        Self { hub }
    }

    /// 参加者接続を実行
    ///
    /// # Arguments
    ///
    /// * `room_id` - 参加するルーム（接続の生存期間中は固定）
    /// * `connection_id` - セッションごとに一意な接続 ID
    /// * `sender_id` - 送信者 ID
    /// * `sender_label` - 送信者の表示名
    ///
    /// # Returns
    ///
    /// * `Ok(ConnectionSession)` - 接続成功（送信キューの受信口と閉鎖シグナル）
    /// * `Err(ConnectError)` - 接続失敗
    pub async fn execute(
        &self,
        room_id: RoomId,
        connection_id: ConnectionId,
        sender_id: SenderId,
        sender_label: SenderLabel,
    ) -> Result<ConnectionSession, ConnectError> {
        let session = self
            .hub
            .register(room_id, connection_id, sender_id, sender_label)
            .await?;
        Ok(session)
    }

    /// ハブが新しい接続を受け付けられるか（WebSocket のアップグレード前の確認用）
    pub fn is_available(&self) -> bool {
        !self.hub.is_stopped()
    }
}
