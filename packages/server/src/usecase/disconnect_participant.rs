//! UseCase: 参加者切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//! - ハブからの登録解除と、その冪等性
//!
//! ### なぜこのテストが必要か
//! - セッションの終了時には必ず呼ばれるため、すでに強制切断された接続や停止済みのハブに
//!   対しても安全でなければならない
//! - 切断後はルームへの配信対象から外れることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：登録済み接続の切断
//! - エッジケース：二重の切断、未登録の接続、停止済みのハブ

use std::sync::Arc;

use crate::domain::{ConnectionHub, ConnectionId, HubError};

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    /// ConnectionHub（接続管理と配信の抽象化）
    hub: Arc<dyn ConnectionHub>,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new(hub: Arc<dyn ConnectionHub>) -> Self {
        Self { hub }
    }

    /// 参加者切断を実行
    ///
    /// 未登録の接続や停止済みのハブに対しては何もしない。
    ///
    /// # Returns
    ///
    /// この呼び出しで接続を取り除いた場合は `true`
    pub async fn execute(&self, connection_id: &ConnectionId) -> bool {
        match self.hub.unregister(connection_id).await {
            Ok(removed) => removed,
            Err(HubError::Stopped) => {
                tracing::debug!(
                    connection_id = %connection_id,
                    "Hub already stopped, nothing to unregister"
                );
                false
            }
            Err(e) => {
                tracing::warn!(
                    connection_id = %connection_id,
                    "Failed to unregister connection: {}",
                    e
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::HubConfig,
        domain::{RoomId, SenderId, SenderLabel},
        infrastructure::hub::Hub,
    };

    fn create_test_hub() -> Arc<dyn ConnectionHub> {
        let (hub, _task) = Hub::start(HubConfig::default());
        Arc::new(hub)
    }

    async fn register(hub: &Arc<dyn ConnectionHub>, id: &str) -> ConnectionId {
        let connection_id = ConnectionId::new(id.to_string()).unwrap();
        let _session = hub
            .register(
                RoomId::new("room-1".to_string()).unwrap(),
                connection_id.clone(),
                SenderId::new(format!("user-{id}")).unwrap(),
                SenderLabel::new(id.to_string()).unwrap(),
            )
            .await
            .unwrap();
        connection_id
    }

    #[tokio::test]
    async fn test_disconnect_participant_success() {
        // テスト項目: 登録済みの接続を切断するとルームから外れる
        // given (前提条件):
        let hub = create_test_hub();
        let usecase = DisconnectParticipantUseCase::new(hub.clone());
        let alice = register(&hub, "alice").await;
        let _bob = register(&hub, "bob").await;

        // when (操作):
        let removed = usecase.execute(&alice).await;

        // then (期待する結果):
        assert!(removed);
        let members = hub
            .members(&RoomId::new("room-1".to_string()).unwrap())
            .await
            .unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].connection_id.as_str(), "bob");
    }

    #[tokio::test]
    async fn test_disconnect_participant_is_idempotent() {
        // テスト項目: 二重に切断しても 2 回目は何もしない
        // given (前提条件):
        let hub = create_test_hub();
        let usecase = DisconnectParticipantUseCase::new(hub.clone());
        let alice = register(&hub, "alice").await;
        assert!(usecase.execute(&alice).await);

        // when (操作):
        let removed = usecase.execute(&alice).await;

        // then (期待する結果):
        assert!(!removed);
        assert_eq!(hub.stats().await.unwrap().connections, 0);
    }

    #[tokio::test]
    async fn test_disconnect_participant_unknown_connection() {
        // テスト項目: 未登録の接続の切断は何もしない
        // given (前提条件):
        let hub = create_test_hub();
        let usecase = DisconnectParticipantUseCase::new(hub.clone());
        let _alice = register(&hub, "alice").await;

        // when (操作):
        let removed = usecase
            .execute(&ConnectionId::new("ghost".to_string()).unwrap())
            .await;

        // then (期待する結果):
        assert!(!removed);
        assert_eq!(hub.stats().await.unwrap().connections, 1);
    }

    #[tokio::test]
    async fn test_disconnect_participant_after_hub_stopped() {
        // テスト項目: 停止済みのハブに対してもパニックせず false を返す
        // given (前提条件):
        let hub = create_test_hub();
        let usecase = DisconnectParticipantUseCase::new(hub.clone());
        let alice = register(&hub, "alice").await;
        hub.shutdown().await.unwrap();

        // when (操作):
        let removed = usecase.execute(&alice).await;

        // then (期待する結果):
        assert!(!removed);
    }
}
