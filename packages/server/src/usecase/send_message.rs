//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 永続化 → ルームへの配信、という順序と失敗時の方針
//!
//! ### なぜこのテストが必要か
//! - 記録に成功したメッセージは、永続化側が採番した ID と時刻で配信される
//! - 記録に失敗してもリアルタイム配信は行う（永続性よりも配信を優先する方針）
//! - 送信者にも自分のメッセージが届く
//!
//! ### どのような状況を想定しているか
//! - 正常系：記録と配信
//! - 異常系：永続化の失敗（配信は継続）、停止済みのハブ

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{
    BroadcastMessage, ChatMessage, ConnectionHub, DispatchReport, MessageSink, Timestamp,
};

use super::error::SendMessageError;

/// 送信結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    /// 永続化に成功したか
    pub persisted: bool,
    /// 配信結果
    pub report: DispatchReport,
}

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// MessageSink（永続化の抽象化）
    sink: Arc<dyn MessageSink>,
    /// ConnectionHub（配信の抽象化）
    hub: Arc<dyn ConnectionHub>,
    /// 永続化に失敗したメッセージに付ける時刻
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(
        sink: Arc<dyn MessageSink>,
        hub: Arc<dyn ConnectionHub>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { sink, hub, clock }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `message` - 受信フレームと接続情報から組み立てたメッセージ
    ///
    /// # Returns
    ///
    /// * `Ok(SendOutcome)` - 配信済み（永続化の成否を含む）
    /// * `Err(SendMessageError)` - 配信できなかった
    pub async fn execute(&self, message: ChatMessage) -> Result<SendOutcome, SendMessageError> {
        // 1. 永続化（失敗しても配信は続ける）
        let (broadcast, persisted) = match self.sink.record(message.clone()).await {
            Ok(stored) => (BroadcastMessage::from(stored), true),
            Err(e) => {
                tracing::warn!(
                    room_id = %message.room_id,
                    sender_id = %message.sender_id,
                    "Failed to persist message, broadcasting anyway: {}",
                    e
                );
                let now = Timestamp::new(self.clock.now_millis());
                (BroadcastMessage::unsaved(message, now), false)
            }
        };

        // 2. ルームの参加者全員に配信
        let report = self.hub.dispatch(broadcast).await?;

        Ok(SendOutcome { persisted, report })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use hiroba_shared::time::FixedClock;

    use super::*;
    use crate::{
        config::HubConfig,
        domain::{
            ConnectionId, ConnectionSession, MessageContent, MessageId, MockMessageSink,
            PersistenceError, RoomId, SenderId, SenderLabel, StoredMessage,
        },
        infrastructure::{dto::websocket::ChatMessageDto, hub::Hub},
    };

    fn create_test_hub() -> Arc<dyn ConnectionHub> {
        let (hub, _task) = Hub::start(HubConfig::default());
        Arc::new(hub)
    }

    async fn join(hub: &Arc<dyn ConnectionHub>, id: &str, room: &str) -> ConnectionSession {
        hub.register(
            RoomId::new(room.to_string()).unwrap(),
            ConnectionId::new(id.to_string()).unwrap(),
            SenderId::new(format!("user-{id}")).unwrap(),
            SenderLabel::new(id.to_string()).unwrap(),
        )
        .await
        .unwrap()
    }

    fn chat(room: &str, sender: &str, content: &str) -> ChatMessage {
        ChatMessage::new(
            RoomId::new(room.to_string()).unwrap(),
            SenderId::new(format!("user-{sender}")).unwrap(),
            SenderLabel::new(sender.to_string()).unwrap(),
            MessageContent::new(content.to_string()).unwrap(),
        )
    }

    async fn next_message(session: &mut ConnectionSession) -> ChatMessageDto {
        let frame = tokio::time::timeout(Duration::from_secs(1), session.queue.recv())
            .await
            .expect("frame should arrive")
            .expect("queue should be open");
        serde_json::from_str(&frame).unwrap()
    }

    fn recording_sink(created_at: i64) -> MockMessageSink {
        let mut sink = MockMessageSink::new();
        sink.expect_record().times(1).returning(move |message| {
            Ok(StoredMessage {
                id: MessageId::generate(),
                message,
                created_at: Timestamp::new(created_at),
            })
        });
        sink
    }

    fn failing_sink() -> MockMessageSink {
        let mut sink = MockMessageSink::new();
        sink.expect_record()
            .times(1)
            .returning(|_| Err(PersistenceError::Unavailable("connection refused".to_string())));
        sink
    }

    #[tokio::test]
    async fn test_send_message_records_then_broadcasts_to_room() {
        // テスト項目: 記録されたメッセージがルームの全員（送信者を含む）に届く
        // given (前提条件):
        let hub = create_test_hub();
        let mut alice = join(&hub, "alice", "room-1").await;
        let mut bob = join(&hub, "bob", "room-1").await;
        let usecase = SendMessageUseCase::new(
            Arc::new(recording_sink(1_700_000_000_000)),
            hub.clone(),
            Arc::new(FixedClock::new(0)),
        );

        // when (操作): alice が "hello" を送信
        let outcome = usecase.execute(chat("room-1", "alice", "hello")).await;

        // then (期待する結果):
        let outcome = outcome.unwrap();
        assert!(outcome.persisted);
        assert_eq!(outcome.report.delivered, 2);
        for session in [&mut alice, &mut bob] {
            let received = next_message(session).await;
            assert_eq!(received.content, "hello");
            assert_eq!(received.room_id, "room-1");
            assert!(received.id.is_some());
            assert_eq!(received.created_at, "2023-11-14T22:13:20.000Z");
        }
    }

    #[tokio::test]
    async fn test_send_message_broadcasts_even_if_persistence_fails() {
        // テスト項目: 永続化に失敗しても他の参加者にメッセージが届く
        // given (前提条件):
        let hub = create_test_hub();
        let _alice = join(&hub, "alice", "room-1").await;
        let mut bob = join(&hub, "bob", "room-1").await;
        let usecase = SendMessageUseCase::new(
            Arc::new(failing_sink()),
            hub.clone(),
            Arc::new(FixedClock::new(1_672_531_200_000)),
        );

        // when (操作):
        let outcome = usecase.execute(chat("room-1", "alice", "hello")).await;

        // then (期待する結果): ID なし・ローカル時刻で配信される
        let outcome = outcome.unwrap();
        assert!(!outcome.persisted);
        assert_eq!(outcome.report.delivered, 2);
        let received = next_message(&mut bob).await;
        assert_eq!(received.content, "hello");
        assert_eq!(received.id, None);
        assert_eq!(received.created_at, "2023-01-01T00:00:00.000Z");
    }

    #[tokio::test]
    async fn test_send_message_does_not_leak_to_other_rooms() {
        // テスト項目: 別のルームの参加者にはメッセージが届かない
        // given (前提条件):
        let hub = create_test_hub();
        let _alice = join(&hub, "alice", "room-1").await;
        let bob = join(&hub, "bob", "room-2").await;
        let usecase = SendMessageUseCase::new(
            Arc::new(recording_sink(0)),
            hub.clone(),
            Arc::new(FixedClock::new(0)),
        );

        // when (操作): alice が "hi" を送信
        let outcome = usecase.execute(chat("room-1", "alice", "hi")).await.unwrap();

        // then (期待する結果):
        assert_eq!(outcome.report.delivered, 1);
        assert!(bob.queue.is_empty());
    }

    #[tokio::test]
    async fn test_send_message_hub_stopped() {
        // テスト項目: 停止済みのハブでは HubUnavailable が返る
        // given (前提条件):
        let hub = create_test_hub();
        hub.shutdown().await.unwrap();
        let usecase = SendMessageUseCase::new(
            Arc::new(recording_sink(0)),
            hub.clone(),
            Arc::new(FixedClock::new(0)),
        );

        // when (操作):
        let result = usecase.execute(chat("room-1", "alice", "hello")).await;

        // then (期待する結果):
        assert_eq!(result, Err(SendMessageError::HubUnavailable));
    }
}
