//! Connection hub: a single dispatcher task plus cloneable handles.
//!
//! ## 構成
//!
//! - `Hub::start` がディスパッチャを 1 つだけ起動し、`HubHandle` を返す
//! - `HubHandle` は `ConnectionHub` trait を実装し、要求をコマンドチャンネルで送る
//! - ディスパッチャだけがメンバーシップ表を所有し、要求を受信順に 1 件ずつ処理する
//!
//! 配信は各接続の送信キューに `try_send` するだけなので、遅い受信者がディスパッチャを
//! 止めることはない。キューが満杯の接続はその場で登録解除される。

mod command;
mod dispatcher;
mod handle;

use tokio::{sync::mpsc, task::JoinHandle};

use crate::config::HubConfig;

pub use handle::HubHandle;

use dispatcher::Dispatcher;

/// Entry point for constructing the process-wide hub.
pub struct Hub;

impl Hub {
    /// Spawn the dispatcher on the current tokio runtime.
    ///
    /// The returned handle is the only way to reach the dispatcher; the join
    /// handle resolves once the hub has stopped.
    pub fn start(config: HubConfig) -> (HubHandle, JoinHandle<()>) {
        let (commands_tx, commands_rx) = mpsc::channel(config.command_capacity.max(1));
        let dispatcher = Dispatcher::new(commands_rx);
        let task = tokio::spawn(dispatcher.run());
        (
            HubHandle::new(commands_tx, config.outbound_capacity),
            task,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        domain::{
            BroadcastMessage, ChatMessage, ConnectionHub, ConnectionId, ConnectionSession,
            HubError, MessageContent, RoomId, SenderId, SenderLabel, Timestamp,
        },
        infrastructure::dto::websocket::ChatMessageDto,
    };

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - Hub（ディスパッチャ + HubHandle）の登録・解除・配信
    // - バックプレッシャーによる強制切断
    // - 停止後の振る舞い
    //
    // 【なぜこのテストが必要か】
    // - ルームの分離、ルーム内の順序、遅い受信者の切断はハブの中核的な保証
    // - 重複登録や二重解除がクラッシュせずに無視されることを保証する
    //
    // 【どのようなシナリオをテストするか】
    // 1. 同じルームの全員（送信者を含む）に配信される
    // 2. 別のルームには配信されない
    // 3. 配信順序がルーム内で保たれる
    // 4. キューが満杯の接続は次の配信で登録解除される
    // 5. セッションが破棄された接続は配信を待たずに登録解除される
    // 6. 二重の登録解除・重複登録は安全に無視される
    // 7. shutdown 後は全接続が閉じられ、要求は Stopped になる
    // ========================================

    fn start_test_hub(outbound_capacity: usize) -> (HubHandle, JoinHandle<()>) {
        Hub::start(HubConfig {
            outbound_capacity,
            command_capacity: 16,
        })
    }

    async fn register(hub: &HubHandle, id: &str, room: &str) -> ConnectionSession {
        hub.register(
            RoomId::new(room.to_string()).unwrap(),
            ConnectionId::new(id.to_string()).unwrap(),
            SenderId::new(format!("user-{id}")).unwrap(),
            SenderLabel::new(id.to_string()).unwrap(),
        )
        .await
        .expect("register should succeed")
    }

    fn message(room: &str, sender: &str, content: &str) -> BroadcastMessage {
        BroadcastMessage::unsaved(
            ChatMessage::new(
                RoomId::new(room.to_string()).unwrap(),
                SenderId::new(format!("user-{sender}")).unwrap(),
                SenderLabel::new(sender.to_string()).unwrap(),
                MessageContent::new(content.to_string()).unwrap(),
            ),
            Timestamp::new(1_700_000_000_000),
        )
    }

    async fn next_message(session: &mut ConnectionSession) -> ChatMessageDto {
        let frame = tokio::time::timeout(Duration::from_secs(1), session.queue.recv())
            .await
            .expect("frame should arrive")
            .expect("queue should be open");
        serde_json::from_str(&frame).unwrap()
    }

    #[tokio::test]
    async fn test_dispatch_reaches_every_member_including_sender() {
        // テスト項目: ルームの全参加者（送信者自身を含む）に配信される
        // given (前提条件):
        let (hub, _task) = start_test_hub(8);
        let mut alice = register(&hub, "alice", "room-1").await;
        let mut bob = register(&hub, "bob", "room-1").await;

        // when (操作): alice が "hello" を送信
        let report = hub
            .dispatch(message("room-1", "alice", "hello"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(report.delivered, 2);
        assert!(report.evicted.is_empty());
        for session in [&mut alice, &mut bob] {
            let received = next_message(session).await;
            assert_eq!(received.content, "hello");
            assert_eq!(received.room_id, "room-1");
            assert_eq!(received.user_usn, "alice");
        }
    }

    #[tokio::test]
    async fn test_dispatch_is_isolated_per_room() {
        // テスト項目: 別のルームの参加者には配信されない
        // given (前提条件):
        let (hub, _task) = start_test_hub(8);
        let mut alice = register(&hub, "alice", "room-1").await;
        let bob = register(&hub, "bob", "room-2").await;

        // when (操作): alice が "hi" を送信
        let report = hub.dispatch(message("room-1", "alice", "hi")).await.unwrap();

        // then (期待する結果): bob のキューは空のまま
        assert_eq!(report.delivered, 1);
        assert_eq!(next_message(&mut alice).await.content, "hi");
        assert!(bob.queue.is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_to_empty_room_delivers_nothing() {
        // テスト項目: 参加者のいないルームへの配信はエラーにならない
        // given (前提条件):
        let (hub, _task) = start_test_hub(8);

        // when (操作):
        let report = hub.dispatch(message("nobody", "alice", "echo")).await;

        // then (期待する結果):
        assert_eq!(report, Ok(Default::default()));
    }

    #[tokio::test]
    async fn test_messages_keep_dispatch_order_within_room() {
        // テスト項目: 同じルームのメッセージは配信順に届く
        // given (前提条件):
        let (hub, _task) = start_test_hub(16);
        let mut alice = register(&hub, "alice", "room-1").await;
        let mut bob = register(&hub, "bob", "room-1").await;

        // when (操作):
        for content in ["m1", "m2", "m3"] {
            hub.dispatch(message("room-1", "alice", content))
                .await
                .unwrap();
        }

        // then (期待する結果):
        for session in [&mut alice, &mut bob] {
            let mut received = Vec::new();
            for _ in 0..3 {
                received.push(next_message(session).await.content);
            }
            assert_eq!(received, vec!["m1", "m2", "m3"]);
        }
    }

    #[tokio::test]
    async fn test_full_queue_is_evicted_on_next_dispatch() {
        // テスト項目: キューが満杯のまま読まれない接続は、次の配信で登録解除される
        // given (前提条件): 容量 1 のキューを slow が埋めたまま読まない
        let (hub, _task) = start_test_hub(1);
        let slow = register(&hub, "slow", "room-1").await;
        let mut fast = register(&hub, "fast", "room-1").await;
        hub.dispatch(message("room-1", "fast", "first")).await.unwrap();
        assert_eq!(next_message(&mut fast).await.content, "first");

        // when (操作):
        let report = hub
            .dispatch(message("room-1", "fast", "second"))
            .await
            .unwrap();

        // then (期待する結果): slow だけが切断され、fast には届く
        assert_eq!(report.delivered, 1);
        assert_eq!(
            report.evicted,
            vec![ConnectionId::new("slow".to_string()).unwrap()]
        );
        assert_eq!(next_message(&mut fast).await.content, "second");
        assert!(slow.closed.is_closed());

        let members = hub
            .members(&RoomId::new("room-1".to_string()).unwrap())
            .await
            .unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].connection_id.as_str(), "fast");

        // その後の配信では slow への配信は試みられない
        let report = hub
            .dispatch(message("room-1", "fast", "third"))
            .await
            .unwrap();
        assert_eq!(report.delivered, 1);
        assert!(report.evicted.is_empty());
    }

    #[tokio::test]
    async fn test_dropped_session_is_unregistered_without_dispatch() {
        // テスト項目: セッション側が消えた接続は、配信を待たずにルームから取り除かれる
        // given (前提条件):
        let (hub, _task) = start_test_hub(8);
        let gone = register(&hub, "gone", "room-1").await;

        // when (操作): 登録解除を呼ばずにセッションを破棄する
        drop(gone);

        // then (期待する結果):
        let mut connections = usize::MAX;
        for _ in 0..50 {
            connections = hub.stats().await.unwrap().connections;
            if connections == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(connections, 0);
        let members = hub
            .members(&RoomId::new("room-1".to_string()).unwrap())
            .await
            .unwrap();
        assert!(members.is_empty());
        let report = hub.dispatch(message("room-1", "alice", "hey")).await.unwrap();
        assert_eq!(report.delivered, 0);
        assert!(report.evicted.is_empty());
    }

    #[tokio::test]
    async fn test_unregister_twice_is_idempotent() {
        // テスト項目: 二重の登録解除はエラーにならず、同じ最終状態になる
        // given (前提条件):
        let (hub, _task) = start_test_hub(8);
        let alice = register(&hub, "alice", "room-1").await;
        let id = alice.id.clone();

        // when (操作):
        let first = hub.unregister(&id).await;
        let second = hub.unregister(&id).await;

        // then (期待する結果):
        assert_eq!(first, Ok(true));
        assert_eq!(second, Ok(false));
        assert!(alice.closed.is_closed());
        let stats = hub.stats().await.unwrap();
        assert_eq!(stats.rooms, 0);
        assert_eq!(stats.connections, 0);
    }

    #[tokio::test]
    async fn test_duplicate_register_is_rejected_without_side_effects() {
        // テスト項目: 登録済みの接続 ID での再登録は拒否され、既存の参加は維持される
        // given (前提条件):
        let (hub, _task) = start_test_hub(8);
        let mut alice = register(&hub, "alice", "room-1").await;

        // when (操作): 同じ接続 ID で別のルームに登録を試みる
        let result = hub
            .register(
                RoomId::new("room-2".to_string()).unwrap(),
                ConnectionId::new("alice".to_string()).unwrap(),
                SenderId::new("user-alice".to_string()).unwrap(),
                SenderLabel::new("alice".to_string()).unwrap(),
            )
            .await;

        // then (期待する結果): 1 つの接続は高々 1 つのルームにしか属さない
        assert!(matches!(result, Err(HubError::DuplicateConnection(_))));
        let stats = hub.stats().await.unwrap();
        assert_eq!(stats.rooms, 1);
        assert_eq!(stats.connections, 1);
        hub.dispatch(message("room-1", "bob", "still here"))
            .await
            .unwrap();
        assert_eq!(next_message(&mut alice).await.content, "still here");
    }

    #[tokio::test]
    async fn test_shutdown_closes_connections_and_stops_hub() {
        // テスト項目: shutdown で全接続が閉じられ、以降の要求は Stopped になる
        // given (前提条件):
        let (hub, task) = start_test_hub(8);
        let mut alice = register(&hub, "alice", "room-1").await;
        let bob = register(&hub, "bob", "room-2").await;

        // when (操作):
        hub.shutdown().await.unwrap();

        // then (期待する結果): shutdown が返った時点で停止済みと判定される
        assert!(hub.is_stopped());
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("dispatcher should stop")
            .unwrap();
        assert!(alice.queue.recv().await.is_none());
        assert!(bob.closed.is_closed());
        assert_eq!(hub.stats().await, Err(HubError::Stopped));
        assert_eq!(
            hub.dispatch(message("room-1", "alice", "late")).await,
            Err(HubError::Stopped)
        );
    }
}
