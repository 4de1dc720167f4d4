//! InMemory Message Sink 実装
//!
//! ドメイン層が定義する `MessageSink` / `MessageHistory` trait の具体的な実装。
//! ルーム ID ごとの Vec をインメモリ DB として使用します。
//!
//! ID（UUID v4）と作成時刻は、リレーショナルストアと同様にこの層で採番します。
//! プロセスを再起動すると履歴は失われます。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use hiroba_shared::time::{Clock, SystemClock};
use tokio::sync::Mutex;

use crate::domain::{
    ChatMessage, MessageHistory, MessageId, MessageSink, PersistenceError, RoomId, StoredMessage,
    Timestamp,
};

#[derive(Default)]
struct Store {
    rooms: HashMap<RoomId, Vec<StoredMessage>>,
    total: usize,
}

/// インメモリ Message Sink 実装
pub struct InMemoryMessageSink {
    store: Mutex<Store>,
    /// 保持できるメッセージの総数（`None` は無制限）
    capacity: Option<usize>,
    clock: Arc<dyn Clock>,
}

impl InMemoryMessageSink {
    /// 容量無制限の InMemoryMessageSink を作成
    pub fn new() -> Self {
        Self::with_clock(None, Arc::new(SystemClock))
    }

    /// 容量を指定して作成
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_clock(Some(capacity), Arc::new(SystemClock))
    }

    /// 容量と時計を指定して作成（テスト用に時刻を固定できる）
    pub fn with_clock(capacity: Option<usize>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Mutex::new(Store::default()),
            capacity,
            clock,
        }
    }

    /// 保持しているメッセージの総数
    pub async fn count(&self) -> usize {
        self.store.lock().await.total
    }
}

impl Default for InMemoryMessageSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageSink for InMemoryMessageSink {
    async fn record(&self, message: ChatMessage) -> Result<StoredMessage, PersistenceError> {
        let mut store = self.store.lock().await;
        if self.capacity.is_some_and(|capacity| store.total >= capacity) {
            return Err(PersistenceError::CapacityExceeded);
        }

        let stored = StoredMessage {
            id: MessageId::generate(),
            message,
            created_at: Timestamp::new(self.clock.now_millis()),
        };
        store
            .rooms
            .entry(stored.message.room_id.clone())
            .or_default()
            .push(stored.clone());
        store.total += 1;

        tracing::debug!(
            room_id = %stored.message.room_id,
            message_id = %stored.id,
            "Message recorded"
        );
        Ok(stored)
    }
}

#[async_trait]
impl MessageHistory for InMemoryMessageSink {
    async fn recent(
        &self,
        room_id: &RoomId,
        limit: usize,
    ) -> Result<Vec<StoredMessage>, PersistenceError> {
        let store = self.store.lock().await;
        let messages = store
            .rooms
            .get(room_id)
            .map(|messages| {
                let start = messages.len().saturating_sub(limit);
                messages[start..].to_vec()
            })
            .unwrap_or_default();
        Ok(messages)
    }
}
