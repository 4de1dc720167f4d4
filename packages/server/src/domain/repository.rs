//! Repository trait 定義
//!
//! メッセージ履歴の永続化はハブの外側にある外部コラボレーター（リレーショナルストアなど）
//! の責務です。ドメイン層はそのインターフェースだけを定義し、具体的な実装は
//! Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    entity::{ChatMessage, StoredMessage},
    error::PersistenceError,
    value_object::RoomId,
};

/// Message Sink trait
///
/// 受信したメッセージを永続的に追記する。ID と作成時刻は実装側が採番する。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// メッセージを記録
    async fn record(&self, message: ChatMessage) -> Result<StoredMessage, PersistenceError>;
}

/// Message History trait
///
/// 永続化されたメッセージの読み出し。ハブ自身は履歴を保持しないため、履歴の問い合わせは
/// 永続化側に対して行う。
#[async_trait]
pub trait MessageHistory: Send + Sync {
    /// ルームの直近 `limit` 件を古い順に取得
    async fn recent(
        &self,
        room_id: &RoomId,
        limit: usize,
    ) -> Result<Vec<StoredMessage>, PersistenceError>;
}
