//! UseCase: ルームのメッセージ履歴取得処理
//!
//! ハブはメッセージを保持しないため、履歴は永続化側（`MessageHistory`）から読み出す。

use std::sync::Arc;

use crate::domain::{MessageHistory, RoomId, StoredMessage};

use super::error::QueryError;

/// 件数の指定がない場合の取得件数
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// 一度に取得できる最大件数
pub const MAX_HISTORY_LIMIT: usize = 200;

/// メッセージ履歴取得のユースケース
pub struct GetRoomMessagesUseCase {
    /// MessageHistory（永続化されたメッセージの読み出し）
    history: Arc<dyn MessageHistory>,
}

impl GetRoomMessagesUseCase {
    /// 新しい GetRoomMessagesUseCase を作成
    pub fn new(history: Arc<dyn MessageHistory>) -> Self {
        Self { history }
    }

    /// ルームの直近のメッセージを古い順に取得
    ///
    /// # Arguments
    ///
    /// * `room_id` - 対象のルーム
    /// * `limit` - 取得件数（`None` は既定値、上限は `MAX_HISTORY_LIMIT`）
    pub async fn execute(
        &self,
        room_id: &RoomId,
        limit: Option<usize>,
    ) -> Result<Vec<StoredMessage>, QueryError> {
        let limit = limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .min(MAX_HISTORY_LIMIT);
        if limit == 0 {
            return Ok(Vec::new());
        }
        Ok(self.history.recent(room_id, limit).await?)
    }
}
