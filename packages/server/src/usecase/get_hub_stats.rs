//! UseCase: ハブ統計取得処理

use std::sync::Arc;

use crate::domain::{ConnectionHub, HubStats};

use super::error::QueryError;

/// ハブ統計取得のユースケース
pub struct GetHubStatsUseCase {
    hub: Arc<dyn ConnectionHub>,
}

impl GetHubStatsUseCase {
    pub fn new(hub: Arc<dyn ConnectionHub>) -> Self {
        Self { hub }
    }

    /// 参加者のいるルーム数と接続数を取得
    pub async fn execute(&self) -> Result<HubStats, QueryError> {
        Ok(self.hub.stats().await?)
    }
}
