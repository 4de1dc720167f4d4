//! UseCase: ルーム参加者一覧取得処理

use std::sync::Arc;

use crate::domain::{ConnectionHub, MemberInfo, RoomId};

use super::error::QueryError;

/// ルーム参加者一覧取得のユースケース
pub struct GetRoomMembersUseCase {
    /// ConnectionHub（接続管理と配信の抽象化）
    hub: Arc<dyn ConnectionHub>,
}

impl GetRoomMembersUseCase {
    /// 新しい GetRoomMembersUseCase を作成
    pub fn new(hub: Arc<dyn ConnectionHub>) -> Self {
        Self { hub }
    }

    /// ルームの現在の参加者一覧を取得（接続 ID 順）
    ///
    /// 参加者のいないルームは空のリストを返す。
    pub async fn execute(&self, room_id: &RoomId) -> Result<Vec<MemberInfo>, QueryError> {
        Ok(self.hub.members(room_id).await?)
    }
}
