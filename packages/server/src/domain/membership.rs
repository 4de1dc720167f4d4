//! Room Membership Table
//!
//! ルーム ID から参加中の接続集合へのマッピング。ハブのディスパッチャだけが所有し、
//! 変更する。ロックは持たず、操作の不可分性はディスパッチャの直列実行で担保する。
//!
//! ## 不変条件
//!
//! - 1 つの接続が同時に属するルームは高々 1 つ（`index` で強制）
//! - 空になったルームの集合は破棄する

use std::collections::HashMap;

use super::{
    connection::Connection,
    entity::MemberInfo,
    error::MembershipError,
    value_object::{ConnectionId, RoomId},
};

/// ルームごとの接続集合
#[derive(Debug, Default)]
pub struct RoomMembershipTable {
    rooms: HashMap<RoomId, HashMap<ConnectionId, Connection>>,
    index: HashMap<ConnectionId, RoomId>,
}

impl RoomMembershipTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 接続を、その接続が束縛されているルームに参加させる
    ///
    /// すでにいずれかのルームに参加している接続 ID の場合は表を変更せずにエラーを返す。
    /// 拒否された `conn` は呼び出し元に返さず、ここで破棄（クローズ）される。
    pub fn join(&mut self, conn: Connection) -> Result<(), MembershipError> {
        if let Some(room_id) = self.index.get(conn.id()) {
            return Err(MembershipError::AlreadyJoined {
                connection_id: conn.id().to_string(),
                room_id: room_id.to_string(),
            });
        }

        let room_id = conn.room_id().clone();
        self.index.insert(conn.id().clone(), room_id.clone());
        self.rooms
            .entry(room_id)
            .or_default()
            .insert(conn.id().clone(), conn);
        Ok(())
    }

    /// 接続をルームから外す（冪等）
    ///
    /// 外した接続はクローズ済みの状態で返す。送信キューはこの時点で破棄扱いになる。
    pub fn leave(&mut self, room_id: &RoomId, connection_id: &ConnectionId) -> Option<Connection> {
        let members = self.rooms.get_mut(room_id)?;
        let conn = members.remove(connection_id)?;
        if members.is_empty() {
            self.rooms.remove(room_id);
        }
        self.index.remove(connection_id);
        conn.close();
        Some(conn)
    }

    /// 配信用のスナップショット（接続への参照の一覧）
    pub fn snapshot(&self, room_id: &RoomId) -> Vec<&Connection> {
        self.rooms
            .get(room_id)
            .map(|members| members.values().collect())
            .unwrap_or_default()
    }

    /// 接続が参加しているルーム
    pub fn room_of(&self, connection_id: &ConnectionId) -> Option<&RoomId> {
        self.index.get(connection_id)
    }

    /// ルームの参加者一覧（接続 ID 順）
    pub fn members(&self, room_id: &RoomId) -> Vec<MemberInfo> {
        let mut members: Vec<MemberInfo> = self
            .snapshot(room_id)
            .into_iter()
            .map(Connection::member_info)
            .collect();
        members.sort_by(|a, b| a.connection_id.cmp(&b.connection_id));
        members
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn connection_count(&self) -> usize {
        self.index.len()
    }

    /// 全ての接続をクローズして取り除く（停止時に使用）
    pub fn drain(&mut self) -> Vec<Connection> {
        self.index.clear();
        self.rooms
            .drain()
            .flat_map(|(_, members)| members.into_values())
            .inspect(|conn| {
                conn.close();
            })
            .collect()
    }
}
