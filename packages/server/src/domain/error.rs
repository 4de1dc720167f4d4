//! ドメイン層のエラー型

use thiserror::Error;

/// 値オブジェクトの検証エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{field} is too long ({actual} > {max} characters)")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("{0} contains invalid characters")]
    InvalidCharacter(&'static str),
}

/// 送信キューへの投入エラー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EnqueueError {
    /// 送信キューが満杯（受信側が遅い）
    #[error("outbound queue is full")]
    Backpressure,

    /// 接続はすでに閉じられている
    #[error("connection is closed")]
    Closed,
}

/// メンバーシップ表の操作エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MembershipError {
    /// 接続がすでにいずれかのルームに参加している
    #[error("connection '{connection_id}' already joined room '{room_id}'")]
    AlreadyJoined {
        connection_id: String,
        room_id: String,
    },
}

/// 永続化（外部コラボレーター）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    #[error("message store is unavailable: {0}")]
    Unavailable(String),

    #[error("message store capacity exceeded")]
    CapacityExceeded,
}

/// ハブへのリクエストエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HubError {
    /// 同じ接続 ID がすでに登録されている
    #[error("connection '{0}' is already registered")]
    DuplicateConnection(String),

    /// ハブが停止している（ディスパッチャが終了済み）
    #[error("hub is stopped")]
    Stopped,

    /// メッセージのシリアライズに失敗
    #[error("failed to serialize message: {0}")]
    Serialization(String),
}
