//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::{HubError, PersistenceError};

/// 参加者接続のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    /// 同じ接続 ID がすでに登録されている
    #[error("connection '{0}' is already registered")]
    DuplicateConnection(String),

    /// ハブが停止している
    #[error("hub is unavailable")]
    HubUnavailable,
}

impl From<HubError> for ConnectError {
    fn from(e: HubError) -> Self {
        match e {
            HubError::DuplicateConnection(id) => Self::DuplicateConnection(id),
            HubError::Stopped | HubError::Serialization(_) => Self::HubUnavailable,
        }
    }
}

/// メッセージ送信のエラー
///
/// 永続化の失敗はここに含まれない（記録できなくても配信は行う）。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    /// ハブが停止している
    #[error("hub is unavailable")]
    HubUnavailable,

    /// 配信用のシリアライズに失敗
    #[error("failed to encode message: {0}")]
    Encoding(String),
}

impl From<HubError> for SendMessageError {
    fn from(e: HubError) -> Self {
        match e {
            HubError::Serialization(reason) => Self::Encoding(reason),
            HubError::Stopped | HubError::DuplicateConnection(_) => Self::HubUnavailable,
        }
    }
}

/// 参照系ユースケースのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// ハブが停止している
    #[error("hub is unavailable")]
    HubUnavailable,

    /// 永続化側からの読み出しに失敗
    #[error("message store error: {0}")]
    Storage(#[from] PersistenceError),
}

impl From<HubError> for QueryError {
    fn from(_: HubError) -> Self {
        Self::HubUnavailable
    }
}
