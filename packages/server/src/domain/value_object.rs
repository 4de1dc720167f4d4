//! 値オブジェクト
//!
//! 文字列をそのまま引き回さず、生成時に検証済みの型としてドメインに持ち込みます。

use std::fmt;

use uuid::Uuid;

use super::error::ValueObjectError;

/// RoomId の最大長
pub const ROOM_ID_MAX_LEN: usize = 64;
/// SenderId / ConnectionId の最大長
pub const IDENTIFIER_MAX_LEN: usize = 128;
/// SenderLabel の最大長
pub const SENDER_LABEL_MAX_LEN: usize = 64;
/// MessageContent の最大長（文字数）
pub const MESSAGE_CONTENT_MAX_LEN: usize = 2000;

fn validate_identifier(
    field: &'static str,
    value: String,
    max: usize,
) -> Result<String, ValueObjectError> {
    if value.is_empty() {
        return Err(ValueObjectError::Empty(field));
    }
    let len = value.chars().count();
    if len > max {
        return Err(ValueObjectError::TooLong { field, max, actual: len });
    }
    if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ValueObjectError::InvalidCharacter(field));
    }
    Ok(value)
}

macro_rules! string_value_object {
    ($name:ident) => {
        impl $name {
            /// 文字列表現を取得
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// 内部の String を取り出す
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = ValueObjectError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

/// ルーム ID
///
/// ルーム自体は外部（永続化側）が所有するエンティティで、ハブはこの ID だけを扱う。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        validate_identifier("room_id", value, ROOM_ID_MAX_LEN).map(Self)
    }
}

string_value_object!(RoomId);

/// 接続 ID（セッションごとに一意）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        validate_identifier("connection_id", value, IDENTIFIER_MAX_LEN).map(Self)
    }

    /// UUID v4 で新しい接続 ID を生成
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

string_value_object!(ConnectionId);

/// 送信者 ID（認証済みユーザーの識別子）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SenderId(String);

impl SenderId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        validate_identifier("sender_id", value, IDENTIFIER_MAX_LEN).map(Self)
    }
}

string_value_object!(SenderId);

/// 送信者の表示名
///
/// 表示用なので空白は許容するが、前後の空白は取り除く。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SenderLabel(String);

impl SenderLabel {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::Empty("sender_label"));
        }
        let len = trimmed.chars().count();
        if len > SENDER_LABEL_MAX_LEN {
            return Err(ValueObjectError::TooLong {
                field: "sender_label",
                max: SENDER_LABEL_MAX_LEN,
                actual: len,
            });
        }
        if trimmed.chars().any(char::is_control) {
            return Err(ValueObjectError::InvalidCharacter("sender_label"));
        }
        Ok(Self(trimmed.to_string()))
    }
}

string_value_object!(SenderLabel);

/// メッセージ本文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::Empty("content"));
        }
        let len = value.chars().count();
        if len > MESSAGE_CONTENT_MAX_LEN {
            return Err(ValueObjectError::TooLong {
                field: "content",
                max: MESSAGE_CONTENT_MAX_LEN,
                actual: len,
            });
        }
        Ok(Self(value))
    }
}

string_value_object!(MessageContent);

/// タイムスタンプ（Unix エポックからのミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// 永続化側が採番するメッセージ ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
