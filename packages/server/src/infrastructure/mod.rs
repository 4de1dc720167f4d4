//! Infrastructure 層
//!
//! - `hub`: 単一ディスパッチャによる `ConnectionHub` 実装
//! - `sink`: `MessageSink` / `MessageHistory` 実装
//! - `dto`: WebSocket / HTTP の入出力形式

pub mod dto;
pub mod hub;
pub mod sink;
