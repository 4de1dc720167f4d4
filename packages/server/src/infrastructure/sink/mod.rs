//! Persistence sink implementations
//!
//! - `inmemory`: プロセス内のメモリに追記する実装
//! - 将来的に: PostgreSQL など

pub mod inmemory;

pub use inmemory::InMemoryMessageSink;
