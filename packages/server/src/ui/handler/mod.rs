//! Request handlers.

mod http;
mod websocket;

pub use http::{get_hub_stats, get_room_members, get_room_messages, health_check};
pub use websocket::websocket_handler;
