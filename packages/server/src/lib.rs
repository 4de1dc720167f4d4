//! Hiroba room chat server library.
//!
//! Participants connect over WebSocket and join exactly one room; every message
//! a participant sends is recorded on a best-effort basis and fanned out to all
//! current members of that room by a single hub dispatcher.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
