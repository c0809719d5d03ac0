//! Broadcast chat over WebSocket connections.

mod hub;

pub use hub::{ChatHub, ChatSession, ClientId};
