//! Application state for Axum web framework.
//!
//! Contains shared services and resources that are accessible
//! across all request handlers.

use crate::chat::ChatHub;
use crate::db::AsyncDbPool;
use crate::services::Services;

/// Application state containing all shared services and resources.
///
/// Cloning is cheap: every field is a handle over shared state.
#[derive(Clone)]
pub struct AppState {
    /// All business logic services
    pub services: Services,
    /// Connection pool for health checks; `None` on the in-memory backend
    pub db_pool: Option<AsyncDbPool>,
    /// Broadcast chat shared by every WebSocket connection
    pub chat: ChatHub,
}

impl AppState {
    pub fn new(services: Services, db_pool: Option<AsyncDbPool>, chat: ChatHub) -> Self {
        Self {
            services,
            db_pool,
            chat,
        }
    }
}
