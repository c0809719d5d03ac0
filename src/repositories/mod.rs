//! Repository layer for data access operations.
//!
//! Stores implement the [`ItemStore`] contract; the rest of the crate only
//! sees `Arc<dyn ItemStore>`.

mod item_repo;
mod memory;
mod store;

pub use item_repo::ItemRepository;
pub use memory::InMemoryItemStore;
pub use store::{EntityStore, ItemStore};

use std::sync::Arc;

use crate::config::{DatabaseConfig, StoreBackend};
use crate::db::{AsyncDbPool, establish_async_connection_pool};
use crate::error::AppResult;

/// Aggregates all repositories for convenient access.
///
/// Cloning is cheap: every store sits behind an `Arc`.
#[derive(Clone)]
pub struct Repositories {
    pub items: Arc<dyn ItemStore>,
}

impl Repositories {
    /// Repositories backed by PostgreSQL
    pub fn postgres(pool: AsyncDbPool) -> Self {
        Self {
            items: Arc::new(ItemRepository::new(pool)),
        }
    }

    /// Process-local repositories, empty on every start
    pub fn in_memory() -> Self {
        Self {
            items: Arc::new(InMemoryItemStore::new()),
        }
    }

    /// Repositories for the configured backend, plus the pool when there is
    /// one.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<(Self, Option<AsyncDbPool>)> {
        match config.backend {
            StoreBackend::Postgres => {
                tracing::info!("Initializing database connection pool...");
                let pool = establish_async_connection_pool(config).await?;
                Ok((Self::postgres(pool.clone()), Some(pool)))
            }
            StoreBackend::Memory => {
                tracing::warn!("Using the in-memory item store; data is lost on exit");
                Ok((Self::in_memory(), None))
            }
        }
    }
}
