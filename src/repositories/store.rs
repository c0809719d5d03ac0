//! Persistence contracts.

use async_trait::async_trait;

use crate::common::{ItemQuery, Window};
use crate::error::AppResult;
use crate::models::{Item, NewItem, UpdateItem};

/// Read side shared by every listable entity.
///
/// [`crate::common::paginate`] is written against this trait only.
#[async_trait]
pub trait EntityStore: Send + Sync {
    type Entity: Send;
    type Query: Send + Sync;

    /// Number of rows matching the query's filter; ordering is ignored.
    async fn count(&self, query: &Self::Query) -> AppResult<u64>;

    /// Rows matching the query in its order, restricted to `window` when
    /// given.
    async fn fetch(&self, query: &Self::Query, window: Option<Window>)
    -> AppResult<Vec<Self::Entity>>;
}

/// Full CRUD contract for items.
#[async_trait]
pub trait ItemStore: EntityStore<Entity = Item, Query = ItemQuery> {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Item>>;

    /// Persist a new item; the store assigns `id` and both timestamps.
    async fn create(&self, new_item: NewItem) -> AppResult<Item>;

    /// Apply the supplied fields and refresh `updated_at`.
    ///
    /// `Ok(None)` when no item has this id.
    async fn update(&self, id: i32, changes: UpdateItem) -> AppResult<Option<Item>>;

    /// `Ok(false)` when no item has this id.
    async fn delete(&self, id: i32) -> AppResult<bool>;
}
