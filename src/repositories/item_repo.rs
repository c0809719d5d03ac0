//! Item repository for async database operations.
//!
//! Provides CRUD operations for the items table using diesel_async.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use jiff::Timestamp;

use crate::common::{ItemQuery, Window};
use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult, DatabaseErrorConverter};
use crate::models::{Item, ItemRow, NewItem, UpdateItem};
use crate::repositories::{EntityStore, ItemStore};
use crate::schema::items;

/// PostgreSQL-backed item store.
///
/// Since `AsyncDbPool` (bb8::Pool) internally uses `Arc`, cloning is cheap.
#[derive(Clone)]
pub struct ItemRepository {
    pool: AsyncDbPool,
}

impl ItemRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

fn to_sql_bound(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[async_trait]
impl EntityStore for ItemRepository {
    type Entity = Item;
    type Query = ItemQuery;

    async fn count(&self, query: &ItemQuery) -> AppResult<u64> {
        let mut conn = self.pool.get().await?;

        let total: i64 = query
            .filter
            .apply(items::table.into_boxed())
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "count items"))?;

        Ok(total.max(0) as u64)
    }

    async fn fetch(&self, query: &ItemQuery, window: Option<Window>) -> AppResult<Vec<Item>> {
        let mut conn = self.pool.get().await?;

        let mut boxed = query.apply(items::table.into_boxed());
        if let Some(window) = window {
            boxed = boxed
                .offset(to_sql_bound(window.offset))
                .limit(to_sql_bound(window.limit));
        }

        let rows = boxed
            .select(ItemRow::as_select())
            .load::<ItemRow>(&mut conn)
            .await
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "list items"))?;

        Ok(rows.into_iter().map(Item::from).collect())
    }
}

#[async_trait]
impl ItemStore for ItemRepository {
    async fn find_by_id(&self, item_id: i32) -> AppResult<Option<Item>> {
        let mut conn = self.pool.get().await?;

        let row = items::table
            .find(item_id)
            .select(ItemRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "find item"))?;

        Ok(row.map(Item::from))
    }

    async fn create(&self, new_item: NewItem) -> AppResult<Item> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(items::table)
            .values(&new_item)
            .returning(ItemRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(Item::from)
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "insert item"))
    }

    async fn update(&self, item_id: i32, changes: UpdateItem) -> AppResult<Option<Item>> {
        let mut conn = self.pool.get().await?;

        let row = diesel::update(items::table.find(item_id))
            .set(changes.into_changeset(Timestamp::now()))
            .returning(ItemRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "update item"))?;

        Ok(row.map(Item::from))
    }

    async fn delete(&self, item_id: i32) -> AppResult<bool> {
        let mut conn = self.pool.get().await?;

        let affected = diesel::delete(items::table.find(item_id))
            .execute(&mut conn)
            .await
            .map_err(AppError::from)?;

        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{ItemFilter, ItemSort, ItemSortField, PaginationParams, SortOrder};
    use diesel::pg::Pg;

    #[test]
    fn test_windowed_listing_sql() {
        let query = ItemQuery::new(
            ItemFilter::new().with_title("apple"),
            Some(ItemSort::new(ItemSortField::Title, SortOrder::Asc)),
        );
        let window = PaginationParams::new(3, 10).unwrap().window();
        let boxed = query
            .apply(items::table.into_boxed())
            .offset(to_sql_bound(window.offset))
            .limit(to_sql_bound(window.limit));
        let sql = diesel::debug_query::<Pg, _>(&boxed).to_string();

        assert!(sql.contains("ILIKE"), "{sql}");
        assert!(sql.contains("ORDER BY"), "{sql}");
        assert!(sql.contains("LIMIT $2 OFFSET $3"), "{sql}");
        assert!(sql.contains("[\"%apple%\", 10, 20]"), "{sql}");
    }

    #[test]
    fn test_count_ignores_order() {
        let query = ItemQuery::new(ItemFilter::new().with_is_active(true), Some(ItemSort::default()));
        let boxed = query.filter.apply(items::table.into_boxed()).count();
        let sql = diesel::debug_query::<Pg, _>(&boxed).to_string();

        assert!(sql.contains("COUNT(*)"), "{sql}");
        assert!(!sql.contains("ORDER BY"), "{sql}");
    }

    #[test]
    fn test_sql_bound_saturates() {
        assert_eq!(to_sql_bound(20), 20);
        assert_eq!(to_sql_bound(u64::MAX), i64::MAX);
    }
}
