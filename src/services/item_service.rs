//! Item service for business logic operations.
//!
//! Validates input before it reaches the store and composes listing queries
//! in a fixed order: filter, then sort, then the page window.

use std::sync::Arc;

use crate::common::{ItemFilter, ItemQuery, ItemSort, PaginationParams, paginate};
use crate::error::{AppError, AppResult};
use crate::models::{Item, NewItem, TITLE_MAX_LEN, UpdateItem};
use crate::repositories::ItemStore;

/// Item service over any [`ItemStore`].
///
/// Cloning is cheap; the store is shared behind an `Arc`.
#[derive(Clone)]
pub struct ItemService {
    store: Arc<dyn ItemStore>,
}

impl ItemService {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }

    /// Gets an item by id.
    ///
    /// # Returns
    /// `None` when no item has this id; absence is not an error here.
    pub async fn get(&self, id: i32) -> AppResult<Option<Item>> {
        self.store.find_by_id(id).await
    }

    /// Lists items.
    ///
    /// With `pagination`, the total comes from a separate count of the
    /// filtered rows. Without it every matching row is returned and the
    /// total is simply their number.
    ///
    /// # Returns
    /// A tuple of (items, total)
    pub async fn get_multi(
        &self,
        pagination: Option<&PaginationParams>,
        filters: Option<ItemFilter>,
        sort: Option<ItemSort>,
    ) -> AppResult<(Vec<Item>, u64)> {
        let query = ItemQuery::new(filters.unwrap_or_default(), sort);

        if let Some(params) = pagination {
            return paginate(self.store.as_ref(), &query, params).await;
        }

        let items = self.store.fetch(&query, None).await?;
        let total = items.len() as u64;
        Ok((items, total))
    }

    /// Number of items matching `filters`, without fetching them.
    pub async fn count(&self, filters: Option<ItemFilter>) -> AppResult<u64> {
        let query = ItemQuery::new(filters.unwrap_or_default(), None);
        self.store.count(&query).await
    }

    /// Deletes every item one by one, returning how many were removed.
    pub async fn clear(&self) -> AppResult<usize> {
        let items = self.store.fetch(&ItemQuery::default(), None).await?;
        let mut removed = 0;
        for item in items {
            if self.store.delete(item.id).await? {
                removed += 1;
            }
        }
        tracing::info!(removed, "Items cleared");
        Ok(removed)
    }

    /// Creates an item after checking its title.
    ///
    /// # Errors
    /// `AppError::Validation` for an empty or over-long title; the store is
    /// not touched in that case.
    pub async fn create(&self, new_item: NewItem) -> AppResult<Item> {
        validate_title(&new_item.title)?;

        let item = self.store.create(new_item).await?;
        tracing::info!(item_id = item.id, "Item created");
        Ok(item)
    }

    /// Updates the supplied fields of an item.
    ///
    /// # Returns
    /// `None` when no item has this id
    pub async fn update(&self, id: i32, changes: UpdateItem) -> AppResult<Option<Item>> {
        if let Some(title) = &changes.title {
            validate_title(title)?;
        }

        let updated = self.store.update(id, changes).await?;
        if updated.is_some() {
            tracing::info!(item_id = id, "Item updated");
        }
        Ok(updated)
    }

    /// Deletes an item, returning `false` if it did not exist.
    pub async fn delete(&self, id: i32) -> AppResult<bool> {
        let deleted = self.store.delete(id).await?;
        if deleted {
            tracing::info!(item_id = id, "Item deleted");
        }
        Ok(deleted)
    }
}

fn validate_title(title: &str) -> AppResult<()> {
    let len = title.chars().count();
    if len == 0 {
        return Err(AppError::validation("title", "Title must not be empty"));
    }
    if len > TITLE_MAX_LEN {
        return Err(AppError::validation(
            "title",
            format!("Title must be at most {TITLE_MAX_LEN} characters"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{ItemSortField, SortOrder};
    use crate::repositories::InMemoryItemStore;
    use std::time::Duration;

    fn service() -> ItemService {
        ItemService::new(Arc::new(InMemoryItemStore::new()))
    }

    async fn seeded(titles: &[&str]) -> ItemService {
        let service = service();
        for title in titles {
            service.create(NewItem::new(*title)).await.unwrap();
        }
        service
    }

    fn titles(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_count_and_clear() {
        let service = seeded(&["Apple", "Banana", "Cherry"]).await;
        assert_eq!(service.count(None).await.unwrap(), 3);
        assert_eq!(
            service
                .count(Some(ItemFilter::new().with_title("an")))
                .await
                .unwrap(),
            1
        );

        assert_eq!(service.clear().await.unwrap(), 3);
        assert_eq!(service.count(None).await.unwrap(), 0);
        assert_eq!(service.clear().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let service = service();
        let created = service
            .create(NewItem::new("Sample").with_description("A sample item"))
            .await
            .unwrap();

        let fetched = service.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "Sample");
        assert_eq!(fetched.description.as_deref(), Some("A sample item"));
        assert!(fetched.is_active);
        assert_eq!(fetched.created_at, fetched.updated_at);
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_get_unknown_is_none() {
        assert!(service().get(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_bad_titles() {
        let service = service();

        let empty = service.create(NewItem::new("")).await;
        assert!(matches!(empty, Err(AppError::Validation { ref field, .. }) if field == "title"));

        let long = service.create(NewItem::new("x".repeat(256))).await;
        assert!(matches!(long, Err(AppError::Validation { .. })));

        let (items, total) = service.get_multi(None, None, None).await.unwrap();
        assert!(items.is_empty());
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_title_length_counts_characters() {
        let service = service();
        let title = "é".repeat(255);
        assert!(service.create(NewItem::new(title)).await.is_ok());
    }

    #[tokio::test]
    async fn test_filter_by_title() {
        let service = seeded(&["Apple", "Banana", "Cherry"]).await;
        let filter = ItemFilter::new().with_title("apple");

        let (items, total) = service.get_multi(None, Some(filter), None).await.unwrap();
        assert_eq!(titles(&items), ["Apple"]);
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn test_filter_by_is_active() {
        let service = service();
        service.create(NewItem::new("on")).await.unwrap();
        service.create(NewItem::new("off").active(false)).await.unwrap();

        let filter = ItemFilter::new().with_is_active(false);
        let (items, _) = service.get_multi(None, Some(filter), None).await.unwrap();
        assert!(items.iter().all(|i| !i.is_active));
        assert_eq!(titles(&items), ["off"]);
    }

    #[tokio::test]
    async fn test_sort_by_title_ascending() {
        let service = seeded(&["Zebra", "Apple", "Mango"]).await;
        let sort = ItemSort::new(ItemSortField::Title, SortOrder::Asc);

        let (items, _) = service.get_multi(None, None, Some(sort)).await.unwrap();
        assert_eq!(titles(&items), ["Apple", "Mango", "Zebra"]);
    }

    #[tokio::test]
    async fn test_unknown_sort_field_keeps_baseline_order() {
        let service = seeded(&["Zebra", "Apple", "Mango"]).await;
        let sort = ItemSort::from_raw(Some("nonexistent_field"), SortOrder::Asc);

        let (items, total) = service.get_multi(None, None, Some(sort)).await.unwrap();
        assert_eq!(titles(&items), ["Zebra", "Apple", "Mango"]);
        assert_eq!(total, 3);
    }

    #[tokio::test]
    async fn test_paginated_listing() {
        let names: Vec<String> = (1..=25).map(|n| format!("item {n:02}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let service = seeded(&refs).await;
        let params = PaginationParams::new(3, 10).unwrap();
        let sort = ItemSort::new(ItemSortField::Title, SortOrder::Asc);

        let (items, total) = service
            .get_multi(Some(&params), None, Some(sort))
            .await
            .unwrap();
        assert_eq!(total, 25);
        assert_eq!(titles(&items), ["item 21", "item 22", "item 23", "item 24", "item 25"]);
    }

    #[tokio::test]
    async fn test_update_title_only() {
        let service = service();
        let created = service
            .create(NewItem::new("Before").with_description("keep me").active(false))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;

        let changes = UpdateItem {
            title: Some("After".to_string()),
            ..Default::default()
        };
        let updated = service.update(created.id, changes).await.unwrap().unwrap();

        assert_eq!(updated.title, "After");
        assert_eq!(updated.description.as_deref(), Some("keep me"));
        assert!(!updated.is_active);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn test_update_validates_title() {
        let service = seeded(&["Sample"]).await;
        let changes = UpdateItem {
            title: Some(String::new()),
            ..Default::default()
        };

        assert!(matches!(
            service.update(1, changes).await,
            Err(AppError::Validation { .. })
        ));
        assert_eq!(service.get(1).await.unwrap().unwrap().title, "Sample");
    }

    #[tokio::test]
    async fn test_update_unknown_is_none() {
        let changes = UpdateItem {
            is_active: Some(false),
            ..Default::default()
        };
        assert!(service().update(42, changes).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let service = seeded(&["Sample"]).await;
        assert!(service.delete(1).await.unwrap());
        assert!(service.get(1).await.unwrap().is_none());
        assert!(!service.delete(99999).await.unwrap());
    }
}
