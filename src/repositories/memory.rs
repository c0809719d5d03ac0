//! In-memory item store for development and testing

use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use jiff::Timestamp;

use crate::common::{ItemQuery, Window};
use crate::error::AppResult;
use crate::models::{Item, NewItem, UpdateItem};
use crate::repositories::{EntityStore, ItemStore};

/// Process-local item store with the same observable behavior as
/// [`super::ItemRepository`]. Contents are lost on restart.
pub struct InMemoryItemStore {
    items: DashMap<i32, Item>,
    id_counter: AtomicI32,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self {
            items: DashMap::new(),
            id_counter: AtomicI32::new(1),
        }
    }

    fn matching(&self, query: &ItemQuery) -> Vec<Item> {
        self.items
            .iter()
            .filter(|entry| query.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect()
    }
}

impl Default for InMemoryItemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntityStore for InMemoryItemStore {
    type Entity = Item;
    type Query = ItemQuery;

    async fn count(&self, query: &ItemQuery) -> AppResult<u64> {
        Ok(self.matching(query).len() as u64)
    }

    async fn fetch(&self, query: &ItemQuery, window: Option<Window>) -> AppResult<Vec<Item>> {
        let mut found = self.matching(query);
        found.sort_by(|a, b| query.compare(a, b));

        let Some(window) = window else {
            return Ok(found);
        };
        let offset = usize::try_from(window.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(window.limit).unwrap_or(usize::MAX);
        Ok(found.into_iter().skip(offset).take(limit).collect())
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Item>> {
        Ok(self.items.get(&id).map(|item| item.clone()))
    }

    async fn create(&self, new_item: NewItem) -> AppResult<Item> {
        let id = self.id_counter.fetch_add(1, Ordering::SeqCst);
        let now = Timestamp::now();
        let item = Item {
            id,
            title: new_item.title,
            description: new_item.description,
            is_active: new_item.is_active,
            created_at: now,
            updated_at: now,
        };
        self.items.insert(id, item.clone());
        Ok(item)
    }

    async fn update(&self, id: i32, changes: UpdateItem) -> AppResult<Option<Item>> {
        let Some(mut item) = self.items.get_mut(&id) else {
            return Ok(None);
        };
        changes.apply_to(&mut item);
        item.updated_at = Timestamp::now();
        Ok(Some(item.clone()))
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        Ok(self.items.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{ItemFilter, ItemSort, ItemSortField, SortOrder};

    async fn seeded() -> InMemoryItemStore {
        let store = InMemoryItemStore::new();
        store.create(NewItem::new("Zebra")).await.unwrap();
        store.create(NewItem::new("Apple").active(false)).await.unwrap();
        store.create(NewItem::new("Mango")).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_ids_are_sequential() {
        let store = seeded().await;
        let ids: Vec<_> = store
            .fetch(&ItemQuery::default(), None)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, [1, 2, 3]);
    }

    #[tokio::test]
    async fn test_count_applies_filter_only() {
        let store = seeded().await;
        let query = ItemQuery::new(
            ItemFilter::new().with_is_active(true),
            Some(ItemSort::new(ItemSortField::Title, SortOrder::Asc)),
        );
        assert_eq!(store.count(&query).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_fetch_sorts_then_windows() {
        let store = seeded().await;
        let query = ItemQuery::new(
            ItemFilter::new(),
            Some(ItemSort::new(ItemSortField::Title, SortOrder::Asc)),
        );
        let page = store
            .fetch(&query, Some(Window { offset: 1, limit: 5 }))
            .await
            .unwrap();

        let titles: Vec<_> = page.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["Mango", "Zebra"]);
    }

    #[tokio::test]
    async fn test_title_sort_ignores_case() {
        let store = InMemoryItemStore::new();
        for title in ["banana", "Apple", "cherry", "Zebra"] {
            store.create(NewItem::new(title)).await.unwrap();
        }
        let query = ItemQuery::new(
            ItemFilter::new(),
            Some(ItemSort::new(ItemSortField::Title, SortOrder::Asc)),
        );

        let titles: Vec<_> = store
            .fetch(&query, None)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.title)
            .collect();
        assert_eq!(titles, ["Apple", "banana", "cherry", "Zebra"]);
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let store = seeded().await;
        let result = store.update(99, UpdateItem::default()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_reports_presence() {
        let store = seeded().await;
        assert!(store.delete(2).await.unwrap());
        assert!(!store.delete(2).await.unwrap());
        assert!(store.find_by_id(2).await.unwrap().is_none());
    }
}
