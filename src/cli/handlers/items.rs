//! Item maintenance commands: seed, list, count and clear

use std::io::BufRead;

use anyhow::Context;

use crate::common::{ItemSort, ItemSortField, PaginationParams, SortOrder};
use crate::config::StoreBackend;
use crate::config::settings::Settings;
use crate::error::AppResult;
use crate::models::{Item, NewItem};
use crate::repositories::Repositories;
use crate::services::ItemService;

const LIST_TITLE_WIDTH: usize = 50;

pub struct ItemsCommandHandler {
    items: ItemService,
}

impl ItemsCommandHandler {
    pub fn new(items: ItemService) -> Self {
        Self { items }
    }

    /// Handler over the store `settings` configure.
    ///
    /// The memory backend starts empty and is dropped on exit, so only
    /// postgres makes these commands useful.
    pub async fn connect(settings: &Settings) -> AppResult<Self> {
        settings.database.validate()?;
        if settings.database.backend == StoreBackend::Memory {
            tracing::warn!("Item commands against the memory backend do not persist anything");
        }
        let (repos, _pool) = Repositories::connect(&settings.database).await?;
        Ok(Self::new(ItemService::new(repos.items)))
    }

    /// Create `count` sample items; even-numbered ones are active.
    pub async fn seed(&self, count: u32) -> AppResult<Vec<Item>> {
        println!("Creating {count} sample items...");

        let mut created = Vec::with_capacity(count as usize);
        for i in 1..=count {
            let new_item = NewItem::new(format!("Sample Item {i}"))
                .with_description(format!("This is sample item number {i}"))
                .active(i % 2 == 0);
            created.push(self.items.create(new_item).await?);
        }

        println!("✓ Created {} items", created.len());
        Ok(created)
    }

    /// Print up to `limit` items ordered by id.
    pub async fn list(&self, limit: u32) -> AppResult<Vec<Item>> {
        let params = PaginationParams::new(1, limit)?;
        let sort = ItemSort::new(ItemSortField::Id, SortOrder::Asc);
        let (items, total) = self.items.get_multi(Some(&params), None, Some(sort)).await?;

        if items.is_empty() {
            println!("No items found");
            return Ok(items);
        }

        println!("Showing {} of {total} item(s):", items.len());
        for item in &items {
            println!("  {}", item_line(item));
        }
        Ok(items)
    }

    pub async fn count(&self) -> AppResult<u64> {
        let total = self.items.count(None).await?;
        println!("Total items: {total}");
        Ok(total)
    }

    /// Delete every item after a `[y/N]` confirmation read from `input`.
    ///
    /// Returns `None` when the user declines.
    pub async fn clear(&self, yes: bool, input: &mut impl BufRead) -> AppResult<Option<usize>> {
        if !yes {
            println!("This deletes every item. Continue? [y/N]");
            let mut answer = String::new();
            input
                .read_line(&mut answer)
                .context("Failed to read confirmation")?;
            if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
                println!("Cancelled");
                return Ok(None);
            }
        }

        let removed = self.items.clear().await?;
        println!("✓ Deleted {removed} item(s)");
        Ok(Some(removed))
    }
}

/// One listing row: id, status mark, truncated title and creation time.
fn item_line(item: &Item) -> String {
    let mark = if item.is_active { '✓' } else { '✗' };
    let title = truncate(&item.title, LIST_TITLE_WIDTH);
    format!(
        "[{}] {mark} {title} ({})",
        item.id,
        item.created_at.strftime("%Y-%m-%d %H:%M")
    )
}

fn truncate(text: &str, width: usize) -> String {
    match text.char_indices().nth(width) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryItemStore;
    use std::io::Cursor;
    use std::sync::Arc;

    fn handler() -> ItemsCommandHandler {
        ItemsCommandHandler::new(ItemService::new(Arc::new(InMemoryItemStore::new())))
    }

    #[tokio::test]
    async fn test_seed_alternates_active_flag() {
        let handler = handler();
        let created = handler.seed(4).await.unwrap();

        assert_eq!(created.len(), 4);
        assert_eq!(created[0].title, "Sample Item 1");
        assert_eq!(
            created[2].description.as_deref(),
            Some("This is sample item number 3")
        );
        let active: Vec<bool> = created.iter().map(|item| item.is_active).collect();
        assert_eq!(active, [false, true, false, true]);
        assert_eq!(handler.count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_list_respects_limit_and_id_order() {
        let handler = handler();
        handler.seed(7).await.unwrap();

        let listed = handler.list(3).await.unwrap();
        let ids: Vec<i32> = listed.iter().map(|item| item.id).collect();
        assert_eq!(ids, [1, 2, 3]);
    }

    #[tokio::test]
    async fn test_list_rejects_oversized_limit() {
        assert!(handler().list(101).await.is_err());
    }

    #[tokio::test]
    async fn test_clear_cancelled_keeps_items() {
        let handler = handler();
        handler.seed(3).await.unwrap();

        let mut input = Cursor::new("n\n");
        assert_eq!(handler.clear(false, &mut input).await.unwrap(), None);
        assert_eq!(handler.count().await.unwrap(), 3);

        let mut input = Cursor::new("");
        assert_eq!(handler.clear(false, &mut input).await.unwrap(), None);
        assert_eq!(handler.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_clear_confirmed() {
        let handler = handler();
        handler.seed(3).await.unwrap();

        let mut input = Cursor::new("Y\n");
        assert_eq!(handler.clear(false, &mut input).await.unwrap(), Some(3));
        assert_eq!(handler.count().await.unwrap(), 0);

        handler.seed(2).await.unwrap();
        let mut input = Cursor::new("");
        assert_eq!(handler.clear(true, &mut input).await.unwrap(), Some(2));
    }

    #[test]
    fn test_item_line_truncates_long_titles() {
        let item = Item {
            id: 7,
            title: "x".repeat(60),
            description: None,
            is_active: true,
            created_at: "2026-03-01T09:30:00Z".parse().unwrap(),
            updated_at: "2026-03-01T09:30:00Z".parse().unwrap(),
        };

        let line = item_line(&item);
        assert_eq!(
            line,
            format!("[7] ✓ {}... (2026-03-01 09:30)", "x".repeat(50))
        );
        assert_eq!(truncate("short", 50), "short");
    }
}
