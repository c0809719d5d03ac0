//! Pagination specification, paged results, and the count-then-fetch composer.

use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::repositories::EntityStore;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// A validated 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationParams {
    page: u32,
    page_size: u32,
}

impl PaginationParams {
    /// Validates `page >= 1` and `1 <= page_size <= 100`.
    ///
    /// # Errors
    /// `AppError::Validation` naming the offending field.
    pub fn new(page: u32, page_size: u32) -> AppResult<Self> {
        if page < 1 {
            return Err(AppError::validation("page", "Page must be at least 1"));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(AppError::validation(
                "page_size",
                format!("Page size must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }
        Ok(Self { page, page_size })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Rows skipped before this page
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }

    pub fn window(&self) -> Window {
        Window {
            offset: self.offset(),
            limit: self.limit(),
        }
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Row range handed to a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: u64,
    pub limit: u64,
}

/// One page of results plus the metadata needed to navigate the rest.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PagedResponse<T> {
    /// Entities on this page
    pub items: Vec<T>,

    /// Matching rows across all pages
    #[schema(example = 42)]
    pub total: u64,

    #[schema(example = 1)]
    pub page: u32,

    #[schema(example = 20)]
    pub page_size: u32,

    /// `ceil(total / page_size)`, zero when nothing matched
    #[schema(example = 3)]
    pub total_pages: u64,
}

impl<T> PagedResponse<T> {
    pub fn new(items: Vec<T>, total: u64, params: &PaginationParams) -> Self {
        Self {
            items,
            total,
            page: params.page(),
            page_size: params.page_size(),
            total_pages: total.div_ceil(params.limit()),
        }
    }

    /// Convert the page's items, keeping the metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagedResponse<U> {
        PagedResponse {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}

/// Count the rows matching `query`, then fetch the requested window.
///
/// The two reads run back to back without a spanning transaction, so a
/// concurrent write can make `total` disagree with the page by a row.
pub async fn paginate<S>(
    store: &S,
    query: &S::Query,
    params: &PaginationParams,
) -> AppResult<(Vec<S::Entity>, u64)>
where
    S: EntityStore + ?Sized,
{
    let total = store.count(query).await?;
    let items = store.fetch(query, Some(params.window())).await?;
    Ok((items, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ItemQuery;
    use crate::models::NewItem;
    use crate::repositories::{InMemoryItemStore, ItemStore};
    use proptest::prelude::*;

    #[test]
    fn test_defaults() {
        let params = PaginationParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), 20);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(matches!(
            PaginationParams::new(0, 20),
            Err(AppError::Validation { ref field, .. }) if field == "page"
        ));
        assert!(matches!(
            PaginationParams::new(1, 0),
            Err(AppError::Validation { ref field, .. }) if field == "page_size"
        ));
        assert!(matches!(
            PaginationParams::new(1, 101),
            Err(AppError::Validation { ref field, .. }) if field == "page_size"
        ));
        assert!(PaginationParams::new(1, 100).is_ok());
    }

    #[test]
    fn test_empty_result_has_no_pages() {
        let params = PaginationParams::new(1, 10).unwrap();
        let page: PagedResponse<i32> = PagedResponse::new(vec![], 0, &params);
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_map_keeps_metadata() {
        let params = PaginationParams::new(2, 2).unwrap();
        let page = PagedResponse::new(vec![1, 2], 5, &params).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.total, 5);
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 3);
    }

    proptest! {
        #[test]
        fn prop_offset_and_limit(page in 1u32..100_000, page_size in 1u32..=100) {
            let params = PaginationParams::new(page, page_size).unwrap();
            prop_assert_eq!(params.offset(), (page as u64 - 1) * page_size as u64);
            prop_assert_eq!(params.limit(), page_size as u64);
        }

        #[test]
        fn prop_total_pages_is_ceiling(total in 0u64..1_000_000, page_size in 1u32..=100) {
            let params = PaginationParams::new(1, page_size).unwrap();
            let page: PagedResponse<()> = PagedResponse::new(vec![], total, &params);
            let expected = (total + page_size as u64 - 1) / page_size as u64;
            prop_assert_eq!(page.total_pages, expected);
            prop_assert_eq!(page.total_pages == 0, total == 0);
        }
    }

    async fn store_with(count: usize) -> InMemoryItemStore {
        let store = InMemoryItemStore::new();
        for n in 0..count {
            store.create(NewItem::new(format!("item {n}"))).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_paginate_counts_then_windows() {
        let store = store_with(25).await;
        let params = PaginationParams::new(2, 10).unwrap();

        let (items, total) = paginate(&store, &ItemQuery::default(), &params).await.unwrap();
        assert_eq!(total, 25);
        assert_eq!(items.len(), 10);
        assert_eq!(items[0].id, 11);
    }

    #[tokio::test]
    async fn test_paginate_last_partial_page() {
        let store = store_with(25).await;
        let params = PaginationParams::new(3, 10).unwrap();

        let (items, total) = paginate(&store, &ItemQuery::default(), &params).await.unwrap();
        assert_eq!(total, 25);
        assert_eq!(items.len(), 5);
    }

    #[tokio::test]
    async fn test_paginate_beyond_last_page() {
        let store = store_with(5).await;
        let params = PaginationParams::new(4, 2).unwrap();

        let (items, total) = paginate(&store, &ItemQuery::default(), &params).await.unwrap();
        assert!(items.is_empty());
        assert_eq!(total, 5);
        assert_eq!(PagedResponse::new(items, total, &params).total_pages, 3);
    }

    #[tokio::test]
    async fn test_paginate_through_trait_object() {
        let store: std::sync::Arc<dyn ItemStore> = std::sync::Arc::new(store_with(3).await);
        let params = PaginationParams::new(1, 2).unwrap();

        let (items, total) = paginate(store.as_ref(), &ItemQuery::default(), &params)
            .await
            .unwrap();
        assert_eq!((items.len(), total), (2, 3));
    }
}
