//! Item DTOs for API requests and responses.

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::common::{
    DEFAULT_PAGE, DEFAULT_PAGE_SIZE, ItemFilter, ItemSort, PaginationParams, SortOrder,
};
use crate::error::AppResult;
use crate::models::{Item, NewItem, UpdateItem};

// ============================================================================
// Request DTOs
// ============================================================================

/// Request body for creating an item.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateItemRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    #[schema(min_length = 1, max_length = 255, example = "Sample")]
    pub title: String,
    #[schema(example = "A sample item")]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    #[schema(default = true)]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl CreateItemRequest {
    pub fn into_new_item(self) -> NewItem {
        NewItem {
            title: self.title,
            description: self.description,
            is_active: self.is_active,
        }
    }
}

/// Request body for updating an item. Omitted fields are left unchanged;
/// an explicit `"description": null` clears the description.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateItemRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
}

/// Wraps any present value, `null` included, in `Some`
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl UpdateItemRequest {
    pub fn into_update_item(self) -> UpdateItem {
        UpdateItem {
            title: self.title,
            description: self.description,
            is_active: self.is_active,
        }
    }
}

/// Query parameters for listing items.
#[derive(Debug, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct ItemListQuery {
    /// Page number (1-based)
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    #[param(minimum = 1, example = 1)]
    pub page: u32,

    /// Number of items per page (max 100)
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 100, message = "Page size must be between 1 and 100"))]
    #[param(minimum = 1, maximum = 100, example = 20)]
    pub page_size: u32,

    /// Case-insensitive substring of the title
    pub title: Option<String>,

    pub is_active: Option<bool>,

    /// Attribute to sort by; unknown names are ignored (default: created_at)
    #[param(example = "created_at")]
    pub sort_by: Option<String>,

    #[serde(default)]
    #[param(inline)]
    pub sort_order: SortOrder,
}

fn default_page() -> u32 {
    DEFAULT_PAGE
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl ItemListQuery {
    pub fn pagination(&self) -> AppResult<PaginationParams> {
        PaginationParams::new(self.page, self.page_size)
    }

    pub fn filter(&self) -> ItemFilter {
        ItemFilter {
            title: self.title.clone(),
            is_active: self.is_active,
        }
    }

    pub fn sort(&self) -> ItemSort {
        ItemSort::from_raw(self.sort_by.as_deref(), self.sort_order)
    }
}

// ============================================================================
// Response DTOs
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Sample")]
    pub title: String,
    pub description: Option<String>,
    pub is_active: bool,
    #[schema(value_type = String, format = DateTime, example = "2025-01-01T12:00:00Z")]
    pub created_at: jiff::Timestamp,
    #[schema(value_type = String, format = DateTime, example = "2025-01-01T12:00:00Z")]
    pub updated_at: jiff::Timestamp,
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            title: item.title,
            description: item.description,
            is_active: item.is_active,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}
