//! Sort specifications.
//!
//! Sortable attributes are a closed enum per entity, so a misspelled field
//! can only arrive from outside (a query string). Unknown names coming in that
//! way are dropped rather than rejected: the query runs unordered and the
//! name is kept for logging.

use std::cmp::Ordering;
use std::fmt;

use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Item;
use crate::schema::items;

diesel::define_sql_function! {
    /// SQL `lower(text)`
    fn lower(x: diesel::sql_types::Text) -> diesel::sql_types::Text;
}

/// Direction for ordering results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Orient an ascending comparison
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

/// Item attributes that can be sorted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemSortField {
    Id,
    Title,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

impl ItemSortField {
    pub const ALL: [ItemSortField; 5] = [
        ItemSortField::Id,
        ItemSortField::Title,
        ItemSortField::IsActive,
        ItemSortField::CreatedAt,
        ItemSortField::UpdatedAt,
    ];

    /// Attribute name as it appears in the API
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemSortField::Id => "id",
            ItemSortField::Title => "title",
            ItemSortField::IsActive => "is_active",
            ItemSortField::CreatedAt => "created_at",
            ItemSortField::UpdatedAt => "updated_at",
        }
    }

    /// Exact, case-sensitive lookup by attribute name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == name)
    }
}

impl fmt::Display for ItemSortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved sort for an item query.
///
/// `field() == None` means no ordering is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSort {
    field: Option<ItemSortField>,
    order: SortOrder,
    unrecognized: Option<String>,
}

impl ItemSort {
    pub fn new(field: ItemSortField, order: SortOrder) -> Self {
        Self {
            field: Some(field),
            order,
            unrecognized: None,
        }
    }

    /// No ordering; the store returns rows in its natural order
    pub fn unsorted() -> Self {
        Self {
            field: None,
            order: SortOrder::default(),
            unrecognized: None,
        }
    }

    /// Resolve a raw `sort_by` value.
    ///
    /// Absent means `created_at` in the given order; an unknown name yields
    /// an unsorted `ItemSort` that remembers the name.
    pub fn from_raw(sort_by: Option<&str>, order: SortOrder) -> Self {
        let Some(name) = sort_by else {
            return Self::new(ItemSortField::CreatedAt, order);
        };

        match ItemSortField::from_name(name) {
            Some(field) => Self::new(field, order),
            None => {
                tracing::debug!(sort_by = name, "Ignoring unknown sort field");
                Self {
                    field: None,
                    order,
                    unrecognized: Some(name.to_string()),
                }
            }
        }
    }

    pub fn field(&self) -> Option<ItemSortField> {
        self.field
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    /// Whether the requested field name was not a sortable attribute
    pub fn is_unrecognized(&self) -> bool {
        self.unrecognized.is_some()
    }

    pub fn unrecognized_name(&self) -> Option<&str> {
        self.unrecognized.as_deref()
    }

    /// Add `ORDER BY` to a boxed items query.
    ///
    /// Non-unique columns get `id` as a tie-breaker so windows are stable
    /// across pages. Titles order case-insensitively, independent of the
    /// database collation.
    pub fn apply<'a>(&self, query: items::BoxedQuery<'a, Pg>) -> items::BoxedQuery<'a, Pg> {
        let Some(field) = self.field else {
            return query;
        };

        let query = match (field, self.order) {
            (ItemSortField::Id, SortOrder::Asc) => return query.order(items::id.asc()),
            (ItemSortField::Id, SortOrder::Desc) => return query.order(items::id.desc()),
            (ItemSortField::Title, SortOrder::Asc) => query.order(lower(items::title).asc()),
            (ItemSortField::Title, SortOrder::Desc) => query.order(lower(items::title).desc()),
            (ItemSortField::IsActive, SortOrder::Asc) => query.order(items::is_active.asc()),
            (ItemSortField::IsActive, SortOrder::Desc) => query.order(items::is_active.desc()),
            (ItemSortField::CreatedAt, SortOrder::Asc) => query.order(items::created_at.asc()),
            (ItemSortField::CreatedAt, SortOrder::Desc) => query.order(items::created_at.desc()),
            (ItemSortField::UpdatedAt, SortOrder::Asc) => query.order(items::updated_at.asc()),
            (ItemSortField::UpdatedAt, SortOrder::Desc) => query.order(items::updated_at.desc()),
        };

        query.then_order_by(items::id.asc())
    }

    /// Compare two items under this sort, with the same `id` tie-breaker as
    /// [`ItemSort::apply`]. Unsorted compares by `id` alone.
    pub fn compare(&self, a: &Item, b: &Item) -> Ordering {
        let primary = match self.field {
            None => Ordering::Equal,
            Some(ItemSortField::Id) => return self.order.apply(a.id.cmp(&b.id)),
            Some(ItemSortField::Title) => self
                .order
                .apply(a.title.to_lowercase().cmp(&b.title.to_lowercase())),
            Some(ItemSortField::IsActive) => self.order.apply(a.is_active.cmp(&b.is_active)),
            Some(ItemSortField::CreatedAt) => self.order.apply(a.created_at.cmp(&b.created_at)),
            Some(ItemSortField::UpdatedAt) => self.order.apply(a.updated_at.cmp(&b.updated_at)),
        };

        primary.then_with(|| a.id.cmp(&b.id))
    }
}

impl Default for ItemSort {
    /// Newest first
    fn default() -> Self {
        Self::new(ItemSortField::CreatedAt, SortOrder::Desc)
    }
}
