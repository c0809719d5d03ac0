//! Shaped queries: a filter plus an optional sort.

use std::cmp::Ordering;

use diesel::pg::Pg;

use crate::common::{ItemFilter, ItemSort};
use crate::models::Item;
use crate::schema::items;

/// Filter and sort for an item listing, without the window.
///
/// `sort == None` leaves the store's natural order, which only the count
/// query relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemQuery {
    pub filter: ItemFilter,
    pub sort: Option<ItemSort>,
}

impl ItemQuery {
    pub fn new(filter: ItemFilter, sort: Option<ItemSort>) -> Self {
        Self { filter, sort }
    }

    /// Filter first, then order
    pub fn apply<'a>(&self, query: items::BoxedQuery<'a, Pg>) -> items::BoxedQuery<'a, Pg> {
        let query = self.filter.apply(query);
        match &self.sort {
            Some(sort) => sort.apply(query),
            None => query,
        }
    }

    pub fn matches(&self, item: &Item) -> bool {
        self.filter.matches(item)
    }

    pub fn compare(&self, a: &Item, b: &Item) -> Ordering {
        match &self.sort {
            Some(sort) => sort.compare(a, b),
            None => a.id.cmp(&b.id),
        }
    }
}
