//! Filter specifications.

use diesel::pg::Pg;
use diesel::prelude::*;

use crate::models::Item;
use crate::schema::items;

/// Optional constraints on an item query.
///
/// `None` fields impose nothing, so the default filter matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    /// Case-insensitive substring of the title
    pub title: Option<String>,
    pub is_active: Option<bool>,
}

impl ItemFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_is_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    /// True when applying the filter cannot change a result set
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.is_active.is_none()
    }

    /// Add `WHERE` clauses to a boxed items query
    pub fn apply<'a>(&self, mut query: items::BoxedQuery<'a, Pg>) -> items::BoxedQuery<'a, Pg> {
        if let Some(title) = &self.title {
            query = query.filter(items::title.ilike(contains_pattern(title)));
        }
        if let Some(is_active) = self.is_active {
            query = query.filter(items::is_active.eq(is_active));
        }
        query
    }

    /// In-process equivalent of [`ItemFilter::apply`]
    pub fn matches(&self, item: &Item) -> bool {
        let title_ok = self
            .title
            .as_ref()
            .is_none_or(|needle| item.title.to_lowercase().contains(&needle.to_lowercase()));
        let active_ok = self.is_active.is_none_or(|flag| item.is_active == flag);
        title_ok && active_ok
    }
}

/// `%needle%` with LIKE wildcards in the needle escaped, so user input is
/// matched literally.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
