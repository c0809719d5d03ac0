use diesel::prelude::*;
use jiff::Timestamp;

/// Longest title the `items.title` column accepts, in characters
pub const TITLE_MAX_LEN: usize = 255;

/// A stored item.
///
/// `id` and both timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Row shape of the `items` table
#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ItemRow {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: jiff_diesel::Timestamp,
    pub updated_at: jiff_diesel::Timestamp,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            is_active: row.is_active,
            created_at: row.created_at.to_jiff(),
            updated_at: row.updated_at.to_jiff(),
        }
    }
}

/// Fields accepted when creating an item; timestamps come from column defaults.
#[derive(Debug, Insertable, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::items)]
pub struct NewItem {
    pub title: String,
    pub description: Option<String>,
    pub is_active: bool,
}

impl NewItem {
    /// An active item with no description
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            is_active: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
}

/// Partial update: `None` leaves a field untouched.
///
/// `description` is doubly optional so a caller can clear it with
/// `Some(None)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateItem {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
}

impl UpdateItem {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.is_active.is_none()
    }

    /// Apply the supplied fields to `item` in place
    pub fn apply_to(&self, item: &mut Item) {
        if let Some(title) = &self.title {
            item.title = title.clone();
        }
        if let Some(description) = &self.description {
            item.description = description.clone();
        }
        if let Some(is_active) = self.is_active {
            item.is_active = is_active;
        }
    }

    /// Diesel changeset stamped with the new `updated_at`
    pub fn into_changeset(self, updated_at: Timestamp) -> ItemChangeset {
        ItemChangeset {
            title: self.title,
            description: self.description,
            is_active: self.is_active,
            updated_at: jiff_diesel::Timestamp::from(updated_at),
        }
    }
}

#[derive(Debug, AsChangeset, Clone)]
#[diesel(table_name = crate::schema::items)]
pub struct ItemChangeset {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub updated_at: jiff_diesel::Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item() -> Item {
        let now = Timestamp::now();
        Item {
            id: 1,
            title: "Sample".to_string(),
            description: Some("first".to_string()),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_new_item_defaults_to_active() {
        let item = NewItem::new("Sample");
        assert!(item.is_active);
        assert_eq!(item.description, None);

        let item = NewItem::new("Sample").with_description("d").active(false);
        assert!(!item.is_active);
        assert_eq!(item.description.as_deref(), Some("d"));
    }

    #[test]
    fn test_update_applies_only_supplied_fields() {
        let mut item = sample_item();
        let update = UpdateItem {
            title: Some("Renamed".to_string()),
            ..Default::default()
        };

        update.apply_to(&mut item);
        assert_eq!(item.title, "Renamed");
        assert_eq!(item.description.as_deref(), Some("first"));
        assert!(item.is_active);
    }

    #[test]
    fn test_update_can_clear_description() {
        let mut item = sample_item();
        let update = UpdateItem {
            description: Some(None),
            ..Default::default()
        };

        assert!(!update.is_empty());
        update.apply_to(&mut item);
        assert_eq!(item.description, None);
    }

    #[test]
    fn test_empty_update() {
        assert!(UpdateItem::default().is_empty());
    }
}
