mod item;

pub use item::{Item, ItemChangeset, ItemRow, NewItem, TITLE_MAX_LEN, UpdateItem};
