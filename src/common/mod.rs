//! Query shaping shared by list endpoints: pagination, filtering, sorting.

pub mod filtering;
pub mod pagination;
pub mod query;
pub mod sorting;

pub use filtering::ItemFilter;
pub use pagination::{
    DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PagedResponse, PaginationParams, Window,
    paginate,
};
pub use query::ItemQuery;
pub use sorting::{ItemSort, ItemSortField, SortOrder};
