//! Command handlers for CLI operations

pub mod info;
pub mod items;
pub mod migrate;
pub mod serve;

pub use info::InfoCommandHandler;
pub use items::ItemsCommandHandler;
pub use migrate::MigrateCommandHandler;
pub use serve::ServeCommandHandler;
