//! Configuration management for quarry-rs
//!
//! Layered TOML loading with environment variable overrides:
//! 1. `default.toml` - base configuration
//! 2. `{environment}.toml` - environment-specific overlay
//! 3. `local.toml` - local overrides (not committed)
//! 4. `QUARRY_*` environment variables

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use environment::Environment;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{
    ChatConfig, DatabaseConfig, FilesConfig, LoggerSettings, ServerConfig, Settings,
    StoreBackend, TasksConfig,
};
