//! Configuration settings structures for quarry-rs
//!
//! This module defines all configuration structures that can be loaded from
//! TOML files and environment variables.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::logger::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig};

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_name() -> String {
    "quarry-rs".to_string()
}

fn default_app_version() -> String {
    crate::pkg_version().to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connection_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_path() -> String {
    "logs/quarry.log".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_max_upload_size() -> u64 {
    10 * 1024 * 1024 // 10MB
}

fn default_workers() -> usize {
    4
}

fn default_queue_capacity() -> usize {
    100
}

fn default_email_delay_ms() -> u64 {
    2000
}

fn default_processing_delay_ms() -> u64 {
    3000
}

fn default_retention_secs() -> u64 {
    3600
}

fn default_max_retained() -> usize {
    1000
}

fn default_outbound_buffer() -> usize {
    32
}

fn default_command_buffer() -> usize {
    256
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Application basic information configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    #[serde(default = "default_app_name")]
    pub name: String,

    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
        }
    }
}

// ============================================================================
// Server Configuration
// ============================================================================

/// Axum HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    /// Get the full server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

// ============================================================================
// Database Configuration
// ============================================================================

/// Which [`ItemStore`](crate::repositories::ItemStore) implementation backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Postgres,
    Memory,
}

/// Diesel database connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Database connection URL, required for the postgres backend
    #[serde(default)]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: u64,

    /// Whether to automatically run pending migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connection_timeout: default_connection_timeout(),
            auto_migrate: false,
        }
    }
}

// ============================================================================
// Logger Settings
// ============================================================================

/// Console output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            colored: default_true(),
        }
    }
}

/// File output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_log_path")]
    pub path: String,

    #[serde(default = "default_true")]
    pub append: bool,

    /// Log format: "full", "compact", or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_log_path(),
            append: default_true(),
            format: default_log_format(),
        }
    }
}

/// Logger configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// Log level or `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub console: ConsoleSettings,

    #[serde(default)]
    pub file: FileSettings,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            console: ConsoleSettings::default(),
            file: FileSettings::default(),
        }
    }
}

impl LoggerSettings {
    /// Convert the file representation into the runtime [`LoggerConfig`]
    pub fn into_logger_config(self) -> Result<LoggerConfig, ConfigError> {
        let console = ConsoleConfig::new(self.console.enabled, self.console.colored);
        let file = self.file.into_file_config()?;

        LoggerConfig::new(console, file, self.level).map_err(|e| {
            ConfigError::ValidationError {
                field: "logger".to_string(),
                message: e.to_string(),
            }
        })
    }
}

impl FileSettings {
    pub fn into_file_config(self) -> Result<FileConfig, ConfigError> {
        let format = self
            .format
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: e.to_string(),
            })?;

        FileConfig::new(self.enabled, PathBuf::from(self.path), self.append, format).map_err(
            |e| ConfigError::ValidationError {
                field: "logger.file".to_string(),
                message: e.to_string(),
            },
        )
    }
}

// ============================================================================
// File storage Configuration
// ============================================================================

/// Upload storage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesConfig {
    /// Directory uploads are written to; created on startup
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,

    /// Maximum accepted upload size in bytes
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

// ============================================================================
// Background task Configuration
// ============================================================================

/// Background task queue configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Number of worker tasks draining the queue
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Bounded queue size; submissions beyond it are rejected
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Simulated delivery time of the email task
    #[serde(default = "default_email_delay_ms")]
    pub email_delay_ms: u64,

    /// Simulated processing time of the data task
    #[serde(default = "default_processing_delay_ms")]
    pub processing_delay_ms: u64,

    /// How long a finished task's status stays queryable
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,

    /// Finished task records kept at most; the oldest go first
    #[serde(default = "default_max_retained")]
    pub max_retained: usize,
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
            email_delay_ms: default_email_delay_ms(),
            processing_delay_ms: default_processing_delay_ms(),
            retention_secs: default_retention_secs(),
            max_retained: default_max_retained(),
        }
    }
}

// ============================================================================
// Chat Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Messages buffered per connection before the client is dropped
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer: usize,

    /// Capacity of the hub's command channel
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            outbound_buffer: default_outbound_buffer(),
            command_buffer: default_command_buffer(),
        }
    }
}

// ============================================================================
// Main Settings Structure
// ============================================================================

/// Complete application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub application: ApplicationConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub logger: LoggerSettings,

    #[serde(default)]
    pub files: FilesConfig,

    #[serde(default)]
    pub tasks: TasksConfig,

    #[serde(default)]
    pub chat: ChatConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_settings() -> impl Strategy<Value = Settings> {
        (
            prop_oneof![Just(StoreBackend::Postgres), Just(StoreBackend::Memory)],
            1u16..=65535u16,
            ("[a-z]{1,12}", 1u64..=1_073_741_824u64),
            (1usize..=32, 1usize..=10_000, 0u64..=86_400, 1usize..=100_000),
            (1usize..=1024, 1usize..=4096),
        )
            .prop_map(
                |(backend, port, (upload_dir, max_upload_size), tasks, chat)| {
                    let (workers, queue_capacity, retention_secs, max_retained) = tasks;
                    let mut settings = Settings::default();
                    settings.database.backend = backend;
                    settings.database.url = "postgres://localhost/quarry".to_string();
                    settings.server.port = port;
                    settings.files = FilesConfig {
                        upload_dir,
                        max_upload_size,
                    };
                    settings.tasks = TasksConfig {
                        workers,
                        queue_capacity,
                        retention_secs,
                        max_retained,
                        ..TasksConfig::default()
                    };
                    settings.chat = ChatConfig {
                        outbound_buffer: chat.0,
                        command_buffer: chat.1,
                    };
                    settings
                },
            )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_settings_survive_toml(settings in arb_settings()) {
            let toml_str = toml::to_string(&settings).unwrap();
            let parsed: Settings = toml::from_str(&toml_str).unwrap();
            prop_assert_eq!(settings, parsed);
        }
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.application.name, "quarry-rs");
        assert_eq!(settings.server.address(), "127.0.0.1:3000");
        assert_eq!(settings.database.backend, StoreBackend::Postgres);
        assert!(settings.database.url.is_empty());
        assert_eq!(settings.files.max_upload_size, 10 * 1024 * 1024);
        assert_eq!(settings.tasks.workers, 4);
        assert_eq!(settings.tasks.queue_capacity, 100);
        assert_eq!(settings.tasks.retention_secs, 3600);
        assert_eq!(settings.tasks.max_retained, 1000);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings: Settings = toml::from_str(
            r#"
[database]
backend = "memory"

[tasks]
workers = 2
max_retained = 10
"#,
        )
        .unwrap();

        assert_eq!(settings.database.backend, StoreBackend::Memory);
        assert_eq!(settings.tasks.workers, 2);
        assert_eq!(settings.tasks.max_retained, 10);
        assert_eq!(settings.tasks.queue_capacity, 100);
        assert_eq!(settings.chat, ChatConfig::default());
    }

    #[test]
    fn test_logger_settings_into_logger_config() {
        let settings = LoggerSettings {
            level: "debug".to_string(),
            file: FileSettings {
                enabled: true,
                format: "compact".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };

        let config = settings.into_logger_config().unwrap();
        assert!(config.file.enabled);
        assert_eq!(config.file.format, LogFormat::Compact);

        let bad = LoggerSettings {
            file: FileSettings {
                format: "yaml".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            bad.into_logger_config(),
            Err(ConfigError::ValidationError { ref field, .. }) if field == "logger.file.format"
        ));
    }
}
