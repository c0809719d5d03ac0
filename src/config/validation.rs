//! Configuration validation logic
//!
//! Each section validates its own invariants; [`Settings::validate`] returns
//! the first failure.

use crate::config::error::ConfigError;
use crate::config::settings::{
    ChatConfig, DatabaseConfig, FileSettings, FilesConfig, LoggerSettings, ServerConfig,
    Settings, StoreBackend, TasksConfig,
};

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

const VALID_URL_SCHEMES: &[&str] = &["postgres://", "postgresql://"];

impl ServerConfig {
    /// Port must be non-zero; every CORS origin must be an http(s) URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535. Please specify a valid port number.",
            ));
        }

        if self.host.trim().is_empty() {
            return Err(ConfigError::validation(
                "server.host",
                "Host cannot be empty.",
            ));
        }

        if let Some(origin) = self
            .cors_origins
            .iter()
            .find(|o| !(o.starts_with("http://") || o.starts_with("https://")))
        {
            return Err(ConfigError::ValidationError {
                field: "server.cors_origins".to_string(),
                message: format!("CORS origin '{}' must start with http:// or https://", origin),
            });
        }

        Ok(())
    }
}

impl DatabaseConfig {
    /// The URL is only checked for the postgres backend; pool bounds always.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend == StoreBackend::Postgres {
            if self.url.is_empty() {
                return Err(ConfigError::validation(
                    "database.url",
                    "Database URL is required for the postgres backend. Set database.url or use backend = \"memory\".",
                ));
            }

            if !VALID_URL_SCHEMES
                .iter()
                .any(|scheme| self.url.starts_with(scheme))
            {
                return Err(ConfigError::validation(
                    "database.url",
                    "Invalid database URL format. Expected format: postgres://[user:password@]host[:port]/database",
                ));
            }
        }

        if self.max_connections == 0 {
            return Err(ConfigError::validation(
                "database.max_connections",
                "Max connections must be greater than 0.",
            ));
        }

        if self.min_connections == 0 {
            return Err(ConfigError::validation(
                "database.min_connections",
                "Min connections must be greater than 0.",
            ));
        }

        if self.min_connections > self.max_connections {
            return Err(ConfigError::ValidationError {
                field: "database.min_connections".to_string(),
                message: format!(
                    "Min connections ({}) cannot exceed max connections ({}).",
                    self.min_connections, self.max_connections
                ),
            });
        }

        if self.connection_timeout == 0 {
            return Err(ConfigError::validation(
                "database.connection_timeout",
                "Connection timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl FileSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            });
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// Accepts a plain level name or an `EnvFilter` directive list such as
    /// `info,quarry=debug`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let is_level = VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str());
        let is_directive = self.level.contains('=')
            && tracing_subscriber::EnvFilter::try_new(&self.level).is_ok();

        if !is_level && !is_directive {
            return Err(ConfigError::ValidationError {
                field: "logger.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        if !self.console.enabled && !self.file.enabled {
            return Err(ConfigError::validation(
                "logger",
                "At least one output (console or file) must be enabled.",
            ));
        }

        self.file.validate()
    }
}

impl FilesConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upload_dir.trim().is_empty() {
            return Err(ConfigError::validation(
                "files.upload_dir",
                "Upload directory cannot be empty.",
            ));
        }

        if self.max_upload_size == 0 {
            return Err(ConfigError::validation(
                "files.max_upload_size",
                "Maximum upload size must be greater than 0 bytes.",
            ));
        }

        Ok(())
    }
}

impl TasksConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::validation(
                "tasks.workers",
                "At least one task worker is required.",
            ));
        }

        if self.queue_capacity == 0 {
            return Err(ConfigError::validation(
                "tasks.queue_capacity",
                "Queue capacity must be greater than 0.",
            ));
        }

        if self.max_retained == 0 {
            return Err(ConfigError::validation(
                "tasks.max_retained",
                "At least one finished task record must be retained.",
            ));
        }

        Ok(())
    }
}

impl ChatConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.outbound_buffer == 0 {
            return Err(ConfigError::validation(
                "chat.outbound_buffer",
                "Outbound buffer must hold at least one message.",
            ));
        }

        if self.command_buffer == 0 {
            return Err(ConfigError::validation(
                "chat.command_buffer",
                "Command buffer must hold at least one command.",
            ));
        }

        Ok(())
    }
}

impl Settings {
    /// Validate all sections, returning the first error encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.logger.validate()?;
        self.files.validate()?;
        self.tasks.validate()?;
        self.chat.validate()?;
        Ok(())
    }
}
