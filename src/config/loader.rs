//! Layered configuration loading.
//!
//! Sources, lowest to highest priority:
//! 1. `default.toml` (required)
//! 2. `{environment}.toml` (optional)
//! 3. `local.toml` (optional, not committed)
//! 4. `QUARRY_*` environment variables, `__` separating nested keys
//!
//! Pointing the loader at a single file (`QUARRY_CONFIG_FILE` or `--config`)
//! replaces steps 1-3 with that file; environment variables still apply.

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

const CONFIG_DIR_ENV: &str = "QUARRY_CONFIG_DIR";
const CONFIG_FILE_ENV: &str = "QUARRY_CONFIG_FILE";
const DEFAULT_CONFIG_DIR: &str = "config";
const ENV_PREFIX: &str = "QUARRY";
const ENV_SEPARATOR: &str = "__";

/// Configuration loader that handles layered configuration loading
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    /// When set, layered loading is skipped
    config_file: Option<PathBuf>,
    environment: AppEnvironment,
}

impl ConfigLoader {
    /// Create a loader from `QUARRY_CONFIG_DIR`, `QUARRY_CONFIG_FILE` and
    /// `QUARRY_APP_ENV`.
    ///
    /// # Errors
    ///
    /// Returns an error if both `QUARRY_CONFIG_DIR` and `QUARRY_CONFIG_FILE`
    /// are set, as they are mutually exclusive.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = std::env::var(CONFIG_DIR_ENV).ok().map(PathBuf::from);
        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        if config_dir.is_some() && config_file.is_some() {
            return Err(ConfigError::mutual_exclusivity(
                "QUARRY_CONFIG_DIR and QUARRY_CONFIG_FILE cannot both be set. \
                 Use QUARRY_CONFIG_DIR for layered configuration or \
                 QUARRY_CONFIG_FILE for a single configuration file.",
            ));
        }

        Ok(Self {
            config_dir: config_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR)),
            config_file,
            environment: AppEnvironment::from_env(),
        })
    }

    /// Load from a single file instead of the layered directory
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Use a different configuration directory for layered loading
    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = dir.into();
        self.config_file = None;
        self
    }

    /// Override the environment used to pick the `{env}.toml` overlay
    pub fn with_environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Load, deserialize and validate the settings.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let settings = self.load_unvalidated()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load and deserialize, leaving validation to the caller
    pub fn load_unvalidated(&self) -> Result<Settings, ConfigError> {
        self.build_config()?.try_deserialize().map_err(|e| {
            ConfigError::ParseError(format!("Failed to deserialize configuration: {}", e))
        })
    }

    fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = match self.config_file {
            Some(ref config_file) => add_file_source(Config::builder(), config_file, true)?,
            None => self.build_layered_config(Config::builder())?,
        };

        // QUARRY_SERVER__PORT -> server.port
        let builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .ignore_empty(true)
                .try_parsing(true),
        );

        builder.build().map_err(ConfigError::from)
    }

    fn build_layered_config(
        &self,
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let builder = add_file_source(builder, &self.config_dir.join("default.toml"), true)?;
        let builder = add_file_source(
            builder,
            &self.config_dir.join(self.environment.config_file_name()),
            false,
        )?;
        add_file_source(builder, &self.config_dir.join("local.toml"), false)
    }
}

fn add_file_source(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
    required: bool,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if required && !path.exists() {
        return Err(ConfigError::file_not_found(format!(
            "Required configuration file not found: {}",
            path.display()
        )));
    }

    Ok(builder.add_source(File::from(path).format(FileFormat::Toml).required(required)))
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            config_file: None,
            environment: AppEnvironment::default(),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::settings::StoreBackend;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serializes tests that read or mutate process environment variables.
    pub(crate) static TEST_MUTEX: Mutex<()> = Mutex::new(());

    fn setup_config_dir(files: &[(&str, &str)]) -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        for (name, content) in files {
            fs::write(temp_dir.path().join(name), content).expect("Failed to write config file");
        }
        temp_dir
    }

    /// Restores touched environment variables on drop
    pub(crate) struct EnvGuard {
        vars_to_restore: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        pub(crate) fn new() -> Self {
            Self {
                vars_to_restore: Vec::new(),
            }
        }

        pub(crate) fn set(&mut self, key: &str, value: &str) {
            self.vars_to_restore
                .push((key.to_string(), std::env::var(key).ok()));
            unsafe {
                std::env::set_var(key, value);
            }
        }

        pub(crate) fn remove(&mut self, key: &str) {
            self.vars_to_restore
                .push((key.to_string(), std::env::var(key).ok()));
            unsafe {
                std::env::remove_var(key);
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, original_value) in self.vars_to_restore.iter().rev() {
                unsafe {
                    match original_value {
                        Some(value) => std::env::set_var(key, value),
                        None => std::env::remove_var(key),
                    }
                }
            }
        }
    }

    const MEMORY_DEFAULT: &str = r#"
[database]
backend = "memory"
"#;

    #[test]
    fn test_config_loader_new_default() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.remove(CONFIG_DIR_ENV);
        env.remove(CONFIG_FILE_ENV);
        env.remove(AppEnvironment::ENV_VAR);

        let loader = ConfigLoader::new().expect("Should create loader");
        assert_eq!(loader.config_dir(), Path::new("config"));
        assert!(loader.config_file.is_none());
        assert_eq!(loader.environment(), AppEnvironment::Development);
    }

    #[test]
    fn test_config_loader_mutual_exclusivity_error() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.set(CONFIG_DIR_ENV, "/custom/config");
        env.set(CONFIG_FILE_ENV, "/custom/app.toml");

        let result = ConfigLoader::new();
        assert!(matches!(result, Err(ConfigError::MutualExclusivityError(_))));
    }

    #[test]
    fn test_load_missing_default_file() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let temp_dir = setup_config_dir(&[]);

        let result = ConfigLoader::default()
            .with_config_dir(temp_dir.path())
            .load();
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_layered_loading_precedence() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let temp_dir = setup_config_dir(&[
            (
                "default.toml",
                r#"
[server]
port = 3000
host = "127.0.0.1"

[database]
backend = "memory"
"#,
            ),
            ("staging.toml", "[server]\nport = 4000\n"),
            ("local.toml", "[server]\nhost = \"0.0.0.0\"\n"),
        ]);

        let settings = ConfigLoader::default()
            .with_config_dir(temp_dir.path())
            .with_environment(AppEnvironment::Staging)
            .load()
            .expect("Should load layered config");

        assert_eq!(settings.server.port, 4000);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.database.backend, StoreBackend::Memory);
    }

    #[test]
    fn test_environment_overlay_is_optional() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let temp_dir = setup_config_dir(&[("default.toml", MEMORY_DEFAULT)]);

        let settings = ConfigLoader::default()
            .with_config_dir(temp_dir.path())
            .with_environment(AppEnvironment::Production)
            .load()
            .expect("Missing overlays are fine");

        assert_eq!(settings.server.port, 3000);
    }

    #[test]
    fn test_env_var_overrides_file() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.set("QUARRY_SERVER__PORT", "9090");
        env.set("QUARRY_TASKS__WORKERS", "7");

        let temp_dir = setup_config_dir(&[("default.toml", MEMORY_DEFAULT)]);
        let settings = ConfigLoader::default()
            .with_config_dir(temp_dir.path())
            .load()
            .expect("Should load with env overrides");

        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.tasks.workers, 7);
    }

    #[test]
    fn test_single_file_mode() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let temp_dir = setup_config_dir(&[(
            "custom.toml",
            r#"
[application]
name = "quarry-custom"

[database]
backend = "memory"

[files]
max_upload_size = 1024
"#,
        )]);

        let settings = ConfigLoader::default()
            .with_config_file(temp_dir.path().join("custom.toml"))
            .load()
            .expect("Should load single file");

        assert_eq!(settings.application.name, "quarry-custom");
        assert_eq!(settings.files.max_upload_size, 1024);
    }

    #[test]
    fn test_load_rejects_invalid_settings() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let temp_dir = setup_config_dir(&[(
            "default.toml",
            "[database]\nbackend = \"postgres\"\nurl = \"\"\n",
        )]);

        let result = ConfigLoader::default()
            .with_config_dir(temp_dir.path())
            .load();
        assert!(matches!(
            result,
            Err(ConfigError::ValidationError { ref field, .. }) if field == "database.url"
        ));
    }

    #[test]
    fn test_load_rejects_malformed_toml() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let temp_dir = setup_config_dir(&[("default.toml", "[server\nport = ")]);

        let result = ConfigLoader::default()
            .with_config_dir(temp_dir.path())
            .load();
        assert!(result.is_err());
    }
}
