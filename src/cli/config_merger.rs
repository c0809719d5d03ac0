//! Merges CLI overrides into file-based configuration.
//!
//! Precedence, highest first: subcommand flags, global flags, then whatever
//! the [`ConfigLoader`] assembled from files and `QUARRY_*` variables.

use super::parser::{Cli, Commands};
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, settings::Settings};

pub struct ConfigurationMerger {
    base_config: Settings,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings) -> Self {
        Self { base_config }
    }

    /// Load the base configuration the way the CLI asks for it: a single
    /// file with `--config`, the layered directory otherwise, overlaying
    /// `--env` when given.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut loader = ConfigLoader::new()?;
        if let Some(path) = &cli.config {
            loader = loader.with_config_file(path);
        }
        if let Some(env) = cli.env {
            loader = loader.with_environment(env.into());
        }

        // Not validated yet: CLI overrides may still fix the configuration
        Ok(Self::new(loader.load_unvalidated()?))
    }

    /// Apply CLI overrides and validate the result
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }

        if let Some(Commands::Serve {
            host,
            port,
            log_level,
            backend,
            ..
        }) = &cli.command
        {
            if let Some(host) = host {
                config.server.host = host.clone();
            }
            if let Some(port) = port {
                config.server.port = *port;
            }
            if let Some(level) = log_level {
                config.logger.level = level.as_str().to_string();
            }
            if let Some(backend) = backend {
                config.database.backend = (*backend).into();
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn config(&self) -> &Settings {
        &self.base_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreBackend;
    use clap::Parser;

    fn merge(args: &[&str]) -> Result<Settings, ConfigError> {
        let mut base = Settings::default();
        base.database.url = "postgres://localhost/test".to_string();
        let cli = Cli::try_parse_from(args).unwrap();
        ConfigurationMerger::new(base).merge_cli_args(&cli)
    }

    #[test]
    fn test_global_flags_set_log_level() {
        assert_eq!(merge(&["quarry-rs", "--verbose"]).unwrap().logger.level, "debug");
        assert_eq!(merge(&["quarry-rs", "--quiet"]).unwrap().logger.level, "error");
    }

    #[test]
    fn test_serve_overrides() {
        let config = merge(&["quarry-rs", "serve", "--host", "0.0.0.0", "--port", "8080"]).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_command_log_level_overrides_global() {
        let config = merge(&["quarry-rs", "--verbose", "serve", "--log-level", "warn"]).unwrap();
        assert_eq!(config.logger.level, "warn");
    }

    #[test]
    fn test_memory_backend_needs_no_url() {
        let cli = Cli::try_parse_from(["quarry-rs", "serve", "--backend", "memory"]).unwrap();
        let config = ConfigurationMerger::new(Settings::default())
            .merge_cli_args(&cli)
            .unwrap();
        assert_eq!(config.database.backend, StoreBackend::Memory);
    }

    #[test]
    fn test_merged_config_is_validated() {
        let cli = Cli::try_parse_from(["quarry-rs", "serve"]).unwrap();
        let result = ConfigurationMerger::new(Settings::default()).merge_cli_args(&cli);
        assert!(result.is_err(), "postgres backend without a URL must be rejected");
    }
}
