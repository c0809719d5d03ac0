//! Serve command handler

use crate::config::StoreBackend;
use crate::config::settings::Settings;
use crate::server::Server;

pub struct ServeCommandHandler {
    config: Settings,
}

impl ServeCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Run the server until shutdown, or only report on the configuration
    /// when `dry_run` is set.
    pub async fn execute(self, dry_run: bool) -> anyhow::Result<()> {
        if dry_run {
            self.validate_only()?;
            return Ok(());
        }

        Server::new(self.config).run().await
    }

    /// Validate configuration without binding or connecting anything
    pub fn validate_only(&self) -> anyhow::Result<()> {
        self.config.validate()?;

        println!("✓ Configuration is valid");
        println!("✓ Server would bind to: {}", self.config.server.address());
        match self.config.database.backend {
            StoreBackend::Postgres => println!("✓ Item store: postgres"),
            StoreBackend::Memory => println!("✓ Item store: in-memory (not persisted)"),
        }
        println!("✓ Uploads go to: {}", self.config.files.upload_dir);
        println!(
            "✓ Task queue: {} worker(s), capacity {}",
            self.config.tasks.workers, self.config.tasks.queue_capacity
        );
        println!("Dry run completed successfully - configuration is ready for deployment");

        Ok(())
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}
