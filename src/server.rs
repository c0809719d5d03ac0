//! Server module for managing HTTP server lifecycle
//!
//! This module handles server initialization, startup, and graceful shutdown.
//! One [`CancellationToken`] ties shutdown together: the signal handler
//! cancels it, which stops the task workers and the chat hub while axum
//! drains open connections.

use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::api::routes::create_router;
use crate::chat::ChatHub;
use crate::config::{Environment, Settings, StoreBackend};
use crate::db::run_pending_migrations;
use crate::repositories::Repositories;
use crate::services::Services;
use crate::state::AppState;
use crate::tasks::{TaskQueue, TaskWorkers};

/// HTTP server manager
pub struct Server {
    settings: Settings,
}

/// Everything the router needs, plus the worker pool to join on shutdown.
pub struct Application {
    pub state: AppState,
    pub workers: TaskWorkers,
}

impl Application {
    /// Wire stores, services, the task queue and the chat hub from settings.
    ///
    /// On the postgres backend this connects (and migrates first when
    /// `database.auto_migrate` is set); the memory backend needs nothing.
    pub async fn build(settings: &Settings, shutdown: CancellationToken) -> anyhow::Result<Self> {
        if settings.database.backend == StoreBackend::Postgres && settings.database.auto_migrate {
            let applied = run_pending_migrations(&settings.database.url).await?;
            tracing::info!(count = applied.len(), "Pending migrations applied");
        }

        let (repos, db_pool) = Repositories::connect(&settings.database).await?;

        let (tasks, workers) = TaskQueue::start(&settings.tasks, shutdown.clone());
        let services = Services::new(repos, &settings.files, tasks);
        services.files.ensure_upload_dir().await?;

        let chat = ChatHub::start(&settings.chat, shutdown);

        Ok(Self {
            state: AppState::new(services, db_pool, chat),
            workers,
        })
    }
}

impl Server {
    /// Create a new server with the given settings
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Start the server and run until a shutdown signal arrives.
    ///
    /// # Errors
    /// - Database connection or migration errors
    /// - Upload directory creation errors
    /// - Address binding errors
    /// - Server runtime errors
    pub async fn run(self) -> anyhow::Result<()> {
        let settings = &self.settings;

        tracing::info!(
            app_name = %settings.application.name,
            app_version = %settings.application.version,
            environment = %Environment::from_env().as_str(),
            "Application starting"
        );

        tracing::info!(
            host = %settings.server.host,
            port = settings.server.port,
            cors_origins = ?settings.server.cors_origins,
            "Server configuration loaded"
        );

        // No URL here: it may carry credentials
        tracing::info!(
            backend = ?settings.database.backend,
            max_connections = settings.database.max_connections,
            auto_migrate = settings.database.auto_migrate,
            "Database configuration loaded"
        );

        tracing::info!(
            upload_dir = %settings.files.upload_dir,
            max_upload_size = settings.files.max_upload_size,
            workers = settings.tasks.workers,
            queue_capacity = settings.tasks.queue_capacity,
            "Files and tasks configuration loaded"
        );

        let shutdown = CancellationToken::new();
        let app = Application::build(settings, shutdown.clone()).await?;
        tracing::info!("Application state created");

        let router = create_router(app.state, &settings.server);

        let address = settings.server.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!(error = %e, address = %address, "Failed to bind to address");
            anyhow::anyhow!("Failed to bind to {}: {}", address, e)
        })?;

        tracing::info!(address = %address, "Server listening");

        let served = axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
            .await;

        // Also reached when serve fails, so workers never outlive the server
        shutdown.cancel();
        app.workers.join().await;
        served?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

/// Waits for Ctrl+C or SIGTERM, then cancels `shutdown`.
///
/// A handler that cannot be installed is logged and never fires; the other
/// one still can.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
        _ = shutdown.cancelled() => {}
    }

    shutdown.cancel();
}
