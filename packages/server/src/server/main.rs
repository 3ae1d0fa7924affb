// Main entry point for the circuits web server

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use circuits_core::kernel::{EntityStore, MemoryStore, PostgresStore, ServerDeps};
use circuits_core::{server::build_app, Config, StoreBackend};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,circuits_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting circuits server");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(store = ?config.store, "Configuration loaded");

    let store: Arc<dyn EntityStore> = match config.store {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set when STORE=postgres")?;

            tracing::info!("Connecting to database...");
            let store = PostgresStore::connect(database_url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Database connected");

            tracing::info!("Running database migrations...");
            store.migrate().await.context("Failed to run migrations")?;
            tracing::info!("Migrations complete");
            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    // Build application
    let deps = ServerDeps::new(store, &config);
    let app = build_app(deps, Duration::from_secs(config.request_timeout_secs));

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Circuits: http://localhost:{}/circuits/circuits/", config.port);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
