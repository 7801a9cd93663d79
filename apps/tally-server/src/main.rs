//! # Tally POS Server
//!
//! Entry point: configuration, database, HTTP listener.

use anyhow::Context;
use tracing::info;

use tally_db::Database;
use tally_server::{build_router, cors_layer, init_tracing, shutdown_signal, AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Tally POS server...");

    let config = ServerConfig::load().context("loading configuration")?;
    info!(
        addr = %config.bind_addr(),
        db_path = %config.db_path.display(),
        max_connections = config.db_max_connections,
        cors_origin = ?config.cors_origin,
        "Configuration loaded"
    );

    let db = Database::new(config.db_config())
        .await
        .with_context(|| format!("opening database at {}", config.db_path.display()))?;
    info!("Database connected and migrations applied");

    let app = build_router(AppState::new(db.clone())).layer(cors_layer(config.cors_origin.as_ref()));

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("binding {}", config.bind_addr()))?;
    info!(addr = %config.bind_addr(), "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}
