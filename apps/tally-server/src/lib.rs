//! # Tally Server Library
//!
//! HTTP+JSON API for a single-shop point of sale.
//!
//! ## Module Organization
//! ```text
//! tally_server/
//! ├── lib.rs          ◄─── You are here (router, tracing, shutdown)
//! ├── config.rs       ◄─── TALLY_* environment configuration
//! ├── state.rs        ◄─── AppState (database handle)
//! ├── error.rs        ◄─── ApiError → JSON error body + status
//! └── routes/
//!     ├── mod.rs          ◄─── Route table
//!     ├── health.rs
//!     ├── products.rs
//!     ├── sales.rs
//!     ├── withdrawals.rs
//!     ├── stock_arrivals.rs
//!     ├── reports.rs      ◄─── Dashboard, daily/monthly, resets
//!     └── query.rs        ◄─── Ad-hoc SQL
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Initialize Logging ─── tracing-subscriber, RUST_LOG or default     │
//! │  2. Load Configuration ─── ServerConfig::load()                        │
//! │  3. Connect to Database ── WAL, foreign keys, pending migrations       │
//! │  4. Build Router ───────── routes + TraceLayer + CORS                  │
//! │  5. Serve ──────────────── until Ctrl+C / SIGTERM, then close the pool │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::AppState;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tally=debug,sqlx=warn,tower_http=info";

/// Builds the API router with request tracing.
pub fn build_router(state: AppState) -> Router {
    routes::api()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// CORS for the browser UI: one exact origin when configured, any otherwise.
pub fn cors_layer(origin: Option<&HeaderValue>) -> CorsLayer {
    let allow_origin = match origin {
        Some(origin) => AllowOrigin::exact(origin.clone()),
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=tally_db=trace` - Show trace for the database crate only
/// - Default: [`DEFAULT_LOG_FILTER`]
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(?e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(?e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
