//! Server configuration.
//!
//! Configuration is loaded from `TALLY_*` environment variables with
//! fallback to defaults.
//!
//! | Variable                   | Default                          |
//! |----------------------------|----------------------------------|
//! | `TALLY_HOST`               | `127.0.0.1`                      |
//! | `TALLY_PORT`               | `3001`                           |
//! | `TALLY_DB_PATH`            | platform data dir + `tally.db`   |
//! | `TALLY_DB_MAX_CONNECTIONS` | `1`                              |
//! | `TALLY_DB_TIMEOUT_SECS`    | `30` (wait for a free connection)|
//! | `TALLY_CORS_ORIGIN`        | unset (any origin allowed)       |

use axum::http::HeaderValue;
use directories::ProjectDirs;
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;
use tally_db::DbConfig;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on
    pub host: IpAddr,

    /// Port to listen on
    pub port: u16,

    /// SQLite database file
    pub db_path: PathBuf,

    /// Pool size; 1 makes requests queue on a single connection
    pub db_max_connections: u32,

    /// How long a queued request waits for the connection
    pub db_timeout: Duration,

    /// Allowed browser origin; `None` allows any
    pub cors_origin: Option<HeaderValue>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = match lookup("TALLY_HOST") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidValue("TALLY_HOST".to_string()))?,
            None => IpAddr::V4(Ipv4Addr::LOCALHOST),
        };

        let port = lookup("TALLY_PORT")
            .unwrap_or_else(|| "3001".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("TALLY_PORT".to_string()))?;

        let db_path = match lookup("TALLY_DB_PATH") {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_db_path()?,
        };

        let db_max_connections = lookup("TALLY_DB_MAX_CONNECTIONS")
            .unwrap_or_else(|| "1".to_string())
            .parse::<u32>()
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(|| ConfigError::InvalidValue("TALLY_DB_MAX_CONNECTIONS".to_string()))?;

        let db_timeout = lookup("TALLY_DB_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse::<u64>()
            .ok()
            .filter(|n| *n >= 1)
            .map(Duration::from_secs)
            .ok_or_else(|| ConfigError::InvalidValue("TALLY_DB_TIMEOUT_SECS".to_string()))?;

        let cors_origin = match lookup("TALLY_CORS_ORIGIN") {
            Some(origin) => Some(
                HeaderValue::from_str(origin.trim())
                    .map_err(|_| ConfigError::InvalidValue("TALLY_CORS_ORIGIN".to_string()))?,
            ),
            None => None,
        };

        Ok(ServerConfig {
            host,
            port,
            db_path,
            db_max_connections,
            db_timeout,
            cors_origin,
        })
    }

    /// Socket address the listener binds to.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Pool configuration for [`tally_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.db_path)
            .max_connections(self.db_max_connections)
            .connect_timeout(self.db_timeout)
    }
}

/// Platform data directory for the database.
///
/// - **macOS**: `~/Library/Application Support/com.tally.pos/tally.db`
/// - **Windows**: `%APPDATA%\tally\pos\data\tally.db`
/// - **Linux**: `~/.local/share/pos/tally.db`
fn default_db_path() -> Result<PathBuf, ConfigError> {
    let dirs = ProjectDirs::from("com", "tally", "pos").ok_or(ConfigError::NoDataDir)?;
    Ok(dirs.data_dir().join("tally.db"))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Could not determine app data directory; set TALLY_DB_PATH")]
    NoDataDir,
}

// =============================================================================
// Unit Tests
// =============================================================================
