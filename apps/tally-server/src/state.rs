//! Shared handler state.

use tally_db::Database;

/// State handed to every handler through axum's `State` extractor.
///
/// `Database` is a cheap handle around the pool, so cloning per request is
/// fine.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState { db }
    }
}
