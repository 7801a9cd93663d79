//! # tally-db: Database Layer for Tally POS
//!
//! This crate provides database access for the Tally POS system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (POST /api/sales)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     tally-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo    │   │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SaleRepo       │   │ 001_initial  │  │   │
//! │  │   │ Transactions  │    │ WithdrawalRepo │   │  _schema.sql │  │   │
//! │  │   │               │    │ ArrivalRepo    │   │              │  │   │
//! │  │   │               │    │ ReportRepo     │   │              │  │   │
//! │  │   │               │    │ QueryRepo      │   │              │  │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (WAL mode)                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use tally_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./tally.db")).await?;
//! let stats = db.reports().dashboard(&chrono::Local::now()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use migrations::MigrationStatus;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::product::{ProductDeletion, ProductFilter, ProductRepository};
pub use repository::query::{QueryOutcome, QueryRepository};
pub use repository::report::ReportRepository;
pub use repository::sale::SaleRepository;
pub use repository::stock_arrival::StockArrivalRepository;
pub use repository::withdrawal::WithdrawalRepository;
