//! # tally-core: Pure Bookkeeping Logic for Tally POS
//!
//! This crate holds the shop's rules as pure functions with zero I/O
//! dependencies: money and quantity arithmetic, request validation, profit
//! math and report aggregation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Browser UI                                   │   │
//! │  │    Till ──► Stock ──► Withdrawals ──► Reports                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP + JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tally-server (axum)                          │   │
//! │  │    /api/products, /api/sales, /api/withdrawals, ...            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  ledger   │  │  report   │  │   │
//! │  │   │  Product  │  │   Money   │  │ line math │  │ Dashboard │  │   │
//! │  │   │   Sale    │  │ Quantity  │  │  totals   │  │  Daily    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • NO CLOCK                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tally-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, Withdrawal, StockArrival)
//! - [`money`] - Money type with integer arithmetic
//! - [`quantity`] - Stock quantities in milli-units
//! - [`ledger`] - Sale line and total math
//! - [`period`] - Report days and months
//! - [`report`] - Dashboard and report aggregation
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::ledger::SaleTotals;
//! use tally_core::money::Money;
//! use tally_core::quantity::Quantity;
//!
//! let mut totals = SaleTotals::new();
//! // 3 loaves at $2.50, bought in at $1.50
//! totals
//!     .record_line(Money::from_cents(250), Money::from_cents(150), Quantity::from_units(3))
//!     .unwrap();
//!
//! assert_eq!(totals.amount.cents(), 750);
//! assert_eq!(totals.profit.cents(), 300);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod money;
pub mod period;
pub mod quantity;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use period::Period;
pub use quantity::Quantity;
pub use report::{DailyReport, DashboardStats, DaySummary, MonthlyReport, PeriodSummary, ResetSummary};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single sale.
pub const MAX_SALE_LINES: usize = 100;

/// Rows returned by a listing when no `limit` is given.
pub const DEFAULT_LIST_LIMIT: i64 = 100;

/// Largest `limit` a listing accepts.
pub const MAX_LIST_LIMIT: i64 = 1000;

/// Largest price or amount a request may carry: 100,000,000.00.
pub const MAX_PRICE_CENTS: i64 = 10_000_000_000;

/// Largest stock quantity a request may carry: one billion units.
pub const MAX_QUANTITY_MILLI: i64 = 1_000_000_000_000;
