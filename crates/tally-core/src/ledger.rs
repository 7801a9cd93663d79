//! # Ledger Math
//!
//! Per-line and per-sale money arithmetic.
//!
//! ## Sale Recording
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  for each SaleLine:                                                    │
//! │      cost    = product.cost_price        (read inside the transaction) │
//! │      amount  = selling_price × quantity                                │
//! │      profit  = (selling_price − cost) × quantity                       │
//! │      totals += (amount, profit)                                        │
//! │                                                                         │
//! │  sale.total_amount = Σ amount                                          │
//! │  sale.total_profit = Σ profit                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each line is rounded to the cent once; totals are exact sums of the
//! rounded lines, so `total_profit` always equals the sum of its items.
//! Any figure that leaves the i64 range rejects the sale with
//! [`CoreError::AmountOverflow`] instead of wrapping.

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::quantity::Quantity;

/// Money figures for a single sale line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineFigures {
    /// What the customer pays for the line.
    pub amount: Money,
    /// What the shop earns over cost on the line.
    pub profit: Money,
}

/// Computes the figures for one line.
///
/// ## Example
/// ```rust
/// use tally_core::ledger::line_figures;
/// use tally_core::money::Money;
/// use tally_core::quantity::Quantity;
///
/// let line = line_figures(Money::from_cents(250), Money::from_cents(150), Quantity::from_units(3)).unwrap();
/// assert_eq!(line.amount.cents(), 750);
/// assert_eq!(line.profit.cents(), 300);
/// ```
pub fn line_figures(
    unit_price: Money,
    cost_price: Money,
    quantity: Quantity,
) -> CoreResult<LineFigures> {
    let amount = unit_price.checked_times(quantity);
    let profit = unit_price
        .checked_sub(cost_price)
        .and_then(|margin| margin.checked_times(quantity));

    match (amount, profit) {
        (Some(amount), Some(profit)) => Ok(LineFigures { amount, profit }),
        _ => Err(CoreError::AmountOverflow),
    }
}

/// Running totals of a sale while its lines are recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaleTotals {
    pub amount: Money,
    pub profit: Money,
}

impl SaleTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes a line and adds it to the totals. Returns the line figures.
    ///
    /// On overflow the totals are left untouched.
    pub fn record_line(
        &mut self,
        unit_price: Money,
        cost_price: Money,
        quantity: Quantity,
    ) -> CoreResult<LineFigures> {
        let figures = line_figures(unit_price, cost_price, quantity)?;
        let amount = self
            .amount
            .checked_add(figures.amount)
            .ok_or(CoreError::AmountOverflow)?;
        let profit = self
            .profit
            .checked_add(figures.profit)
            .ok_or(CoreError::AmountOverflow)?;

        self.amount = amount;
        self.profit = profit;
        Ok(figures)
    }
}
