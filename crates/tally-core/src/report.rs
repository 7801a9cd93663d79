//! # Reports
//!
//! Aggregations over sales and withdrawals for the dashboard and the
//! daily/monthly reports. The database layer fetches rows; everything
//! here is arithmetic on already-loaded records.
//!
//! ## Profit Definition
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   net_profit = Σ sale.total_profit  −  Σ withdrawal.amount              │
//! │                                                                         │
//! │   Both sums are over the same period. Cash and item withdrawals        │
//! │   count alike: an item's amount is its cash-equivalent value.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::money::Money;
use crate::period::{local_date, Period};
use crate::types::{Product, Sale, SaleWithItems, Withdrawal};

// =============================================================================
// Period Summary
// =============================================================================

/// Totals for a set of sales and withdrawals.
///
/// Sums saturate at the i64 bounds rather than wrap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PeriodSummary {
    pub sales_count: i64,
    pub withdrawals_count: i64,
    #[serde(rename = "total_amount")]
    #[serde(with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub total_amount_cents: i64,
    #[serde(rename = "total_profit")]
    #[serde(with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub total_profit_cents: i64,
    #[serde(rename = "total_withdrawals")]
    #[serde(with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub withdrawals_cents: i64,
    /// `total_profit - total_withdrawals`.
    #[serde(rename = "net_profit")]
    #[serde(with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub net_profit_cents: i64,
}

impl PeriodSummary {
    pub fn add_sale(&mut self, sale: &Sale) {
        self.sales_count += 1;
        self.total_amount_cents = self.total_amount_cents.saturating_add(sale.total_amount_cents);
        self.total_profit_cents = self.total_profit_cents.saturating_add(sale.total_profit_cents);
        self.net_profit_cents = self.net_profit_cents.saturating_add(sale.total_profit_cents);
    }

    pub fn add_withdrawal(&mut self, withdrawal: &Withdrawal) {
        self.withdrawals_count += 1;
        self.withdrawals_cents = self.withdrawals_cents.saturating_add(withdrawal.amount_cents);
        self.net_profit_cents = self.net_profit_cents.saturating_sub(withdrawal.amount_cents);
    }

    /// Folds another summary into this one.
    pub fn merge(&mut self, other: &PeriodSummary) {
        self.sales_count += other.sales_count;
        self.withdrawals_count += other.withdrawals_count;
        self.total_amount_cents = self.total_amount_cents.saturating_add(other.total_amount_cents);
        self.total_profit_cents = self.total_profit_cents.saturating_add(other.total_profit_cents);
        self.withdrawals_cents = self.withdrawals_cents.saturating_add(other.withdrawals_cents);
        self.net_profit_cents = self.net_profit_cents.saturating_add(other.net_profit_cents);
    }

    /// Summarizes the given records.
    pub fn from_records<'a>(
        sales: impl IntoIterator<Item = &'a Sale>,
        withdrawals: impl IntoIterator<Item = &'a Withdrawal>,
    ) -> Self {
        let mut summary = Self::default();
        for sale in sales {
            summary.add_sale(sale);
        }
        for withdrawal in withdrawals {
            summary.add_withdrawal(withdrawal);
        }
        summary
    }
}

// =============================================================================
// Daily Report
// =============================================================================

/// Everything that happened on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailyReport {
    /// `YYYY-MM-DD`.
    pub date: String,
    #[serde(flatten)]
    pub summary: PeriodSummary,
    pub sales: Vec<SaleWithItems>,
    pub withdrawals: Vec<Withdrawal>,
}

impl DailyReport {
    pub fn build(day: Period, sales: Vec<SaleWithItems>, withdrawals: Vec<Withdrawal>) -> Self {
        let summary = PeriodSummary::from_records(sales.iter().map(|s| &s.sale), &withdrawals);
        Self {
            date: day.to_string(),
            summary,
            sales,
            withdrawals,
        }
    }
}

// =============================================================================
// Monthly Report
// =============================================================================

/// One day's line in a monthly report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DaySummary {
    /// `YYYY-MM-DD`.
    pub date: String,
    #[serde(flatten)]
    pub summary: PeriodSummary,
}

/// Day-by-day totals for a calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MonthlyReport {
    /// `YYYY-MM`.
    pub month: String,
    #[serde(flatten)]
    pub summary: PeriodSummary,
    /// Only days with at least one sale or withdrawal, oldest first.
    pub days: Vec<DaySummary>,
}

impl MonthlyReport {
    /// Groups records by their calendar day in `tz`.
    ///
    /// Records outside the month are ignored; the caller normally fetches
    /// exactly the month's range.
    pub fn build<Tz: TimeZone>(
        month: Period,
        sales: &[Sale],
        withdrawals: &[Withdrawal],
        tz: &Tz,
    ) -> Self {
        let first = month.first_day();
        let end = month.end_day();
        let in_month = |d: &NaiveDate| *d >= first && *d < end;

        let mut by_day: BTreeMap<NaiveDate, PeriodSummary> = BTreeMap::new();
        for sale in sales {
            let day = local_date(&sale.created_at, tz);
            if in_month(&day) {
                by_day.entry(day).or_default().add_sale(sale);
            }
        }
        for withdrawal in withdrawals {
            let day = local_date(&withdrawal.created_at, tz);
            if in_month(&day) {
                by_day.entry(day).or_default().add_withdrawal(withdrawal);
            }
        }

        let mut summary = PeriodSummary::default();
        let days = by_day
            .into_iter()
            .map(|(date, day)| {
                summary.merge(&day);
                DaySummary {
                    date: date.format("%Y-%m-%d").to_string(),
                    summary: day,
                }
            })
            .collect();

        Self {
            month: month.to_string(),
            summary,
            days,
        }
    }
}

// =============================================================================
// Dashboard
// =============================================================================

/// Headline numbers for the shop's front page. Money fields hold cents and
/// travel as decimal amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DashboardStats {
    #[serde(with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub today_sales: i64,
    #[serde(with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub today_profit: i64,
    #[serde(with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub today_withdrawals: i64,
    /// Today's sales profit minus today's withdrawals.
    #[serde(with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub total_profit: i64,
    pub sales_count: i64,
    pub product_count: i64,
    pub low_stock_count: i64,
    /// Value at cost of all positive stock.
    #[serde(with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub stock_value: i64,
    pub low_stock_products: Vec<Product>,
}

impl DashboardStats {
    pub fn build(today_sales: &[Sale], today_withdrawals: &[Withdrawal], products: &[Product]) -> Self {
        let today = PeriodSummary::from_records(today_sales, today_withdrawals);
        let low_stock_products: Vec<Product> =
            products.iter().filter(|p| p.is_low_stock()).cloned().collect();
        let stock_value: Money = products.iter().map(Product::stock_value).sum();

        Self {
            today_sales: today.total_amount_cents,
            today_profit: today.total_profit_cents,
            today_withdrawals: today.withdrawals_cents,
            total_profit: today.net_profit_cents,
            sales_count: today.sales_count,
            product_count: products.len() as i64,
            low_stock_count: low_stock_products.len() as i64,
            stock_value: stock_value.cents(),
            low_stock_products,
        }
    }
}

// =============================================================================
// Reset Summary
// =============================================================================

/// Rows removed by a daily or monthly reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ResetSummary {
    /// `YYYY-MM-DD` or `YYYY-MM`.
    pub period: String,
    pub sales_deleted: u64,
    pub sale_items_deleted: u64,
    pub withdrawals_deleted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::Quantity;
    use crate::types::{UnitType, WithdrawalKind};
    use chrono::{DateTime, Utc};

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn sale(id: i64, amount: i64, profit: i64, created_at: DateTime<Utc>) -> Sale {
        Sale {
            id,
            total_amount_cents: amount,
            total_profit_cents: profit,
            created_at,
        }
    }

    fn cash(id: i64, amount: i64, created_at: DateTime<Utc>) -> Withdrawal {
        Withdrawal {
            id,
            kind: WithdrawalKind::Cash,
            product_id: None,
            product_name: None,
            amount_cents: amount,
            description: None,
            created_at,
        }
    }

    fn product(id: i64, qty: i64, min: i64, cost: i64) -> Product {
        let now = Utc::now();
        Product {
            id,
            name: format!("Product {}", id),
            unit_type: UnitType::Unit,
            cost_price_cents: cost,
            selling_price_cents: cost * 2,
            quantity: Quantity::from_units(qty),
            min_stock: Quantity::from_units(min),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_period_summary_net_profit() {
        let now = Utc::now();
        let sales = [sale(1, 1000, 400, now), sale(2, 500, 100, now)];
        let withdrawals = [cash(1, 150, now)];

        let summary = PeriodSummary::from_records(&sales, &withdrawals);
        assert_eq!(summary.sales_count, 2);
        assert_eq!(summary.total_amount_cents, 1500);
        assert_eq!(summary.total_profit_cents, 500);
        assert_eq!(summary.withdrawals_cents, 150);
        assert_eq!(summary.net_profit_cents, 350);
    }

    #[test]
    fn test_period_summary_saturates() {
        let now = Utc::now();
        let sales = [sale(1, i64::MAX, i64::MAX, now), sale(2, 10, 10, now)];
        let withdrawals = [cash(1, i64::MAX, now)];

        let summary = PeriodSummary::from_records(&sales, &withdrawals);
        assert_eq!(summary.total_amount_cents, i64::MAX);
        assert_eq!(summary.total_profit_cents, i64::MAX);
        assert_eq!(summary.net_profit_cents, 0);
    }

    #[test]
    fn test_daily_report_counts_and_date() {
        let now = at(2024, 5, 2, 10);
        let sales = vec![SaleWithItems {
            sale: sale(1, 700, 300, now),
            items: vec![],
        }];
        let report = DailyReport::build(Period::parse_day("2024-05-02").unwrap(), sales, vec![cash(1, 50, now)]);

        assert_eq!(report.date, "2024-05-02");
        assert_eq!(report.summary.net_profit_cents, 250);
        assert_eq!(report.summary.withdrawals_count, 1);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["net_profit"], 2.5);
        assert_eq!(json["total_withdrawals"], 0.5);
        assert_eq!(json["sales"].as_array().unwrap().len(), 1);
        assert_eq!(json["withdrawals"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_monthly_report_groups_by_day() {
        let month = Period::parse_month("2024-05").unwrap();
        let sales = [
            sale(1, 1000, 400, at(2024, 5, 1, 9)),
            sale(2, 200, 50, at(2024, 5, 1, 17)),
            sale(3, 300, 100, at(2024, 5, 3, 12)),
            sale(4, 999, 999, at(2024, 6, 1, 12)),
        ];
        let withdrawals = [cash(1, 75, at(2024, 5, 3, 18))];

        let report = MonthlyReport::build(month, &sales, &withdrawals, &Utc);
        assert_eq!(report.month, "2024-05");
        assert_eq!(report.days.len(), 2);
        assert_eq!(report.days[0].date, "2024-05-01");
        assert_eq!(report.days[0].summary.sales_count, 2);
        assert_eq!(report.days[0].summary.total_profit_cents, 450);
        assert_eq!(report.days[1].summary.net_profit_cents, 25);
        assert_eq!(report.summary.sales_count, 3);
        assert_eq!(report.summary.net_profit_cents, 475);
    }

    #[test]
    fn test_dashboard_total_profit_subtracts_withdrawals() {
        let now = Utc::now();
        let sales = [sale(1, 2000, 800, now)];
        let withdrawals = [cash(1, 300, now), cash(2, 200, now)];
        let products = [product(1, 10, 2, 100), product(2, 1, 5, 50), product(3, -2, 0, 70)];

        let stats = DashboardStats::build(&sales, &withdrawals, &products);
        assert_eq!(stats.today_profit, 800);
        assert_eq!(stats.today_withdrawals, 500);
        assert_eq!(stats.total_profit, 300);
        assert_eq!(stats.product_count, 3);
        assert_eq!(stats.low_stock_count, 2);
        assert_eq!(stats.stock_value, 10 * 100 + 50);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["totalProfit"], 3);
        assert_eq!(json["todayWithdrawals"], 5);
        assert_eq!(json["stockValue"], 10.5);
        assert!(json["lowStockProducts"].is_array());
    }
}
