//! # Domain Types
//!
//! Core domain types used throughout Tally POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    SaleItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──┼─────────────────┼───│  product_id     │       │
//! │  │  unit_type      │   │  id             │◄──│  sale_id        │       │
//! │  │  cost_price     │   │  total_amount   │   │  cost (snapshot)│       │
//! │  │  quantity       │   │  total_profit   │   │  profit         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │          ▲                                                              │
//! │          │             ┌─────────────────┐   ┌─────────────────┐       │
//! │          ├─────────────│   Withdrawal    │   │  StockArrival   │       │
//! │          │             │  cash | item    │   │  quantity       │       │
//! │          └─────────────│  amount         │   │  cost_price     │───────┘
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Money and Quantity Columns
//! Money is stored as integer cents (`*_cents` fields and columns) and
//! travels as a decimal amount under the name without the suffix:
//! `cost_price_cents: 250` is `"cost_price": 2.5` in JSON. Quantities use
//! [`Quantity`] (milli-units) and travel as decimal numbers the same way.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::quantity::Quantity;

// =============================================================================
// Unit Type
// =============================================================================

/// How a product is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum UnitType {
    /// Discrete items (a loaf, a can).
    #[default]
    Unit,
    /// Sold by weight (kg).
    Weight,
    /// Sold by volume (l).
    Volume,
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitType::Unit => write!(f, "unit"),
            UnitType::Weight => write!(f, "weight"),
            UnitType::Volume => write!(f, "volume"),
        }
    }
}

impl FromStr for UnitType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unit" => Ok(UnitType::Unit),
            "weight" => Ok(UnitType::Weight),
            "volume" => Ok(UnitType::Volume),
            _ => Err(ValidationError::NotAllowed {
                field: "unit_type".to_string(),
                allowed: vec!["unit".into(), "weight".into(), "volume".into()],
            }),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product on the shelf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: i64,

    /// Display name shown to the cashier.
    pub name: String,

    pub unit_type: UnitType,

    /// Cost per unit in cents. Overwritten by every stock arrival.
    #[serde(rename = "cost_price")]
    #[serde(with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub cost_price_cents: i64,

    /// Default selling price per unit in cents.
    #[serde(rename = "selling_price")]
    #[serde(with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub selling_price_cents: i64,

    /// Current stock level. May be negative after overselling.
    #[ts(type = "number")]
    pub quantity: Quantity,

    /// Stock level at or below which the product counts as low stock.
    #[ts(type = "number")]
    pub min_stock: Quantity,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn cost_price(&self) -> Money {
        Money::from_cents(self.cost_price_cents)
    }

    #[inline]
    pub fn selling_price(&self) -> Money {
        Money::from_cents(self.selling_price_cents)
    }

    /// True when the stock has dropped to the configured minimum.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_stock
    }

    /// Value of the stock on hand at cost. Oversold stock counts as zero.
    pub fn stock_value(&self) -> Money {
        if self.quantity.is_positive() {
            self.cost_price().times(self.quantity)
        } else {
            Money::zero()
        }
    }
}

/// Request body for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,

    #[serde(default)]
    pub unit_type: UnitType,

    #[serde(rename = "cost_price")]
    #[serde(with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub cost_price_cents: i64,

    #[serde(rename = "selling_price")]
    #[serde(with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub selling_price_cents: i64,

    /// Opening stock level.
    #[serde(default)]
    #[ts(type = "number")]
    pub quantity: Quantity,

    #[serde(default)]
    #[ts(type = "number")]
    pub min_stock: Quantity,
}

/// Request body for a partial product update. Absent fields are untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductPatch {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub unit_type: Option<UnitType>,

    #[serde(default)]
    #[serde(rename = "cost_price")]
    #[serde(with = "crate::money::decimal::option")]
    #[ts(type = "number | null")]
    pub cost_price_cents: Option<i64>,

    #[serde(default)]
    #[serde(rename = "selling_price")]
    #[serde(with = "crate::money::decimal::option")]
    #[ts(type = "number | null")]
    pub selling_price_cents: Option<i64>,

    #[serde(default)]
    #[ts(type = "number | null")]
    pub quantity: Option<Quantity>,

    #[serde(default)]
    #[ts(type = "number | null")]
    pub min_stock: Option<Quantity>,
}

impl ProductPatch {
    /// Returns true when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.unit_type.is_none()
            && self.cost_price_cents.is_none()
            && self.selling_price_cents.is_none()
            && self.quantity.is_none()
            && self.min_stock.is_none()
    }

    /// Applies the patch on top of an existing product.
    ///
    /// Timestamps are left alone; the repository refreshes `updated_at`.
    pub fn apply_to(&self, product: &Product) -> Product {
        Product {
            id: product.id,
            name: self
                .name
                .as_ref()
                .map(|n| n.trim().to_string())
                .unwrap_or_else(|| product.name.clone()),
            unit_type: self.unit_type.unwrap_or(product.unit_type),
            cost_price_cents: self.cost_price_cents.unwrap_or(product.cost_price_cents),
            selling_price_cents: self
                .selling_price_cents
                .unwrap_or(product.selling_price_cents),
            quantity: self.quantity.unwrap_or(product.quantity),
            min_stock: self.min_stock.unwrap_or(product.min_stock),
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A completed sale. Totals are back-filled once every line is recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: i64,
    #[serde(rename = "total_amount")]
    #[serde(with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub total_amount_cents: i64,
    #[serde(rename = "total_profit")]
    #[serde(with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub total_profit_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }

    #[inline]
    pub fn total_profit(&self) -> Money {
        Money::from_cents(self.total_profit_cents)
    }
}

/// A line in a sale.
/// Uses the snapshot pattern: `cost_price` freezes the product's cost at
/// the moment of sale so later stock arrivals don't rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub id: i64,
    pub sale_id: i64,
    pub product_id: i64,
    /// Current product name, when the product still exists.
    pub product_name: Option<String>,
    #[ts(type = "number")]
    pub quantity: Quantity,
    /// Selling price per unit actually charged.
    #[serde(rename = "unit_price")]
    #[serde(with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub unit_price_cents: i64,
    /// Product cost per unit at time of sale (frozen).
    #[serde(rename = "cost_price")]
    #[serde(with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub cost_price_cents: i64,
    /// `(unit_price - cost_price) × quantity`.
    #[serde(rename = "profit")]
    #[serde(with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub profit_cents: i64,
}

/// A sale together with its lines, as listed by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleWithItems {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

/// One line of a sale request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLine {
    pub product_id: i64,
    #[ts(type = "number")]
    pub quantity: Quantity,
    #[serde(rename = "selling_price")]
    #[serde(with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub selling_price_cents: i64,
}

/// Request body for ringing up a sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSale {
    pub items: Vec<SaleLine>,
}

// =============================================================================
// Withdrawal
// =============================================================================

/// What left the shop outside of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalKind {
    /// Money taken from the till (owner draw, petty cash).
    Cash,
    /// One unit of a product taken off the shelf (spoilage, own use).
    Item,
}

impl fmt::Display for WithdrawalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WithdrawalKind::Cash => write!(f, "cash"),
            WithdrawalKind::Item => write!(f, "item"),
        }
    }
}

/// A recorded withdrawal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Withdrawal {
    pub id: i64,
    #[serde(rename = "type")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "type"))]
    pub kind: WithdrawalKind,
    pub product_id: Option<i64>,
    pub product_name: Option<String>,
    /// Cash amount, or the cash-equivalent value of the item taken.
    #[serde(rename = "amount")]
    #[serde(with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub amount_cents: i64,
    pub description: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Withdrawal {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    /// Stock this withdrawal removed from its product.
    pub fn stock_removed(&self) -> Quantity {
        match self.kind {
            WithdrawalKind::Cash => Quantity::zero(),
            WithdrawalKind::Item => Quantity::ONE,
        }
    }
}

/// Request body for recording a withdrawal.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewWithdrawal {
    #[serde(rename = "type")]
    pub kind: WithdrawalKind,
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(rename = "amount")]
    #[serde(with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub amount_cents: i64,
    #[serde(default)]
    pub description: Option<String>,
}

// =============================================================================
// Stock Arrival
// =============================================================================

/// A delivery of stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockArrival {
    pub id: i64,
    pub product_id: i64,
    pub product_name: Option<String>,
    #[ts(type = "number")]
    pub quantity: Quantity,
    /// Cost per unit on this delivery; becomes the product's cost price.
    #[serde(rename = "cost_price")]
    #[serde(with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub cost_price_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Request body for recording a stock arrival.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewStockArrival {
    pub product_id: i64,
    #[ts(type = "number")]
    pub quantity: Quantity,
    #[serde(rename = "cost_price")]
    #[serde(with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub cost_price_cents: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(quantity: i64, min_stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: 1,
            name: "Rye Bread".to_string(),
            unit_type: UnitType::Unit,
            cost_price_cents: 150,
            selling_price_cents: 250,
            quantity: Quantity::from_units(quantity),
            min_stock: Quantity::from_units(min_stock),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_unit_type_parse_and_display() {
        assert_eq!("Weight".parse::<UnitType>().unwrap(), UnitType::Weight);
        assert_eq!(UnitType::Volume.to_string(), "volume");
        assert!("crate".parse::<UnitType>().is_err());
        assert_eq!(UnitType::default(), UnitType::Unit);
    }

    #[test]
    fn test_low_stock() {
        assert!(product(2, 2).is_low_stock());
        assert!(product(-1, 0).is_low_stock());
        assert!(!product(3, 2).is_low_stock());
    }

    #[test]
    fn test_stock_value_ignores_oversold() {
        assert_eq!(product(4, 0).stock_value().cents(), 600);
        assert_eq!(product(-3, 0).stock_value().cents(), 0);
    }

    #[test]
    fn test_patch_applies_only_present_fields() {
        let original = product(5, 1);
        let patch = ProductPatch {
            name: Some("  Sourdough ".to_string()),
            selling_price_cents: Some(300),
            ..Default::default()
        };

        let patched = patch.apply_to(&original);
        assert_eq!(patched.name, "Sourdough");
        assert_eq!(patched.selling_price_cents, 300);
        assert_eq!(patched.cost_price_cents, original.cost_price_cents);
        assert_eq!(patched.quantity, original.quantity);
        assert!(!patch.is_empty());
        assert!(ProductPatch::default().is_empty());
    }

    #[test]
    fn test_withdrawal_wire_name_is_type() {
        let body: NewWithdrawal =
            serde_json::from_str(r#"{"type":"item","product_id":7,"amount":5}"#).unwrap();
        assert_eq!(body.kind, WithdrawalKind::Item);
        assert_eq!(body.product_id, Some(7));
        assert_eq!(body.amount_cents, 500);
        assert!(body.description.is_none());
    }

    #[test]
    fn test_withdrawal_amount_is_required() {
        let missing = serde_json::from_str::<NewWithdrawal>(r#"{"type":"cash"}"#);
        assert!(missing.is_err());

        let renamed = serde_json::from_str::<NewWithdrawal>(r#"{"type":"cash","amount_cents":150}"#);
        assert!(renamed.is_err());
    }

    #[test]
    fn test_sale_line_reads_decimal_selling_price() {
        let line: SaleLine =
            serde_json::from_str(r#"{"product_id":1,"quantity":1,"selling_price":2.5}"#).unwrap();
        assert_eq!(line.selling_price_cents, 250);
        assert_eq!(line.quantity, Quantity::ONE);
    }

    #[test]
    fn test_product_json_uses_decimal_prices() {
        let json = serde_json::to_value(product(3, 1)).unwrap();
        assert_eq!(json["cost_price"], 1.5);
        assert_eq!(json["selling_price"], 2.5);
        assert_eq!(json["quantity"], 3);
        assert!(json.get("cost_price_cents").is_none());

        let patch: ProductPatch = serde_json::from_str(r#"{"selling_price":3}"#).unwrap();
        assert_eq!(patch.selling_price_cents, Some(300));
        assert_eq!(patch.cost_price_cents, None);
    }

    #[test]
    fn test_item_withdrawal_removes_one_unit() {
        let w = Withdrawal {
            id: 1,
            kind: WithdrawalKind::Item,
            product_id: Some(1),
            product_name: None,
            amount_cents: 9_999,
            description: None,
            created_at: Utc::now(),
        };
        assert_eq!(w.stock_removed(), Quantity::ONE);
    }

    #[test]
    fn test_sale_with_items_flattens_sale() {
        let sale = SaleWithItems {
            sale: Sale {
                id: 3,
                total_amount_cents: 500,
                total_profit_cents: 200,
                created_at: Utc::now(),
            },
            items: vec![],
        };
        let json = serde_json::to_value(&sale).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["total_amount"], 5);
        assert_eq!(json["total_profit"], 2);
        assert!(json["items"].as_array().unwrap().is_empty());
    }
}
