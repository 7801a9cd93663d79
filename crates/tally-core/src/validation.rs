//! # Validation Module
//!
//! Input validation for every request body the API accepts.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: axum extractors                                              │
//! │  ├── JSON shape and types (deserialization)                            │
//! │  └── Rejected as 400 before a handler runs                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Field rules (names, prices, quantities)                           │
//! │  └── Request rules (sale lines, item withdrawals)                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::validation::{validate_product_name, validate_price_cents};
//!
//! assert!(validate_product_name("Whole Milk 1l").is_ok());
//! assert!(validate_price_cents("selling_price", -1).is_err());
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::{NewProduct, NewSale, NewStockArrival, NewWithdrawal, ProductPatch, WithdrawalKind};
use crate::{DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT, MAX_PRICE_CENTS, MAX_QUANTITY_MILLI, MAX_SALE_LINES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Rye Bread").is_ok());
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a product search term.
///
/// Empty is allowed and means "no filter". Returns the trimmed term.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

/// Validates a withdrawal description. Returns the trimmed text, or `None`
/// when blank.
pub fn validate_description(description: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(text) = description.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };

    if text.chars().count() > 500 {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: 500,
        });
    }

    Ok(Some(text.to_string()))
}

/// Validates an ad-hoc SQL statement. Only emptiness is checked; the
/// database reports everything else.
pub fn validate_sql(sql: &str) -> ValidationResult<()> {
    if sql.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "sql".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price or amount in cents.
///
/// ## Rules
/// - Zero is allowed, negative is not
/// - At most `MAX_PRICE_CENTS`
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents("cost_price", 0).is_ok());
/// assert!(validate_price_cents("cost_price", -100).is_err());
/// assert!(validate_price_cents("cost_price", i64::MAX).is_err());
/// ```
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    if cents > MAX_PRICE_CENTS {
        return Err(ValidationError::TooLarge {
            field: field.to_string(),
            max: Money::from_cents(MAX_PRICE_CENTS).to_string(),
        });
    }

    Ok(())
}

/// Rejects quantities whose magnitude exceeds `MAX_QUANTITY_MILLI`.
fn validate_quantity_magnitude(field: &str, qty: Quantity) -> ValidationResult<()> {
    if qty.milli().unsigned_abs() > MAX_QUANTITY_MILLI as u64 {
        return Err(ValidationError::TooLarge {
            field: field.to_string(),
            max: Quantity::from_milli(MAX_QUANTITY_MILLI).to_string(),
        });
    }

    Ok(())
}

/// Validates a quantity that moves stock (sale line, arrival).
///
/// ## User Workflow
/// ```text
/// Cashier enters 0.25 kg of cheese
///      │
///      ▼
/// validate_quantity("quantity", 0.25) ← THIS FUNCTION
///      │
///      ├── qty <= 0? → Error: "quantity must be positive"
///      ├── qty > 1e9? → Error: "quantity must be at most 1000000000"
///      │
///      └── OK → line is recorded, stock drops by 0.25
/// ```
pub fn validate_quantity(field: &str, qty: Quantity) -> ValidationResult<()> {
    if !qty.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    validate_quantity_magnitude(field, qty)
}

/// Validates a configured stock level (`min_stock`). Zero is allowed.
pub fn validate_stock_level(field: &str, qty: Quantity) -> ValidationResult<()> {
    if qty.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    validate_quantity_magnitude(field, qty)
}

/// Validates a stock level set by hand (opening stock, corrections).
/// Negative values are allowed to mirror an oversold shelf.
pub fn validate_stock_correction(field: &str, qty: Quantity) -> ValidationResult<()> {
    validate_quantity_magnitude(field, qty)
}

/// Resolves a listing `limit` query parameter.
///
/// ## Rules
/// - Absent → `DEFAULT_LIST_LIMIT` (100)
/// - Must be between 1 and `MAX_LIST_LIMIT` (1000)
pub fn validate_list_limit(limit: Option<i64>) -> ValidationResult<i64> {
    let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT);

    if !(1..=MAX_LIST_LIMIT).contains(&limit) {
        return Err(ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: MAX_LIST_LIMIT,
        });
    }

    Ok(limit)
}

// =============================================================================
// Request Validators
// =============================================================================

/// Validates a product creation request.
pub fn validate_new_product(input: &NewProduct) -> ValidationResult<()> {
    validate_product_name(&input.name)?;
    validate_price_cents("cost_price", input.cost_price_cents)?;
    validate_price_cents("selling_price", input.selling_price_cents)?;
    validate_stock_correction("quantity", input.quantity)?;
    validate_stock_level("min_stock", input.min_stock)?;
    Ok(())
}

/// Validates a partial product update. Only present fields are checked.
///
/// `quantity` may be set to any value, including negative, since
/// a manual stock correction has to be able to mirror an oversold shelf.
pub fn validate_product_patch(patch: &ProductPatch) -> CoreResult<()> {
    if patch.is_empty() {
        return Err(CoreError::EmptyUpdate);
    }

    if let Some(name) = &patch.name {
        validate_product_name(name)?;
    }
    if let Some(cents) = patch.cost_price_cents {
        validate_price_cents("cost_price", cents)?;
    }
    if let Some(cents) = patch.selling_price_cents {
        validate_price_cents("selling_price", cents)?;
    }
    if let Some(quantity) = patch.quantity {
        validate_stock_correction("quantity", quantity)?;
    }
    if let Some(min_stock) = patch.min_stock {
        validate_stock_level("min_stock", min_stock)?;
    }

    Ok(())
}

/// Validates a sale before the transaction opens.
///
/// ## Rules
/// - At least one line, at most `MAX_SALE_LINES`
/// - Every line quantity > 0 and at most `MAX_QUANTITY_MILLI`
/// - Every line price between 0 and `MAX_PRICE_CENTS`
///
/// Stock levels are NOT checked: a sale may drive stock negative.
pub fn validate_new_sale(sale: &NewSale) -> CoreResult<()> {
    if sale.items.is_empty() {
        return Err(CoreError::EmptySale);
    }

    if sale.items.len() > MAX_SALE_LINES {
        return Err(CoreError::TooManySaleLines {
            max: MAX_SALE_LINES,
        });
    }

    for line in &sale.items {
        validate_quantity("quantity", line.quantity)?;
        validate_price_cents("selling_price", line.selling_price_cents)?;
    }

    Ok(())
}

/// Validates a withdrawal. Item withdrawals must name a product.
pub fn validate_new_withdrawal(input: &NewWithdrawal) -> CoreResult<()> {
    validate_price_cents("amount", input.amount_cents)?;
    validate_description(input.description.as_deref())?;

    if input.kind == WithdrawalKind::Item && input.product_id.is_none() {
        return Err(CoreError::ItemWithdrawalWithoutProduct);
    }

    Ok(())
}

/// Validates a stock arrival.
pub fn validate_new_stock_arrival(input: &NewStockArrival) -> ValidationResult<()> {
    validate_quantity("quantity", input.quantity)?;
    validate_price_cents("cost_price", input.cost_price_cents)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SaleLine, UnitType};

    fn line(quantity: Quantity, price: i64) -> SaleLine {
        SaleLine {
            product_id: 1,
            quantity,
            selling_price_cents: price,
        }
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Whole Milk 1l").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name("   ").is_err());
        assert!(validate_product_name(&"A".repeat(200)).is_ok());
        assert!(validate_product_name(&"A".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_search_query_trims() {
        assert_eq!(validate_search_query("  milk ").unwrap(), "milk");
        assert!(validate_search_query(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_description() {
        assert_eq!(validate_description(None).unwrap(), None);
        assert_eq!(validate_description(Some("  ")).unwrap(), None);
        assert_eq!(
            validate_description(Some(" lunch ")).unwrap().as_deref(),
            Some("lunch")
        );
        assert!(validate_description(Some(&"x".repeat(501))).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity("quantity", Quantity::from_milli(1)).is_ok());
        assert!(validate_quantity("quantity", Quantity::zero()).is_err());
        assert!(validate_quantity("quantity", Quantity::from_units(-2)).is_err());
    }

    #[test]
    fn test_validate_price_upper_bound() {
        assert!(validate_price_cents("selling_price", MAX_PRICE_CENTS).is_ok());
        let err = validate_price_cents("selling_price", 5_000_000_000_000_000_000).unwrap_err();
        assert!(matches!(err, ValidationError::TooLarge { .. }));
        assert_eq!(err.to_string(), "selling_price must be at most $100000000.00");
    }

    #[test]
    fn test_validate_quantity_upper_bound() {
        let max = Quantity::from_milli(MAX_QUANTITY_MILLI);
        assert!(validate_quantity("quantity", max).is_ok());
        assert!(validate_quantity("quantity", max + Quantity::from_milli(1)).is_err());
        assert!(validate_stock_correction("quantity", -max).is_ok());
        assert!(validate_stock_correction("quantity", -max - Quantity::ONE).is_err());
    }

    #[test]
    fn test_validate_list_limit() {
        assert_eq!(validate_list_limit(None).unwrap(), DEFAULT_LIST_LIMIT);
        assert_eq!(validate_list_limit(Some(5)).unwrap(), 5);
        assert!(validate_list_limit(Some(0)).is_err());
        assert!(validate_list_limit(Some(MAX_LIST_LIMIT + 1)).is_err());
    }

    #[test]
    fn test_validate_new_product() {
        let mut input = NewProduct {
            name: "Cheddar".to_string(),
            unit_type: UnitType::Weight,
            cost_price_cents: 800,
            selling_price_cents: 1200,
            quantity: Quantity::from_milli(2500),
            min_stock: Quantity::from_units(1),
        };
        assert!(validate_new_product(&input).is_ok());

        input.selling_price_cents = -1;
        assert!(validate_new_product(&input).is_err());
    }

    #[test]
    fn test_validate_product_patch() {
        assert!(matches!(
            validate_product_patch(&ProductPatch::default()),
            Err(CoreError::EmptyUpdate)
        ));

        let correction = ProductPatch {
            quantity: Some(Quantity::from_units(-3)),
            ..Default::default()
        };
        assert!(validate_product_patch(&correction).is_ok());

        let bad = ProductPatch {
            min_stock: Some(Quantity::from_units(-1)),
            ..Default::default()
        };
        assert!(validate_product_patch(&bad).is_err());
    }

    #[test]
    fn test_validate_new_sale() {
        let empty = NewSale { items: vec![] };
        assert!(matches!(validate_new_sale(&empty), Err(CoreError::EmptySale)));

        let ok = NewSale {
            items: vec![line(Quantity::from_units(2), 250), line(Quantity::from_milli(500), 0)],
        };
        assert!(validate_new_sale(&ok).is_ok());

        let zero_qty = NewSale {
            items: vec![line(Quantity::zero(), 250)],
        };
        assert!(validate_new_sale(&zero_qty).is_err());

        let oversized_price = NewSale {
            items: vec![line(Quantity::from_units(2), 5_000_000_000_000_000_000)],
        };
        assert!(matches!(
            validate_new_sale(&oversized_price),
            Err(CoreError::Validation(ValidationError::TooLarge { .. }))
        ));

        let too_many = NewSale {
            items: (0..=MAX_SALE_LINES).map(|_| line(Quantity::ONE, 1)).collect(),
        };
        assert!(matches!(
            validate_new_sale(&too_many),
            Err(CoreError::TooManySaleLines { .. })
        ));
    }

    #[test]
    fn test_validate_new_withdrawal() {
        let cash = NewWithdrawal {
            kind: WithdrawalKind::Cash,
            product_id: None,
            amount_cents: 2_000,
            description: Some("float".to_string()),
        };
        assert!(validate_new_withdrawal(&cash).is_ok());

        let item_without_product = NewWithdrawal {
            kind: WithdrawalKind::Item,
            product_id: None,
            amount_cents: 0,
            description: None,
        };
        assert!(matches!(
            validate_new_withdrawal(&item_without_product),
            Err(CoreError::ItemWithdrawalWithoutProduct)
        ));
    }

    #[test]
    fn test_validate_new_stock_arrival() {
        let arrival = NewStockArrival {
            product_id: 1,
            quantity: Quantity::from_units(24),
            cost_price_cents: 90,
        };
        assert!(validate_new_stock_arrival(&arrival).is_ok());

        let empty = NewStockArrival {
            quantity: Quantity::zero(),
            ..arrival
        };
        assert!(validate_new_stock_arrival(&empty).is_err());
    }
}
