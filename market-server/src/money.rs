//! Money and quantity arithmetic
//!
//! Amounts and quantities are stored as `f64`. Every calculation goes
//! through `Decimal`, so sums such as an order total never pick up binary
//! floating point drift. Order totals are kept exact; derived money values
//! are rounded to paise. Surplus quantities carry at most 3 decimal places,
//! which keeps every decrement exact.

use rust_decimal::prelude::*;
use shared::models::{OrderItemInput, SurplusCreate};

use crate::error::{MarketError, MarketResult};

/// Monetary values: 2 decimal places, half away from zero
const MONEY_PLACES: u32 = 2;
/// Quantities (kg, litres, ...): 3 decimal places
const QUANTITY_PLACES: u32 = 3;

/// Maximum quantity of one order line
pub const MAX_ITEM_QUANTITY: f64 = 10_000.0;
/// Maximum estimated unit price of one order line (₹)
pub const MAX_ITEM_PRICE: f64 = 100_000.0;

#[inline]
fn require_finite(value: f64, field: &str) -> MarketResult<()> {
    if !value.is_finite() {
        return Err(MarketError::validation(format!(
            "{field} must be a finite number, got {value}"
        )));
    }
    Ok(())
}

/// Validate one order line before it is priced
pub fn validate_order_item(item: &OrderItemInput) -> MarketResult<()> {
    if item.name.trim().is_empty() {
        return Err(MarketError::validation("item name must not be empty"));
    }

    require_finite(item.quantity, "quantity")?;
    if item.quantity <= 0.0 {
        return Err(MarketError::validation(format!(
            "quantity must be positive, got {}",
            item.quantity
        )));
    }
    if item.quantity > MAX_ITEM_QUANTITY {
        return Err(MarketError::validation(format!(
            "quantity exceeds maximum allowed ({MAX_ITEM_QUANTITY}), got {}",
            item.quantity
        )));
    }

    require_finite(item.estimated_price, "estimated_price")?;
    if !(0.0..=MAX_ITEM_PRICE).contains(&item.estimated_price) {
        return Err(MarketError::validation(format!(
            "estimated_price must be between 0 and {MAX_ITEM_PRICE}, got {}",
            item.estimated_price
        )));
    }

    Ok(())
}

/// Reject quantities finer than [`QUANTITY_PLACES`] decimals
pub fn validate_quantity_scale(value: f64, field: &str) -> MarketResult<()> {
    if to_decimal(value).normalize().scale() > QUANTITY_PLACES {
        return Err(MarketError::validation(format!(
            "{field} allows at most {QUANTITY_PLACES} decimal places, got {value}"
        )));
    }
    Ok(())
}

/// Validate the numbers on a new surplus listing
pub fn validate_surplus_amounts(data: &SurplusCreate) -> MarketResult<()> {
    require_finite(data.quantity, "quantity")?;
    validate_quantity_scale(data.quantity, "quantity")?;
    if data.quantity <= 0.0 {
        return Err(MarketError::validation(format!(
            "quantity must be positive, got {}",
            data.quantity
        )));
    }

    require_finite(data.price, "price")?;
    if data.price < 0.0 {
        return Err(MarketError::validation(format!(
            "price must be non-negative, got {}",
            data.price
        )));
    }

    if let Some(op) = data.original_price {
        require_finite(op, "original_price")?;
        if op < data.price {
            return Err(MarketError::validation(format!(
                "original_price ({op}) must not be below price ({})",
                data.price
            )));
        }
    }

    for (field, value) in [
        ("min_quantity", data.min_quantity),
        ("max_quantity", data.max_quantity),
    ] {
        if let Some(v) = value {
            require_finite(v, field)?;
            validate_quantity_scale(v, field)?;
            if v <= 0.0 {
                return Err(MarketError::validation(format!(
                    "{field} must be positive, got {v}"
                )));
            }
        }
    }
    if let (Some(min), Some(max)) = (data.min_quantity, data.max_quantity)
        && min > max
    {
        return Err(MarketError::validation(format!(
            "min_quantity ({min}) exceeds max_quantity ({max})"
        )));
    }

    Ok(())
}

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(MONEY_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

#[inline]
fn to_quantity(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(QUANTITY_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Σ(estimated price × quantity) over the lines, unrounded
pub fn order_total(items: &[OrderItemInput]) -> f64 {
    let total: Decimal = items
        .iter()
        .map(|item| to_decimal(item.estimated_price) * to_decimal(item.quantity))
        .sum();
    total.normalize().to_f64().unwrap_or_default()
}

/// Whole-number discount of `price` off `original_price`; 0 without a usable original
pub fn discount_percentage(price: f64, original_price: Option<f64>) -> i32 {
    let Some(original) = original_price.map(to_decimal) else {
        return 0;
    };
    if original <= Decimal::ZERO {
        return 0;
    }
    ((original - to_decimal(price)) / original * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i32()
        .unwrap_or_default()
}

/// `remaining - taken`, never below zero.
///
/// Exact when both sides pass [`validate_quantity_scale`].
pub fn subtract_quantity(remaining: f64, taken: f64) -> f64 {
    let left = to_decimal(remaining) - to_decimal(taken);
    to_quantity(left.max(Decimal::ZERO))
}

/// Sale value of `quantity` units at `price`
pub fn line_value(price: f64, quantity: f64) -> f64 {
    to_f64(to_decimal(price) * to_decimal(quantity))
}

/// Sum amounts without accumulating float error
pub fn sum(amounts: impl IntoIterator<Item = f64>) -> f64 {
    to_f64(amounts.into_iter().map(to_decimal).sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::Unit;

    fn item(price: f64, quantity: f64) -> OrderItemInput {
        OrderItemInput {
            name: "Onions".to_string(),
            category: "vegetables".to_string(),
            quantity,
            unit: Unit::Kg,
            quality: None,
            estimated_price: price,
            is_substitutable: None,
            notes: None,
        }
    }

    #[test]
    fn test_order_total_is_exact() {
        assert_eq!(order_total(&[item(10.0, 3.0), item(5.0, 2.0)]), 40.0);
        assert_eq!(order_total(&[item(25.0, 10.0)]), 250.0);
        // 0.1 * 3 drifts in binary floating point
        assert_eq!(order_total(&[item(0.1, 3.0)]), 0.3);
    }

    #[test]
    fn test_order_total_keeps_sub_paise_prices() {
        assert_eq!(order_total(&[item(0.125, 1.0)]), 0.125);
        assert_eq!(order_total(&[item(0.125, 1.0), item(0.005, 1.0)]), 0.13);
        assert_eq!(order_total(&[item(33.333, 3.0)]), 99.999);
        assert_eq!(order_total(&[item(12.5, 0.25)]), 3.125);
    }

    #[test]
    fn test_quantity_scale() {
        assert!(validate_quantity_scale(10.0, "quantity").is_ok());
        assert!(validate_quantity_scale(2.125, "quantity").is_ok());
        assert!(validate_quantity_scale(0.001, "quantity").is_ok());
        let err = validate_quantity_scale(0.0001, "quantity").unwrap_err();
        assert_eq!(err.kind(), "validation");
        assert!(validate_quantity_scale(9.9999, "quantity").is_err());
    }

    #[test]
    fn test_discount_percentage() {
        assert_eq!(discount_percentage(20.0, Some(25.0)), 20);
        assert_eq!(discount_percentage(20.0, None), 0);
        assert_eq!(discount_percentage(20.0, Some(20.0)), 0);
        assert_eq!(discount_percentage(10.0, Some(30.0)), 67);
        assert_eq!(discount_percentage(5.0, Some(0.0)), 0);
    }

    #[test]
    fn test_subtract_quantity_clamps_and_rounds() {
        assert_eq!(subtract_quantity(10.0, 4.0), 6.0);
        assert_eq!(subtract_quantity(0.3, 0.1), 0.2);
        assert_eq!(subtract_quantity(1.0, 2.0), 0.0);
    }

    #[test]
    fn test_validate_order_item() {
        assert!(validate_order_item(&item(25.0, 10.0)).is_ok());
        assert!(validate_order_item(&item(0.0, 1.0)).is_ok());
        assert!(validate_order_item(&item(25.0, 0.0)).is_err());
        assert!(validate_order_item(&item(25.0, 10_001.0)).is_err());
        assert!(validate_order_item(&item(-1.0, 1.0)).is_err());
        assert!(validate_order_item(&item(f64::NAN, 1.0)).is_err());

        let mut unnamed = item(1.0, 1.0);
        unnamed.name = "  ".to_string();
        let err = validate_order_item(&unnamed).unwrap_err();
        assert_eq!(err.kind(), "validation");
    }
}
