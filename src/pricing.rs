//! Cart Pricing

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::iso;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Currencies are priced in hundredths of a major unit.
const MINOR_UNIT_EXPONENT: u32 = 2;

/// Errors raised while pricing a cart.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// The cart contained no line items.
    #[error("cart is empty")]
    EmptyCart,

    /// A line item carried a zero or negative unit price.
    #[error("product {product_id} has a non-positive price")]
    NonPositivePrice {
        /// Offending product identifier.
        product_id: String,
    },

    /// A line item requested zero units.
    #[error("product {product_id} has a non-positive quantity")]
    NonPositiveQuantity {
        /// Offending product identifier.
        product_id: String,
    },

    /// The currency does not use two-digit minor units.
    #[error("currency {0} is not priced in hundredths")]
    UnsupportedCurrency(&'static str),

    /// A unit price or line total does not fit in minor units.
    #[error("amount for product {product_id} overflows minor units")]
    AmountOverflow {
        /// Offending product identifier.
        product_id: String,
    },
}

/// A line item as submitted by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Catalog product identifier.
    pub product_id: String,

    /// Display name shown on the hosted checkout page.
    pub name: String,

    /// Unit price in major units, e.g. dollars.
    pub price: Decimal,

    /// Product image reference.
    #[serde(default)]
    pub image: Option<String>,

    /// Requested quantity.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

/// A line item with its unit price converted to minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLineItem {
    /// Catalog product identifier.
    pub product_id: String,

    /// Display name.
    pub name: String,

    /// Product image reference.
    pub image: Option<String>,

    /// Unit price in minor units, rounded half up.
    pub unit_amount: u64,

    /// Requested quantity.
    pub quantity: u32,

    /// `unit_amount * quantity`.
    pub line_total: u64,
}

/// A fully priced cart.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedCart {
    /// Priced line items in cart order.
    pub items: Vec<PricedLineItem>,

    /// Sum of the line totals in minor units.
    pub total: u64,

    /// Currency every amount is expressed in.
    pub currency: &'static iso::Currency,
}

/// Prices a cart.
///
/// Each unit price is rounded to the nearest minor unit (half up) before it
/// is multiplied by its quantity, so totals do not depend on item order.
///
/// # Errors
///
/// - [`PricingError::EmptyCart`]: the cart has no items.
/// - [`PricingError::NonPositivePrice`]: a price is zero or negative, or rounds to zero.
/// - [`PricingError::NonPositiveQuantity`]: a quantity is zero.
/// - [`PricingError::UnsupportedCurrency`]: the currency is not priced in hundredths.
/// - [`PricingError::AmountOverflow`]: an amount does not fit in `u64` minor units.
pub fn price_cart(
    cart: &[CartLineItem],
    currency: &'static iso::Currency,
) -> Result<PricedCart, PricingError> {
    if cart.is_empty() {
        return Err(PricingError::EmptyCart);
    }

    if currency.exponent != MINOR_UNIT_EXPONENT {
        return Err(PricingError::UnsupportedCurrency(currency.iso_alpha_code));
    }

    let items = cart
        .iter()
        .map(price_line_item)
        .collect::<Result<Vec<_>, _>>()?;

    let total = items.iter().try_fold(0_u64, |acc, item| {
        acc.checked_add(item.line_total)
            .ok_or_else(|| PricingError::AmountOverflow {
                product_id: item.product_id.clone(),
            })
    })?;

    Ok(PricedCart {
        items,
        total,
        currency,
    })
}

/// Converts a major-unit price to minor units, rounding half up.
///
/// Returns `None` when the amount is negative or does not fit in `u64`.
pub fn to_minor_units(price: Decimal) -> Option<u64> {
    price
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
}

fn price_line_item(item: &CartLineItem) -> Result<PricedLineItem, PricingError> {
    if item.quantity == 0 {
        return Err(PricingError::NonPositiveQuantity {
            product_id: item.product_id.clone(),
        });
    }

    if item.price <= Decimal::ZERO {
        return Err(PricingError::NonPositivePrice {
            product_id: item.product_id.clone(),
        });
    }

    let unit_amount = to_minor_units(item.price).ok_or_else(|| PricingError::AmountOverflow {
        product_id: item.product_id.clone(),
    })?;

    // Sub-cent prices round down to nothing.
    if unit_amount == 0 {
        return Err(PricingError::NonPositivePrice {
            product_id: item.product_id.clone(),
        });
    }

    let line_total = unit_amount
        .checked_mul(u64::from(item.quantity))
        .ok_or_else(|| PricingError::AmountOverflow {
            product_id: item.product_id.clone(),
        })?;

    Ok(PricedLineItem {
        product_id: item.product_id.clone(),
        name: item.name.clone(),
        image: item.image.clone(),
        unit_amount,
        quantity: item.quantity,
        line_total,
    })
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use testresult::TestResult;

    use super::*;

    fn line(product_id: &str, price: &str, quantity: u32) -> Result<CartLineItem, rust_decimal::Error> {
        Ok(CartLineItem {
            product_id: product_id.to_string(),
            name: format!("Product {product_id}"),
            price: Decimal::from_str(price)?,
            image: None,
            quantity,
        })
    }

    #[test]
    fn test_price_cart_rounds_each_item_half_up() -> TestResult {
        let cart = [line("a", "10.00", 2)?, line("b", "5.005", 1)?];

        let priced = price_cart(&cart, iso::USD)?;

        let line_totals: Vec<u64> = priced.items.iter().map(|item| item.line_total).collect();

        assert_eq!(line_totals, vec![2000, 501]);
        assert_eq!(priced.total, 2501);
        assert_eq!(priced.currency, iso::USD);

        Ok(())
    }

    #[test]
    fn test_price_cart_rounds_before_multiplying_by_quantity() -> TestResult {
        // 0.005 rounds to 1 cent per unit; rounding the 1.5 cent aggregate would give 2.
        let priced = price_cart(&[line("a", "0.005", 3)?], iso::USD)?;

        assert_eq!(priced.items.first().map(|item| item.unit_amount), Some(1));
        assert_eq!(priced.total, 3);

        Ok(())
    }

    #[test]
    fn test_price_cart_total_is_order_independent() -> TestResult {
        let forward = [line("a", "1.115", 3)?, line("b", "2.225", 7)?, line("c", "0.50", 1)?];
        let mut reversed = forward.clone();
        reversed.reverse();

        assert_eq!(
            price_cart(&forward, iso::USD)?.total,
            price_cart(&reversed, iso::USD)?.total
        );

        Ok(())
    }

    #[test]
    fn test_price_cart_empty() {
        assert_eq!(price_cart(&[], iso::USD), Err(PricingError::EmptyCart));
    }

    #[test]
    fn test_price_cart_rejects_zero_quantity() -> TestResult {
        let result = price_cart(&[line("a", "1.00", 0)?], iso::USD);

        assert_eq!(
            result,
            Err(PricingError::NonPositiveQuantity {
                product_id: "a".to_string()
            })
        );

        Ok(())
    }

    #[test]
    fn test_price_cart_rejects_non_positive_prices() -> TestResult {
        for price in ["0", "-1.00", "0.004"] {
            let result = price_cart(&[line("a", "1.00", 1)?, line("b", price, 1)?], iso::USD);

            assert_eq!(
                result,
                Err(PricingError::NonPositivePrice {
                    product_id: "b".to_string()
                }),
                "price {price} should be rejected"
            );
        }

        Ok(())
    }

    #[test]
    fn test_price_cart_rejects_currencies_without_cents() -> TestResult {
        let result = price_cart(&[line("a", "100", 1)?], iso::JPY);

        assert_eq!(result, Err(PricingError::UnsupportedCurrency("JPY")));

        Ok(())
    }

    #[test]
    fn test_price_cart_detects_overflow() -> TestResult {
        let result = price_cart(&[line("a", "184467440737095516.15", 2)?], iso::USD);

        assert!(
            matches!(result, Err(PricingError::AmountOverflow { .. })),
            "expected overflow, got {result:?}"
        );

        Ok(())
    }

    #[test]
    fn test_quantity_defaults_to_one() -> TestResult {
        let item: CartLineItem =
            serde_json::from_str(r#"{"product_id":"a","name":"A","price":"4.20"}"#)?;

        assert_eq!(item.quantity, 1);
        assert_eq!(item.image, None);

        Ok(())
    }

    #[test]
    fn test_to_minor_units() -> TestResult {
        assert_eq!(to_minor_units(Decimal::from_str("0.125")?), Some(13));
        assert_eq!(to_minor_units(Decimal::from_str("19.99")?), Some(1999));
        assert_eq!(to_minor_units(Decimal::from_str("-0.01")?), None);

        Ok(())
    }
}
