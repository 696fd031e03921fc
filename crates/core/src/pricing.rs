//! Cart pricing: subtotal, delivery fee, tax and grand total.
//!
//! All money amounts are integer cents ([`Cents`]); the tax rate is the only
//! fractional value and it never leaves this module as a float. Every place
//! that shows a price (cart summary, checkout, receipts) must go through
//! [`compute_totals`] so the numbers can never drift apart.
//!
//! The rules, in order:
//!
//! 1. `subtotal` = Σ `unit_price` × `quantity` over all line items.
//! 2. `delivery_fee` = 0 for pickup, 0 when `subtotal` reaches the free
//!    delivery threshold, otherwise the configured flat fee.
//! 3. `tax` = `tax_rate` × (`subtotal` + `delivery_fee`), rounded half away
//!    from zero to whole cents.
//! 4. `total` = `subtotal` + `tax` + `delivery_fee`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::types::{Cents, DeliveryMethod};

/// A priced cart or order line.
///
/// `unit_price` is a snapshot taken when the item entered the cart; catalog
/// price changes never reprice an existing cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: String,
    pub product_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_category: Option<String>,
    pub unit_price: Cents,
    pub quantity: u32,
}

impl LineItem {
    /// Line subtotal (`unit_price` × `quantity`), `None` on overflow.
    #[must_use]
    pub const fn line_subtotal(&self) -> Option<Cents> {
        self.unit_price.checked_mul(self.quantity)
    }
}

/// Pricing knobs loaded from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingConfig {
    /// Sales tax rate as a decimal fraction, e.g. `0.14975` for Québec
    /// GST + QST.
    pub tax_rate: Decimal,
    /// Flat delivery fee in cents.
    pub delivery_fee: Cents,
    /// Subtotal (in cents) at which delivery becomes free.
    pub free_delivery_threshold: Cents,
}

/// The four figures every cart and order carries.
///
/// Invariant: `total == subtotal + tax + delivery_fee`. [`compute_totals`]
/// is the only constructor, so the invariant holds everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub subtotal: Cents,
    pub tax: Cents,
    pub delivery_fee: Cents,
    pub total: Cents,
}

/// Why a cart could not be priced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    #[error("cannot price an empty cart")]
    EmptyCart,

    #[error("item {product_id} has zero quantity")]
    ZeroQuantity { product_id: String },

    #[error("item {product_id} has a negative unit price")]
    NegativePrice { product_id: String },

    #[error("cart amounts overflow the representable range")]
    Overflow,
}

/// Price a cart.
///
/// Items are checked in order: an empty cart, a zero quantity or a negative
/// unit price is rejected before any arithmetic happens. All arithmetic is
/// checked; amounts that would overflow `i64` cents are reported as
/// [`PricingError::Overflow`].
///
/// # Examples
///
/// ```
/// use orchidee_core::pricing::{compute_totals, LineItem, PricingConfig};
/// use orchidee_core::{Cents, DeliveryMethod};
/// use rust_decimal::Decimal;
///
/// let config = PricingConfig {
///     tax_rate: Decimal::new(14975, 5),
///     delivery_fee: Cents::new(1000),
///     free_delivery_threshold: Cents::new(5000),
/// };
/// let items = vec![
///     LineItem {
///         product_id: "tourtiere".into(),
///         product_name: "Tourtière du Lac".into(),
///         product_category: None,
///         unit_price: Cents::new(950),
///         quantity: 2,
///     },
///     LineItem {
///         product_id: "plateau-fromages".into(),
///         product_name: "Plateau de fromages".into(),
///         product_category: None,
///         unit_price: Cents::new(1200),
///         quantity: 1,
///     },
/// ];
///
/// let totals = compute_totals(&items, DeliveryMethod::Delivery, &config)?;
/// assert_eq!(totals.subtotal, Cents::new(3100));
/// assert_eq!(totals.delivery_fee, Cents::new(1000));
/// assert_eq!(totals.tax, Cents::new(614));
/// assert_eq!(totals.total, Cents::new(4714));
/// # Ok::<(), orchidee_core::pricing::PricingError>(())
/// ```
pub fn compute_totals(
    items: &[LineItem],
    method: DeliveryMethod,
    config: &PricingConfig,
) -> Result<CartTotals, PricingError> {
    if items.is_empty() {
        return Err(PricingError::EmptyCart);
    }

    let mut subtotal = Cents::ZERO;
    for item in items {
        if item.quantity == 0 {
            return Err(PricingError::ZeroQuantity {
                product_id: item.product_id.clone(),
            });
        }
        if item.unit_price.is_negative() {
            return Err(PricingError::NegativePrice {
                product_id: item.product_id.clone(),
            });
        }
        let line = item.line_subtotal().ok_or(PricingError::Overflow)?;
        subtotal = subtotal.checked_add(line).ok_or(PricingError::Overflow)?;
    }

    let delivery_fee = delivery_fee_for(subtotal, method, config);
    let taxable = subtotal
        .checked_add(delivery_fee)
        .ok_or(PricingError::Overflow)?;
    let tax = round_tax(config.tax_rate, taxable)?;
    let total = subtotal
        .checked_add(tax)
        .and_then(|t| t.checked_add(delivery_fee))
        .ok_or(PricingError::Overflow)?;

    Ok(CartTotals {
        subtotal,
        tax,
        delivery_fee,
        total,
    })
}

/// Delivery fee rule: pickup and big enough orders ride free.
fn delivery_fee_for(subtotal: Cents, method: DeliveryMethod, config: &PricingConfig) -> Cents {
    if method == DeliveryMethod::Pickup || subtotal >= config.free_delivery_threshold {
        Cents::ZERO
    } else {
        config.delivery_fee
    }
}

/// Tax on `taxable` cents, rounded half away from zero to whole cents.
fn round_tax(rate: Decimal, taxable: Cents) -> Result<Cents, PricingError> {
    let raw = rate
        .checked_mul(Decimal::from(taxable.as_i64()))
        .ok_or(PricingError::Overflow)?;
    raw.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .map(Cents::new)
        .ok_or(PricingError::Overflow)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn quebec_config() -> PricingConfig {
        PricingConfig {
            tax_rate: Decimal::new(14975, 5),
            delivery_fee: Cents::new(1000),
            free_delivery_threshold: Cents::new(5000),
        }
    }

    fn item(id: &str, unit_price: i64, quantity: u32) -> LineItem {
        LineItem {
            product_id: id.to_string(),
            product_name: format!("Item {id}"),
            product_category: None,
            unit_price: Cents::new(unit_price),
            quantity,
        }
    }

    #[test]
    fn test_delivery_below_threshold() {
        let items = vec![item("a", 950, 2), item("b", 1200, 1)];
        let totals =
            compute_totals(&items, DeliveryMethod::Delivery, &quebec_config()).unwrap();

        assert_eq!(totals.subtotal, Cents::new(3100));
        assert_eq!(totals.delivery_fee, Cents::new(1000));
        assert_eq!(totals.tax, Cents::new(614));
        assert_eq!(totals.total, Cents::new(4714));
    }

    #[test]
    fn test_delivery_at_threshold_is_free() {
        let items = vec![item("a", 2600, 2)];
        let totals =
            compute_totals(&items, DeliveryMethod::Delivery, &quebec_config()).unwrap();

        assert_eq!(totals.subtotal, Cents::new(5200));
        assert_eq!(totals.delivery_fee, Cents::ZERO);
        assert_eq!(totals.tax, Cents::new(779));
        assert_eq!(totals.total, Cents::new(5979));
    }

    #[test]
    fn test_threshold_boundary() {
        let config = quebec_config();

        let exactly = compute_totals(&[item("a", 5000, 1)], DeliveryMethod::Delivery, &config)
            .unwrap();
        assert_eq!(exactly.delivery_fee, Cents::ZERO);

        let just_under =
            compute_totals(&[item("a", 4999, 1)], DeliveryMethod::Delivery, &config).unwrap();
        assert_eq!(just_under.delivery_fee, Cents::new(1000));
    }

    #[test]
    fn test_pickup_never_charges_delivery() {
        let totals = compute_totals(
            &[item("a", 950, 2)],
            DeliveryMethod::Pickup,
            &quebec_config(),
        )
        .unwrap();

        assert_eq!(totals.delivery_fee, Cents::ZERO);
        assert_eq!(totals.tax, Cents::new(285));
        assert_eq!(totals.total, Cents::new(2185));
    }

    #[test]
    fn test_tax_rounds_midpoint_away_from_zero() {
        // 930 × 0.05 = 46.5, which must round to 47, not 46.
        let config = PricingConfig {
            tax_rate: Decimal::new(5, 2),
            delivery_fee: Cents::ZERO,
            free_delivery_threshold: Cents::new(1),
        };
        let totals =
            compute_totals(&[item("a", 930, 1)], DeliveryMethod::Pickup, &config).unwrap();

        assert_eq!(totals.tax, Cents::new(47));
    }

    #[test]
    fn test_fee_is_taxed() {
        // Tax base includes the delivery fee: 0.10 × (1000 + 500) = 150.
        let config = PricingConfig {
            tax_rate: Decimal::new(10, 2),
            delivery_fee: Cents::new(500),
            free_delivery_threshold: Cents::new(100_000),
        };
        let totals =
            compute_totals(&[item("a", 1000, 1)], DeliveryMethod::Delivery, &config).unwrap();

        assert_eq!(totals.tax, Cents::new(150));
        assert_eq!(totals.total, Cents::new(1650));
    }

    #[test]
    fn test_zero_rate() {
        let config = PricingConfig {
            tax_rate: Decimal::ZERO,
            delivery_fee: Cents::new(1000),
            free_delivery_threshold: Cents::new(5000),
        };
        let totals =
            compute_totals(&[item("a", 700, 3)], DeliveryMethod::Delivery, &config).unwrap();

        assert_eq!(totals.tax, Cents::ZERO);
        assert_eq!(totals.total, Cents::new(3100));
    }

    #[test]
    fn test_empty_cart_rejected() {
        let err = compute_totals(&[], DeliveryMethod::Pickup, &quebec_config()).unwrap_err();
        assert_eq!(err, PricingError::EmptyCart);
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let err = compute_totals(
            &[item("gateau", 1500, 0)],
            DeliveryMethod::Pickup,
            &quebec_config(),
        )
        .unwrap_err();

        assert_eq!(
            err,
            PricingError::ZeroQuantity {
                product_id: "gateau".to_string()
            }
        );
    }

    #[test]
    fn test_negative_price_rejected() {
        let err = compute_totals(
            &[item("rabais", -200, 1)],
            DeliveryMethod::Pickup,
            &quebec_config(),
        )
        .unwrap_err();

        assert_eq!(
            err,
            PricingError::NegativePrice {
                product_id: "rabais".to_string()
            }
        );
    }

    #[test]
    fn test_overflow_reported() {
        let err = compute_totals(
            &[item("a", i64::MAX, 2)],
            DeliveryMethod::Pickup,
            &quebec_config(),
        )
        .unwrap_err();

        assert_eq!(err, PricingError::Overflow);
    }

    #[test]
    fn test_totals_invariant_holds() {
        let carts = [
            vec![item("a", 950, 2), item("b", 1200, 1)],
            vec![item("a", 2600, 2)],
            vec![item("a", 1, 1)],
            vec![item("a", 333, 3), item("b", 101, 7)],
        ];
        for items in carts {
            for method in [DeliveryMethod::Pickup, DeliveryMethod::Delivery] {
                let t = compute_totals(&items, method, &quebec_config()).unwrap();
                assert_eq!(t.total, t.subtotal + t.tax + t.delivery_fee);
            }
        }
    }
}
