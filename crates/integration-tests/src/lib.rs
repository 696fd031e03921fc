//! Cross-crate tests for Orchidée Traiteur.
//!
//! These tests exercise the surfaces where the crates meet: the cart and
//! the checkout service pricing through the same calculator, the wire
//! formats the storefront serves, and the error mapping from services to
//! HTTP. They need no database or network; database-backed behavior is
//! covered per-repository against a live `PostgreSQL` outside CI.
//!
//! # Running
//!
//! ```bash
//! cargo test -p orchidee-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use rust_decimal::Decimal;

use orchidee_core::Cents;
use orchidee_core::pricing::{LineItem, PricingConfig};

/// The production pricing defaults: Québec GST + QST, $10 delivery, free
/// delivery from $50.
#[must_use]
pub fn quebec_pricing() -> PricingConfig {
    PricingConfig {
        tax_rate: Decimal::new(14975, 5),
        delivery_fee: Cents::new(1000),
        free_delivery_threshold: Cents::new(5000),
    }
}

/// Shorthand line item for tests.
#[must_use]
pub fn line_item(id: &str, unit_price: i64, quantity: u32) -> LineItem {
    LineItem {
        product_id: id.to_owned(),
        product_name: format!("Item {id}"),
        product_category: None,
        unit_price: Cents::new(unit_price),
        quantity,
    }
}
