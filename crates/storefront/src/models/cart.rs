//! Session cart.
//!
//! The cart is plain data stored in the tower-sessions record under
//! [`CART_SESSION_KEY`]. It never computes prices itself: every summary goes
//! through [`orchidee_core::pricing::compute_totals`], so the numbers a
//! customer sees in the cart are exactly the numbers checkout will charge.

use serde::{Deserialize, Serialize};

use orchidee_core::pricing::{self, LineItem, PricingConfig, PricingError};
use orchidee_core::{Cents, DeliveryMethod};

/// Session key the cart is stored under.
pub const CART_SESSION_KEY: &str = "cart";

/// A customer's in-progress cart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    /// Items in the order they were first added.
    pub items: Vec<LineItem>,
    /// Chosen fulfilment method. Defaults to pickup until the customer
    /// picks delivery.
    pub delivery_method: DeliveryMethod,
}

/// Priced view of a cart, returned by every cart endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub item_count: u32,
    pub subtotal: Cents,
    pub tax: Cents,
    pub delivery_fee: Cents,
    pub total: Cents,
}

impl CartSummary {
    /// Summary of an empty cart.
    pub const EMPTY: Self = Self {
        item_count: 0,
        subtotal: Cents::ZERO,
        tax: Cents::ZERO,
        delivery_fee: Cents::ZERO,
        total: Cents::ZERO,
    };
}

impl Cart {
    /// Add an item, merging quantities when the product is already present.
    ///
    /// A requested quantity of zero is treated as one; "add to cart" always
    /// adds something.
    pub fn add_item(&mut self, item: LineItem) {
        let quantity = item.quantity.max(1);
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.product_id == item.product_id)
        {
            existing.quantity = existing.quantity.saturating_add(quantity);
        } else {
            self.items.push(LineItem { quantity, ..item });
        }
    }

    /// Set an item's quantity. Zero removes the item. Unknown product IDs
    /// are ignored.
    pub fn update_quantity(&mut self, product_id: &str, quantity: u32) {
        if quantity == 0 {
            self.remove_item(product_id);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            item.quantity = quantity;
        }
    }

    /// Remove an item by product ID.
    pub fn remove_item(&mut self, product_id: &str) {
        self.items.retain(|i| i.product_id != product_id);
    }

    /// Empty the cart, keeping the chosen delivery method.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Switch between pickup and delivery.
    pub fn set_delivery_method(&mut self, method: DeliveryMethod) {
        self.delivery_method = method;
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |count, i| count.saturating_add(i.quantity))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Price the cart. An empty cart summarizes to all zeros rather than an
    /// error, since showing an empty cart page is not a failure.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError`] when a stored item has a zero quantity, a
    /// negative price, or the amounts overflow.
    pub fn summary(&self, config: &PricingConfig) -> Result<CartSummary, PricingError> {
        if self.items.is_empty() {
            return Ok(CartSummary::EMPTY);
        }
        let totals = pricing::compute_totals(&self.items, self.delivery_method, config)?;
        Ok(CartSummary {
            item_count: self.item_count(),
            subtotal: totals.subtotal,
            tax: totals.tax,
            delivery_fee: totals.delivery_fee,
            total: totals.total,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn config() -> PricingConfig {
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
            product_category: Some("traiteur".to_string()),
            unit_price: Cents::new(unit_price),
            quantity,
        }
    }

    #[test]
    fn test_add_merges_same_product() {
        let mut cart = Cart::default();
        cart.add_item(item("tourtiere", 950, 1));
        cart.add_item(item("tourtiere", 950, 1));

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items.first().unwrap().quantity, 2);
    }

    #[test]
    fn test_add_zero_quantity_adds_one() {
        let mut cart = Cart::default();
        cart.add_item(item("tourtiere", 950, 0));

        assert_eq!(cart.items.first().unwrap().quantity, 1);
    }

    #[test]
    fn test_update_quantity_zero_removes() {
        let mut cart = Cart::default();
        cart.add_item(item("tourtiere", 950, 2));
        cart.update_quantity("tourtiere", 0);

        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_unknown_product_is_noop() {
        let mut cart = Cart::default();
        cart.add_item(item("tourtiere", 950, 2));
        cart.update_quantity("gateau", 5);

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items.first().unwrap().quantity, 2);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::default();
        cart.add_item(item("a", 100, 1));
        cart.add_item(item("b", 200, 1));
        cart.remove_item("a");
        assert_eq!(cart.items.len(), 1);

        cart.set_delivery_method(DeliveryMethod::Delivery);
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.delivery_method, DeliveryMethod::Delivery);
    }

    #[test]
    fn test_empty_summary_is_all_zeros() {
        let cart = Cart::default();
        let summary = cart.summary(&config()).unwrap();

        assert_eq!(summary, CartSummary::EMPTY);
    }

    #[test]
    fn test_summary_matches_compute_totals() {
        let mut cart = Cart::default();
        cart.add_item(item("a", 950, 2));
        cart.add_item(item("b", 1200, 1));
        cart.set_delivery_method(DeliveryMethod::Delivery);

        let summary = cart.summary(&config()).unwrap();
        let totals =
            pricing::compute_totals(&cart.items, DeliveryMethod::Delivery, &config()).unwrap();

        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.subtotal, totals.subtotal);
        assert_eq!(summary.tax, totals.tax);
        assert_eq!(summary.delivery_fee, totals.delivery_fee);
        assert_eq!(summary.total, totals.total);
        assert_eq!(summary.total, Cents::new(4714));
    }

    #[test]
    fn test_adding_twice_prices_like_adding_double() {
        let mut one_by_one = Cart::default();
        one_by_one.add_item(item("a", 950, 1));
        one_by_one.add_item(item("a", 950, 1));

        let mut at_once = Cart::default();
        at_once.add_item(item("a", 950, 2));

        assert_eq!(
            one_by_one.summary(&config()).unwrap(),
            at_once.summary(&config()).unwrap()
        );
    }
}
