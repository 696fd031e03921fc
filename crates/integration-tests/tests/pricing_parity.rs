//! The cart and the checkout service must price identical inputs
//! identically; both go through `orchidee_core::pricing::compute_totals`
//! and these tests pin that the two call sites cannot drift apart.

#![allow(clippy::unwrap_used)]

use orchidee_core::pricing::{self, CartTotals};
use orchidee_core::{Cents, DeliveryMethod};
use orchidee_integration_tests::{line_item, quebec_pricing};
use orchidee_storefront::models::Cart;

#[test]
fn cart_summary_matches_calculator_for_both_methods() {
    let carts = [
        vec![line_item("tourtiere", 950, 2), line_item("fromages", 1200, 1)],
        vec![line_item("buffet", 2600, 2)],
        vec![line_item("bouchee", 1, 1)],
        vec![line_item("a", 333, 3), line_item("b", 101, 7)],
    ];
    let config = quebec_pricing();

    for items in carts {
        for method in [DeliveryMethod::Pickup, DeliveryMethod::Delivery] {
            let mut cart = Cart::default();
            for item in &items {
                cart.add_item(item.clone());
            }
            cart.set_delivery_method(method);

            let summary = cart.summary(&config).unwrap();
            let totals = pricing::compute_totals(&items, method, &config).unwrap();

            assert_eq!(summary.subtotal, totals.subtotal);
            assert_eq!(summary.tax, totals.tax);
            assert_eq!(summary.delivery_fee, totals.delivery_fee);
            assert_eq!(summary.total, totals.total);
            assert_eq!(totals.total, totals.subtotal + totals.tax + totals.delivery_fee);
        }
    }
}

#[test]
fn reference_cart_below_threshold() {
    let items = vec![line_item("tourtiere", 950, 2), line_item("fromages", 1200, 1)];
    let totals =
        pricing::compute_totals(&items, DeliveryMethod::Delivery, &quebec_pricing()).unwrap();

    assert_eq!(
        totals,
        CartTotals {
            subtotal: Cents::new(3100),
            tax: Cents::new(614),
            delivery_fee: Cents::new(1000),
            total: Cents::new(4714),
        }
    );
}

#[test]
fn reference_cart_at_threshold_rides_free() {
    let items = vec![line_item("buffet", 2600, 2)];
    let totals =
        pricing::compute_totals(&items, DeliveryMethod::Delivery, &quebec_pricing()).unwrap();

    assert_eq!(
        totals,
        CartTotals {
            subtotal: Cents::new(5200),
            tax: Cents::new(779),
            delivery_fee: Cents::ZERO,
            total: Cents::new(5979),
        }
    );
}

#[test]
fn incremental_adds_price_like_a_single_add() {
    let config = quebec_pricing();

    let mut one_by_one = Cart::default();
    one_by_one.add_item(line_item("tourtiere", 950, 1));
    one_by_one.add_item(line_item("tourtiere", 950, 1));

    let mut at_once = Cart::default();
    at_once.add_item(line_item("tourtiere", 950, 2));

    assert_eq!(one_by_one.items.len(), 1);
    assert_eq!(
        one_by_one.summary(&config).unwrap(),
        at_once.summary(&config).unwrap()
    );
}

#[test]
fn checkout_validation_preserves_cart_pricing() {
    use orchidee_storefront::services::checkout::{
        CheckoutItem, CheckoutRequest, DeliveryInfo, validate,
    };
    use orchidee_storefront::services::CustomerInfo;

    // The same lines, once through the session cart and once through the
    // checkout request path.
    let mut cart = Cart::default();
    cart.add_item(line_item("tourtiere", 950, 2));
    cart.add_item(line_item("fromages", 1200, 1));
    cart.set_delivery_method(DeliveryMethod::Delivery);

    let request = CheckoutRequest {
        customer: CustomerInfo {
            name: "Jean Bouchard".to_owned(),
            email: "jean@example.com".to_owned(),
            phone: "418-555-0142".to_owned(),
        },
        delivery: DeliveryInfo {
            method: "delivery".to_owned(),
            date: "2026-09-05".to_owned(),
            time: "11:30".to_owned(),
            address: Some("12 rue du Quai, Québec".to_owned()),
            instructions: None,
        },
        items: vec![
            CheckoutItem {
                product_id: "tourtiere".to_owned(),
                product_name: "Item tourtiere".to_owned(),
                product_category: None,
                unit_price: 950,
                quantity: 2,
            },
            CheckoutItem {
                product_id: "fromages".to_owned(),
                product_name: "Item fromages".to_owned(),
                product_category: None,
                unit_price: 1200,
                quantity: 1,
            },
        ],
        notes: None,
        language: "fr".to_owned(),
    };

    let config = quebec_pricing();
    let validated = validate(request).unwrap();
    let checkout_totals =
        pricing::compute_totals(&validated.items, validated.delivery_method, &config).unwrap();
    let cart_summary = cart.summary(&config).unwrap();

    assert_eq!(cart_summary.subtotal, checkout_totals.subtotal);
    assert_eq!(cart_summary.tax, checkout_totals.tax);
    assert_eq!(cart_summary.delivery_fee, checkout_totals.delivery_fee);
    assert_eq!(cart_summary.total, checkout_totals.total);
}
