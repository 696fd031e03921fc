//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (pings the database)
//!
//! # Cart (session-backed)
//! GET  /cart                        - Cart contents with computed totals
//! POST /cart/add                    - Add an item (merges by product id)
//! POST /cart/update                 - Set an item quantity (0 removes)
//! POST /cart/remove                 - Remove an item
//! POST /cart/clear                  - Empty the cart
//! POST /cart/delivery-method        - Switch between pickup and delivery
//!
//! # Public API
//! POST /api/checkout                - Create order + Stripe Checkout session
//! POST /api/reservations            - Book an event reservation
//! GET  /api/reservations/dates      - Dates already held (pending/confirmed)
//! GET  /api/orders/{orderNumber}    - Order + items snapshot (receipts)
//!
//! # Staff (Bearer token)
//! GET  /admin/orders                - Recent orders
//! GET  /admin/orders/{id}           - Order detail with items
//! POST /admin/orders/{id}/status    - Advance the order status machine
//! GET  /admin/reservations          - Recent reservations
//! POST /admin/reservations/{id}/status - Advance the reservation status machine
//! ```

pub mod admin;
pub mod cart;
pub mod checkout;
pub mod orders;
pub mod reservations;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/delivery-method", post(cart::set_delivery_method))
}

/// Create the public API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(checkout::create))
        .route("/reservations", post(reservations::create))
        .route("/reservations/dates", get(reservations::held_dates))
        .route("/orders/{order_number}", get(orders::show))
}

/// Create the staff routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(admin::list_orders))
        .route("/orders/{id}", get(admin::get_order))
        .route("/orders/{id}/status", post(admin::update_order_status))
        .route("/reservations", get(admin::list_reservations))
        .route(
            "/reservations/{id}/status",
            post(admin::update_reservation_status),
        )
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/cart", cart_routes())
        .nest("/api", api_routes())
        .nest("/admin", admin_routes())
}
