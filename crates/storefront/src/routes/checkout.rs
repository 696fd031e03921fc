//! Checkout route handler.

use axum::{Json, extract::State};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::models::CART_SESSION_KEY;
use crate::services::CheckoutService;
use crate::services::checkout::{CheckoutConfirmation, CheckoutRequest};
use crate::state::AppState;

/// Create an order and its Stripe Checkout session.
///
/// POST /api/checkout
///
/// The request carries the full item list rather than reading the session
/// cart, so headless clients can check out directly. On success the session
/// cart is cleared; the customer is past the point of editing it.
#[instrument(skip(state, session, body), fields(customer_email = %body.customer.email))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<CheckoutRequest>,
) -> Result<Json<CheckoutConfirmation>> {
    let service = CheckoutService::new(state.pool(), state.stripe(), state.config());
    let confirmation = service.checkout(body).await?;

    // Cart cleanup is best-effort; the order already exists.
    if let Err(e) = session.remove::<serde_json::Value>(CART_SESSION_KEY).await {
        tracing::debug!(error = %e, "failed to clear cart after checkout");
    }

    Ok(Json(confirmation))
}
