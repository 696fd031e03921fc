//! Cart route handlers.
//!
//! The cart lives in the server session. Every mutation returns the full
//! cart with a freshly computed [`CartSummary`], so the client never does
//! its own price math.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use orchidee_core::pricing::LineItem;
use orchidee_core::{Cents, DeliveryMethod};

use crate::error::{AppError, Result};
use crate::models::{CART_SESSION_KEY, Cart, CartSummary};
use crate::state::AppState;

/// Cart contents plus the priced summary, returned by every cart endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<LineItem>,
    pub delivery_method: DeliveryMethod,
    pub summary: CartSummary,
}

/// Add to cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemBody {
    pub product_id: String,
    pub product_name: String,
    #[serde(default)]
    pub product_category: Option<String>,
    /// Unit price in cents.
    pub unit_price: i64,
    /// Defaults to 1 when omitted.
    #[serde(default)]
    pub quantity: Option<u32>,
}

/// Update quantity request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemBody {
    pub product_id: String,
    pub quantity: u32,
}

/// Remove item request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveItemBody {
    pub product_id: String,
}

/// Delivery method request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryMethodBody {
    pub method: String,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Load the cart from the session. Missing or malformed state loads as an
/// empty cart rather than an error.
async fn load_cart(session: &Session) -> Cart {
    session
        .get::<Cart>(CART_SESSION_KEY)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Persist the cart back to the session.
async fn save_cart(session: &Session, cart: &Cart) -> Result<()> {
    session
        .insert(CART_SESSION_KEY, cart)
        .await
        .map_err(|e| AppError::Internal(format!("failed to persist cart: {e}")))
}

/// Price the cart and build the response view.
fn cart_view(cart: Cart, state: &AppState) -> Result<Json<CartView>> {
    let summary = cart
        .summary(&state.config().pricing)
        .map_err(|e| AppError::Validation {
            field: "items",
            message: e.to_string(),
        })?;

    Ok(Json(CartView {
        items: cart.items,
        delivery_method: cart.delivery_method,
        summary,
    }))
}

// =============================================================================
// Handlers
// =============================================================================

/// Show the cart.
///
/// GET /cart
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let cart = load_cart(&session).await;
    cart_view(cart, &state)
}

/// Add an item to the cart.
///
/// POST /cart/add
#[instrument(skip(state, session, body), fields(product_id = %body.product_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<AddItemBody>,
) -> Result<Json<CartView>> {
    let product_id = body.product_id.trim().to_string();
    if product_id.is_empty() {
        return Err(AppError::Validation {
            field: "productId",
            message: "every item needs a product id".to_owned(),
        });
    }
    let product_name = body.product_name.trim().to_string();
    if product_name.is_empty() {
        return Err(AppError::Validation {
            field: "productName",
            message: format!("item {product_id} needs a product name"),
        });
    }
    if body.unit_price < 0 {
        return Err(AppError::Validation {
            field: "unitPrice",
            message: format!("unit price for {product_id} cannot be negative"),
        });
    }

    let mut cart = load_cart(&session).await;
    cart.add_item(LineItem {
        product_id,
        product_name,
        product_category: body.product_category,
        unit_price: Cents::new(body.unit_price),
        quantity: body.quantity.unwrap_or(1),
    });
    save_cart(&session, &cart).await?;

    cart_view(cart, &state)
}

/// Set an item's quantity. Zero removes the line.
///
/// POST /cart/update
#[instrument(skip(state, session, body), fields(product_id = %body.product_id))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<UpdateItemBody>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await;
    cart.update_quantity(&body.product_id, body.quantity);
    save_cart(&session, &cart).await?;

    cart_view(cart, &state)
}

/// Remove an item from the cart.
///
/// POST /cart/remove
#[instrument(skip(state, session, body), fields(product_id = %body.product_id))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<RemoveItemBody>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await;
    cart.remove_item(&body.product_id);
    save_cart(&session, &cart).await?;

    cart_view(cart, &state)
}

/// Empty the cart.
///
/// POST /cart/clear
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await;
    cart.clear();
    save_cart(&session, &cart).await?;

    cart_view(cart, &state)
}

/// Switch between pickup and delivery.
///
/// POST /cart/delivery-method
#[instrument(skip(state, session, body), fields(method = %body.method))]
pub async fn set_delivery_method(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<DeliveryMethodBody>,
) -> Result<Json<CartView>> {
    let method: DeliveryMethod = body.method.parse().map_err(|message| AppError::Validation {
        field: "method",
        message,
    })?;

    let mut cart = load_cart(&session).await;
    cart.set_delivery_method(method);
    save_cart(&session, &cart).await?;

    cart_view(cart, &state)
}
