//! Public order lookup.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::instrument;

use crate::db::{OrderRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::models::{Order, OrderItem};
use crate::state::AppState;

/// An order with its line items, as served to receipt and confirmation views.
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Look up an order by its public order number.
///
/// GET /api/orders/{orderNumber}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
) -> Result<Json<OrderDetail>> {
    let repo = OrderRepository::new(state.pool());

    let (order, items) = repo.snapshot(&order_number).await.map_err(|e| match e {
        RepositoryError::NotFound => AppError::NotFound("order".to_string()),
        other => AppError::Database(other),
    })?;

    Ok(Json(OrderDetail { order, items }))
}
