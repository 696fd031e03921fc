//! Staff route handlers.
//!
//! All handlers require the staff bearer token via [`RequireStaffAuth`].
//! Status updates go through the repository's transition checks, so an
//! out-of-order request (say `pending` straight to `ready`) is rejected
//! with 422 instead of silently corrupting the kitchen's queue.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use orchidee_core::{OrderId, OrderStatus, ReservationId, ReservationStatus};

use crate::db::{OrderRepository, RepositoryError, ReservationRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireStaffAuth;
use crate::models::{Order, Reservation};
use crate::routes::orders::OrderDetail;
use crate::state::AppState;

/// Default number of rows returned by the list endpoints.
const DEFAULT_LIST_LIMIT: i64 = 50;

/// Upper bound on the list endpoints.
const MAX_LIST_LIMIT: i64 = 200;

/// Query parameters for the list endpoints.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

impl ListQuery {
    fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT)
    }
}

/// Status update request body.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

/// List recent orders.
///
/// GET /admin/orders
#[instrument(skip(state, _auth))]
pub async fn list_orders(
    _auth: RequireStaffAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Order>>> {
    let repo = OrderRepository::new(state.pool());
    let orders = repo.list_recent(query.limit()).await?;

    Ok(Json(orders))
}

/// Get one order with its items.
///
/// GET /admin/orders/{id}
#[instrument(skip(state, _auth))]
pub async fn get_order(
    _auth: RequireStaffAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderDetail>> {
    let repo = OrderRepository::new(state.pool());

    let order = repo.get(id).await.map_err(|e| match e {
        RepositoryError::NotFound => AppError::NotFound("order".to_string()),
        other => AppError::Database(other),
    })?;
    let items = repo.items(order.id).await?;

    Ok(Json(OrderDetail { order, items }))
}

/// Advance an order through its status machine.
///
/// POST /admin/orders/{id}/status
#[instrument(skip(state, _auth), fields(status = %body.status))]
pub async fn update_order_status(
    _auth: RequireStaffAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<Order>> {
    let next: OrderStatus = body.status.parse().map_err(|message| AppError::Validation {
        field: "status",
        message,
    })?;

    let repo = OrderRepository::new(state.pool());
    let order = repo.update_status(id, next).await?;

    Ok(Json(order))
}

/// List recent reservations.
///
/// GET /admin/reservations
#[instrument(skip(state, _auth))]
pub async fn list_reservations(
    _auth: RequireStaffAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Reservation>>> {
    let repo = ReservationRepository::new(state.pool());
    let reservations = repo.list_recent(query.limit()).await?;

    Ok(Json(reservations))
}

/// Advance a reservation through its status machine.
///
/// POST /admin/reservations/{id}/status
#[instrument(skip(state, _auth), fields(status = %body.status))]
pub async fn update_reservation_status(
    _auth: RequireStaffAuth,
    State(state): State<AppState>,
    Path(id): Path<ReservationId>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<Reservation>> {
    let next: ReservationStatus =
        body.status.parse().map_err(|message| AppError::Validation {
            field: "status",
            message,
        })?;

    let repo = ReservationRepository::new(state.pool());
    let reservation = repo.update_status(id, next).await?;

    Ok(Json(reservation))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_limit_defaults_and_clamps() {
        assert_eq!(ListQuery { limit: None }.limit(), 50);
        assert_eq!(ListQuery { limit: Some(10) }.limit(), 10);
        assert_eq!(ListQuery { limit: Some(0) }.limit(), 1);
        assert_eq!(ListQuery { limit: Some(9999) }.limit(), 200);
    }
}
