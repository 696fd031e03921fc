//! Reservation route handlers.

use axum::{Json, extract::State};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::instrument;

use orchidee_core::ReservationId;

use crate::db::ReservationRepository;
use crate::error::Result;
use crate::services::BookingService;
use crate::services::booking::ReservationRequest;
use crate::state::AppState;

/// Response for a successful booking.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    pub success: bool,
    pub reservation_id: ReservationId,
}

/// Book an event reservation.
///
/// POST /api/reservations
#[instrument(skip(state, body), fields(event_date = %body.event.event_date))]
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<ReservationRequest>,
) -> Result<Json<BookingConfirmation>> {
    let service = BookingService::new(state.pool(), state.notifier());
    let reservation = service.book(body).await?;

    Ok(Json(BookingConfirmation {
        success: true,
        reservation_id: reservation.id,
    }))
}

/// List dates that are already held by a pending or confirmed reservation.
///
/// GET /api/reservations/dates
///
/// Returned as `["YYYY-MM-DD", ...]` for the booking calendar to grey out.
#[instrument(skip(state))]
pub async fn held_dates(State(state): State<AppState>) -> Result<Json<Vec<NaiveDate>>> {
    let repo = ReservationRepository::new(state.pool());
    let dates = repo.held_dates().await?;

    Ok(Json(dates))
}
