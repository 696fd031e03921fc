//! Reservation domain types.
//!
//! A reservation books the kitchen for a full-service catered event. The
//! business runs one event per day, so pending and confirmed reservations
//! hold their calendar date exclusively.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use orchidee_core::{Email, EventType, ReservationId, ReservationStatus};

/// An event reservation as stored in `catering.reservations`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    /// Unique reservation ID.
    pub id: ReservationId,
    /// Customer's full name.
    pub customer_name: String,
    /// Customer's email address.
    pub customer_email: Email,
    /// Customer's phone number.
    pub customer_phone: String,
    /// Kind of event.
    pub event_type: EventType,
    /// Date of the event. One pending or confirmed reservation per date.
    pub event_date: NaiveDate,
    /// Start time, free-form (e.g. "18:00").
    pub event_time: String,
    /// Expected number of guests.
    pub guest_count: i32,
    /// Venue name or address, if the customer knows it yet.
    pub venue: Option<String>,
    /// Anything unusual the kitchen should plan for.
    pub special_requirements: Option<String>,
    /// Allergies and dietary restrictions.
    pub dietary_restrictions: Option<String>,
    /// Customer's budget, free-form text (e.g. "2000-3000 $").
    pub estimated_budget: Option<String>,
    /// Lifecycle status.
    pub status: ReservationStatus,
    /// When the reservation was created.
    pub created_at: DateTime<Utc>,
    /// When the reservation was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to insert a new pending reservation.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub customer_name: String,
    pub customer_email: Email,
    pub customer_phone: String,
    pub event_type: EventType,
    pub event_date: NaiveDate,
    pub event_time: String,
    pub guest_count: i32,
    pub venue: Option<String>,
    pub special_requirements: Option<String>,
    pub dietary_restrictions: Option<String>,
    pub estimated_budget: Option<String>,
}
