//! Reservation booking service.
//!
//! Validates a reservation request, checks date availability, persists the
//! pending reservation and notifies staff. The notification is best effort;
//! the date guarantee comes from the database, not from the pre-check here.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, warn};

use orchidee_core::{Email, EventType};

use super::notify::Notifier;
use super::{CustomerInfo, normalize_optional};
use crate::db::reservations::ReservationRepository;
use crate::db::RepositoryError;
use crate::models::reservation::{NewReservation, Reservation};

/// Largest guest count the kitchen will even discuss.
const MAX_GUEST_COUNT: i64 = 2000;

/// A reservation request as posted by the storefront.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    pub customer: CustomerInfo,
    pub event: EventInfo,
}

/// Event details of a reservation request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInfo {
    pub event_type: String,
    pub event_date: String,
    pub event_time: String,
    pub guest_count: i64,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub special_requirements: Option<String>,
    #[serde(default)]
    pub dietary_restrictions: Option<String>,
    #[serde(default)]
    pub estimated_budget: Option<String>,
}

/// Errors that can occur while booking a reservation.
#[derive(Debug, Error)]
pub enum BookingError {
    /// Request failed validation. `field` names the offending input in
    /// wire (camelCase) form.
    #[error("validation failed on {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// Database failure, including date conflicts.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Validate a reservation request into an insertable draft.
///
/// Checks run in a fixed order and the first failure wins: customer name,
/// email, phone, then event type, date, time and guest count.
///
/// # Errors
///
/// Returns [`BookingError::Validation`] naming the first invalid field.
pub fn validate(request: ReservationRequest) -> Result<NewReservation, BookingError> {
    let customer_name = request.customer.name.trim().to_owned();
    if customer_name.is_empty() {
        return Err(BookingError::Validation {
            field: "customer.name",
            message: "name is required".to_owned(),
        });
    }

    let customer_email =
        Email::parse(request.customer.email.trim()).map_err(|e| BookingError::Validation {
            field: "customer.email",
            message: e.to_string(),
        })?;

    let customer_phone = request.customer.phone.trim().to_owned();
    if customer_phone.is_empty() {
        return Err(BookingError::Validation {
            field: "customer.phone",
            message: "phone is required".to_owned(),
        });
    }

    let event_type =
        EventType::from_str(request.event.event_type.trim()).map_err(|message| {
            BookingError::Validation {
                field: "event.eventType",
                message,
            }
        })?;

    let event_date = NaiveDate::parse_from_str(request.event.event_date.trim(), "%Y-%m-%d")
        .map_err(|_| BookingError::Validation {
            field: "event.eventDate",
            message: "date must be in YYYY-MM-DD format".to_owned(),
        })?;

    let event_time = request.event.event_time.trim().to_owned();
    if event_time.is_empty() {
        return Err(BookingError::Validation {
            field: "event.eventTime",
            message: "time is required".to_owned(),
        });
    }

    if request.event.guest_count < 1 || request.event.guest_count > MAX_GUEST_COUNT {
        return Err(BookingError::Validation {
            field: "event.guestCount",
            message: format!("guest count must be between 1 and {MAX_GUEST_COUNT}"),
        });
    }
    let guest_count = i32::try_from(request.event.guest_count).map_err(|_| {
        BookingError::Validation {
            field: "event.guestCount",
            message: "guest count out of range".to_owned(),
        }
    })?;

    Ok(NewReservation {
        customer_name,
        customer_email,
        customer_phone,
        event_type,
        event_date,
        event_time,
        guest_count,
        venue: normalize_optional(request.event.venue),
        special_requirements: normalize_optional(request.event.special_requirements),
        dietary_restrictions: normalize_optional(request.event.dietary_restrictions),
        estimated_budget: normalize_optional(request.event.estimated_budget),
    })
}

/// Reservation booking service.
pub struct BookingService<'a> {
    reservations: ReservationRepository<'a>,
    notifier: Option<&'a Notifier>,
}

impl<'a> BookingService<'a> {
    /// Create a new booking service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, notifier: Option<&'a Notifier>) -> Self {
        Self {
            reservations: ReservationRepository::new(pool),
            notifier,
        }
    }

    /// Book an event: validate, check the date, persist, notify staff.
    ///
    /// The availability pre-check gives a friendly error without burning an
    /// insert; the partial unique index on `event_date` is what actually
    /// prevents a double booking when two requests race.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Validation`] for bad input and
    /// [`BookingError::Repository`] wrapping
    /// [`RepositoryError::DateConflict`] when the date is taken.
    pub async fn book(&self, request: ReservationRequest) -> Result<Reservation, BookingError> {
        let draft = validate(request)?;

        if self.reservations.is_date_held(draft.event_date).await? {
            return Err(RepositoryError::DateConflict(draft.event_date).into());
        }

        let reservation = self.reservations.create(&draft).await?;

        info!(
            reservation_id = %reservation.id,
            event_date = %reservation.event_date,
            "reservation created"
        );

        if let Some(notifier) = self.notifier {
            let summary = reservation_summary(&reservation);
            if let Err(e) = notifier.post_text(&summary).await {
                warn!(
                    error = %e,
                    reservation_id = %reservation.id,
                    "reservation notification failed"
                );
            }
        }

        Ok(reservation)
    }
}

/// One-line staff notification for a new reservation.
#[must_use]
pub fn reservation_summary(reservation: &Reservation) -> String {
    let mut summary = format!(
        "Nouvelle réservation #{}: {} le {} ({}), {} invités. Client: {}, {}, {}.",
        reservation.id,
        event_type_label(reservation.event_type),
        reservation.event_date,
        reservation.event_time,
        reservation.guest_count,
        reservation.customer_name,
        reservation.customer_email,
        reservation.customer_phone,
    );
    if let Some(venue) = &reservation.venue {
        summary.push_str(&format!(" Lieu: {venue}."));
    }
    if let Some(budget) = &reservation.estimated_budget {
        summary.push_str(&format!(" Budget: {budget}."));
    }
    summary
}

/// French label for the staff channel.
const fn event_type_label(event_type: EventType) -> &'static str {
    match event_type {
        EventType::Wedding => "mariage",
        EventType::Corporate => "événement corporatif",
        EventType::PrivateParty => "fête privée",
        EventType::Other => "autre événement",
    }
}
