//! Database operations for event reservations.
//!
//! The business takes one full-service event per day. A partial unique
//! index on `event_date` (over pending and confirmed rows only) enforces
//! that at the database level, so the pre-insert conflict check in the
//! booking service is a courtesy, not the guarantee.

use chrono::NaiveDate;
use sqlx::PgPool;

use orchidee_core::{ReservationId, ReservationStatus};

use super::RepositoryError;
use crate::models::reservation::{NewReservation, Reservation};

/// Repository for reservation database operations.
pub struct ReservationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReservationRepository<'a> {
    /// Create a new reservation repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a pending reservation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DateConflict` if a pending or confirmed
    /// reservation already holds the event date.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, reservation: &NewReservation) -> Result<Reservation, RepositoryError> {
        sqlx::query_as(
            r"
            INSERT INTO catering.reservations (
                customer_name, customer_email, customer_phone,
                event_type, event_date, event_time, guest_count,
                venue, special_requirements, dietary_restrictions, estimated_budget
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, customer_name, customer_email, customer_phone,
                      event_type, event_date, event_time, guest_count,
                      venue, special_requirements, dietary_restrictions, estimated_budget,
                      status, created_at, updated_at
            ",
        )
        .bind(&reservation.customer_name)
        .bind(reservation.customer_email.as_str())
        .bind(&reservation.customer_phone)
        .bind(reservation.event_type)
        .bind(reservation.event_date)
        .bind(&reservation.event_time)
        .bind(reservation.guest_count)
        .bind(reservation.venue.as_deref())
        .bind(reservation.special_requirements.as_deref())
        .bind(reservation.dietary_restrictions.as_deref())
        .bind(reservation.estimated_budget.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::DateConflict(reservation.event_date);
            }
            RepositoryError::Database(e)
        })
    }

    /// Move a reservation to a new status, enforcing the lifecycle rules.
    ///
    /// Same locking discipline as order status changes: the current status
    /// is read under `FOR UPDATE` before the transition check.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the reservation does not exist.
    /// Returns `RepositoryError::IllegalTransition` if the change is not a
    /// legal lifecycle step.
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn update_status(
        &self,
        id: ReservationId,
        next: ReservationStatus,
    ) -> Result<Reservation, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<ReservationStatus> = sqlx::query_scalar(
            "SELECT status FROM catering.reservations WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let current = current.ok_or(RepositoryError::NotFound)?;

        if !current.can_transition_to(next) {
            return Err(RepositoryError::IllegalTransition {
                from: current.to_string(),
                to: next.to_string(),
            });
        }

        let updated: Reservation = sqlx::query_as(
            r"
            UPDATE catering.reservations
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, customer_name, customer_email, customer_phone,
                      event_type, event_date, event_time, guest_count,
                      venue, special_requirements, dietary_restrictions, estimated_budget,
                      status, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(next)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Get a reservation by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the reservation does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ReservationId) -> Result<Reservation, RepositoryError> {
        sqlx::query_as(
            r"
            SELECT id, customer_name, customer_email, customer_phone,
                   event_type, event_date, event_time, guest_count,
                   venue, special_requirements, dietary_restrictions, estimated_budget,
                   status, created_at, updated_at
            FROM catering.reservations
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// List the most recent reservations, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<Reservation>, RepositoryError> {
        let reservations = sqlx::query_as(
            r"
            SELECT id, customer_name, customer_email, customer_phone,
                   event_type, event_date, event_time, guest_count,
                   venue, special_requirements, dietary_restrictions, estimated_budget,
                   status, created_at, updated_at
            FROM catering.reservations
            ORDER BY created_at DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(reservations)
    }

    /// All dates currently held by a pending or confirmed reservation,
    /// soonest first. This is what the public availability calendar shows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn held_dates(&self) -> Result<Vec<NaiveDate>, RepositoryError> {
        let dates = sqlx::query_scalar(
            r"
            SELECT event_date
            FROM catering.reservations
            WHERE status IN ('pending', 'confirmed')
            ORDER BY event_date
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(dates)
    }

    /// Whether a pending or confirmed reservation already holds `date`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_date_held(&self, date: NaiveDate) -> Result<bool, RepositoryError> {
        let held: bool = sqlx::query_scalar(
            r"
            SELECT EXISTS (
                SELECT 1
                FROM catering.reservations
                WHERE event_date = $1 AND status IN ('pending', 'confirmed')
            )
            ",
        )
        .bind(date)
        .fetch_one(self.pool)
        .await?;

        Ok(held)
    }
}
