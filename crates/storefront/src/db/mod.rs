//! Database operations for the storefront `PostgreSQL`.
//!
//! # Schema: `catering`
//!
//! ## Tables
//!
//! - `orders` - Customer orders, one row per checkout
//! - `order_items` - Line items, snapshot prices at order time
//! - `reservations` - Full-service event bookings, one held date per day
//!
//! Session storage (the cart) lives in `tower_sessions.session`, owned by
//! the tower-sessions store.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p orchidee-cli -- migrate
//! ```

pub mod orders;
pub mod reservations;

use std::time::Duration;

use chrono::NaiveDate;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use orders::OrderRepository;
pub use reservations::ReservationRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation that is not covered by a more specific variant.
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Attempted to create an order with no line items.
    #[error("order must contain at least one item")]
    EmptyOrder,

    /// The generated order number collided with an existing one.
    #[error("order number already exists: {0}")]
    DuplicateOrderNumber(String),

    /// Another pending or confirmed reservation already holds this date.
    #[error("date already reserved: {0}")]
    DateConflict(NaiveDate),

    /// The requested status change is not a legal lifecycle step.
    #[error("illegal status transition: {from} -> {to}")]
    IllegalTransition { from: String, to: String },
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
