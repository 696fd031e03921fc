//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `checkout` - Order checkout: validate, price, persist, create the
//!   Stripe session
//! - `booking` - Event reservations: validate, check the date, persist,
//!   notify staff
//! - `notify` - Best-effort staff notification webhook
//!
//! Routes stay thin; anything with more than one step lives here.

pub mod booking;
pub mod checkout;
pub mod notify;

use serde::Deserialize;

pub use booking::{BookingError, BookingService};
pub use checkout::{CheckoutError, CheckoutService};
pub use notify::Notifier;

/// Customer contact block shared by checkout and reservation requests.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Trim an optional field, mapping whitespace-only values to `None`.
pub(crate) fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}
