//! Stripe Checkout integration.
//!
//! This module provides:
//! - [`StripeClient`] for creating hosted Checkout sessions
//! - [`SessionParams`] for building the session request
//!
//! # Flow
//!
//! 1. Checkout persists a pending order
//! 2. A Checkout session is created with the order's line items and totals
//! 3. The customer is redirected to the session URL to pay
//! 4. Stripe redirects back to the success URL with the session ID
//!
//! Only the session-creation endpoint is used; payment confirmation
//! arrives out of band and is handled by staff via the order status
//! endpoints.

mod client;
mod error;
mod types;

pub use client::StripeClient;
pub use error::StripeError;
pub use types::{CheckoutSession, SessionLineItem, SessionParams};
