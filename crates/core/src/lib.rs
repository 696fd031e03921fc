//! Orchidée Core - Shared types and pricing rules.
//!
//! This crate provides common types used across all Orchidée Traiteur components:
//! - `storefront` - Public API and staff API binary
//! - `cli` - Command-line tools for migrations and maintenance
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere, including in tests that never touch a database.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money amounts, emails,
//!   and the order/reservation status machines
//! - [`pricing`] - Cart total computation (subtotal, delivery fee, sales tax)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pricing;
pub mod types;

pub use types::*;
