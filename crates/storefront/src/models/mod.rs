//! Domain models for the storefront.
//!
//! Orders and reservations are database-backed; the cart lives in the
//! session and is priced on every read.

pub mod cart;
pub mod order;
pub mod reservation;

pub use cart::{CART_SESSION_KEY, Cart, CartSummary};
pub use order::{NewOrder, Order, OrderItem};
pub use reservation::{NewReservation, Reservation};
