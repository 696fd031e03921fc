//! Order domain types.
//!
//! An order is a paid (or about to be paid) checkout: customer contact,
//! fulfilment details, money figures and a status. Line items snapshot
//! product names and prices at checkout time, so later catalog edits never
//! change what a customer sees on their receipt.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use orchidee_core::pricing::CartTotals;
use orchidee_core::{Cents, DeliveryMethod, Email, OrderId, OrderItemId, OrderStatus};

/// A customer order as stored in `catering.orders`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Human-facing order number, e.g. `CMD-MEB1X2K4-7QZA`.
    pub order_number: String,
    /// Customer's full name.
    pub customer_name: String,
    /// Customer's email address.
    pub customer_email: Email,
    /// Customer's phone number.
    pub customer_phone: String,
    /// Pickup or delivery.
    pub delivery_method: DeliveryMethod,
    /// Requested pickup or delivery date.
    pub delivery_date: NaiveDate,
    /// Requested time window, free-form (e.g. "11:30").
    pub delivery_time: String,
    /// Delivery address; `None` for pickup orders.
    pub delivery_address: Option<String>,
    /// Extra delivery instructions from the customer.
    pub delivery_instructions: Option<String>,
    /// Free-form order notes.
    pub notes: Option<String>,
    /// Customer's preferred language (`fr` or `en`).
    pub language: String,
    /// Sum of line subtotals, in cents.
    pub subtotal: Cents,
    /// Sales tax, in cents.
    pub tax: Cents,
    /// Delivery fee, in cents (zero for pickup and free delivery).
    pub delivery_fee: Cents,
    /// Grand total: subtotal + tax + `delivery_fee`.
    pub total: Cents,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Stripe Checkout session ID once one has been created.
    pub stripe_session_id: Option<String>,
    /// Stripe customer ID, when the session carries one.
    pub stripe_customer_id: Option<String>,
    /// When the order was created.
    pub created_at: DateTime<Utc>,
    /// When the order was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A single line of an order as stored in `catering.order_items`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Unique line item ID.
    pub id: OrderItemId,
    /// Order this line belongs to.
    pub order_id: OrderId,
    /// Catalog product identifier.
    pub product_id: String,
    /// Product name at order time.
    pub product_name: String,
    /// Product category at order time, if any.
    pub product_category: Option<String>,
    /// Unit price at order time, in cents.
    pub unit_price: Cents,
    /// Number of units ordered.
    #[sqlx(try_from = "i32")]
    pub quantity: u32,
    /// `unit_price` × `quantity`, in cents.
    pub line_subtotal: Cents,
    /// When the line was written.
    pub created_at: DateTime<Utc>,
}

/// Everything needed to insert a new pending order.
///
/// The repository owns ID, status and timestamps; the caller supplies the
/// validated customer data, the order number and the computed totals.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: Email,
    pub customer_phone: String,
    pub delivery_method: DeliveryMethod,
    pub delivery_date: NaiveDate,
    pub delivery_time: String,
    pub delivery_address: Option<String>,
    pub delivery_instructions: Option<String>,
    pub notes: Option<String>,
    pub language: String,
    pub totals: CartTotals,
}
