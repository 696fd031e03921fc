//! Database operations for orders and their line items.
//!
//! Orders and their items are always written together in one transaction;
//! a half-inserted order is never visible. Status changes lock the row with
//! `SELECT ... FOR UPDATE` so two staff members cannot race each other into
//! an illegal transition.

use chrono::{DateTime, Utc};
use rand::Rng;
use sqlx::PgPool;

use orchidee_core::pricing::LineItem;
use orchidee_core::{Email, OrderId, OrderStatus};

use super::RepositoryError;
use crate::models::order::{NewOrder, Order, OrderItem};

/// Suffix alphabet for order numbers. Ambiguous glyphs (0/O, 1/I/L) are
/// left out so numbers survive being read over the phone.
const SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Length of the random suffix.
const SUFFIX_LEN: usize = 4;

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Generate a human-facing order number: `PREFIX-<millis in base 36,
    /// uppercase>-<4 random chars>`.
    ///
    /// The timestamp part makes numbers roughly sortable; the random suffix
    /// keeps two checkouts in the same millisecond apart. Collisions are
    /// still possible and surface as
    /// [`RepositoryError::DuplicateOrderNumber`] from [`Self::create`].
    #[must_use]
    pub fn generate_order_number(prefix: &str) -> String {
        let millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        let mut rng = rand::rng();
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| {
                let idx = rng.random_range(0..SUFFIX_ALPHABET.len());
                char::from(*SUFFIX_ALPHABET.get(idx).unwrap_or(&b'X'))
            })
            .collect();
        format!("{prefix}-{}-{suffix}", base36_upper(millis))
    }

    /// Insert a pending order together with all of its line items.
    ///
    /// The order row and every item row are written in a single transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::EmptyOrder` if `items` is empty.
    /// Returns `RepositoryError::DuplicateOrderNumber` if the order number
    /// is already taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        order: &NewOrder,
        items: &[LineItem],
    ) -> Result<Order, RepositoryError> {
        if items.is_empty() {
            return Err(RepositoryError::EmptyOrder);
        }

        let mut tx = self.pool.begin().await?;

        let created: Order = sqlx::query_as(
            r"
            INSERT INTO catering.orders (
                order_number, customer_name, customer_email, customer_phone,
                delivery_method, delivery_date, delivery_time, delivery_address,
                delivery_instructions, notes, language,
                subtotal, tax, delivery_fee, total
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING id, order_number, customer_name, customer_email, customer_phone,
                      delivery_method, delivery_date, delivery_time, delivery_address,
                      delivery_instructions, notes, language,
                      subtotal, tax, delivery_fee, total,
                      status, stripe_session_id, stripe_customer_id, created_at, updated_at
            ",
        )
        .bind(&order.order_number)
        .bind(&order.customer_name)
        .bind(order.customer_email.as_str())
        .bind(&order.customer_phone)
        .bind(order.delivery_method)
        .bind(order.delivery_date)
        .bind(&order.delivery_time)
        .bind(order.delivery_address.as_deref())
        .bind(order.delivery_instructions.as_deref())
        .bind(order.notes.as_deref())
        .bind(&order.language)
        .bind(order.totals.subtotal)
        .bind(order.totals.tax)
        .bind(order.totals.delivery_fee)
        .bind(order.totals.total)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::DuplicateOrderNumber(order.order_number.clone());
            }
            RepositoryError::Database(e)
        })?;

        for item in items {
            let line_subtotal = item.line_subtotal().ok_or_else(|| {
                RepositoryError::DataCorruption(format!(
                    "line subtotal overflow for product {}",
                    item.product_id
                ))
            })?;
            let quantity = i32::try_from(item.quantity).map_err(|_| {
                RepositoryError::DataCorruption(format!(
                    "quantity out of range for product {}",
                    item.product_id
                ))
            })?;

            sqlx::query(
                r"
                INSERT INTO catering.order_items (
                    order_id, product_id, product_name, product_category,
                    unit_price, quantity, line_subtotal
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ",
            )
            .bind(created.id)
            .bind(&item.product_id)
            .bind(&item.product_name)
            .bind(item.product_category.as_deref())
            .bind(item.unit_price)
            .bind(quantity)
            .bind(line_subtotal)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(created)
    }

    /// Record the Stripe Checkout session ID (and customer ID, when the
    /// session carries one) on an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_payment_session(
        &self,
        id: OrderId,
        session_id: &str,
        customer_id: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE catering.orders
            SET stripe_session_id = $2, stripe_customer_id = $3, updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(session_id)
        .bind(customer_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Move an order to a new status, enforcing the lifecycle rules.
    ///
    /// Reads the current status under `FOR UPDATE` so concurrent updates
    /// serialize; the losing request sees the winner's status and fails the
    /// transition check instead of silently overwriting it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    /// Returns `RepositoryError::IllegalTransition` if the change is not a
    /// legal lifecycle step.
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn update_status(
        &self,
        id: OrderId,
        next: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<OrderStatus> =
            sqlx::query_scalar("SELECT status FROM catering.orders WHERE id = $1 FOR UPDATE")
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

        let updated: Order = sqlx::query_as(
            r"
            UPDATE catering.orders
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, order_number, customer_name, customer_email, customer_phone,
                      delivery_method, delivery_date, delivery_time, delivery_address,
                      delivery_instructions, notes, language,
                      subtotal, tax, delivery_fee, total,
                      status, stripe_session_id, stripe_customer_id, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(next)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Order, RepositoryError> {
        sqlx::query_as(
            r"
            SELECT id, order_number, customer_name, customer_email, customer_phone,
                   delivery_method, delivery_date, delivery_time, delivery_address,
                   delivery_instructions, notes, language,
                   subtotal, tax, delivery_fee, total,
                   status, stripe_session_id, stripe_customer_id, created_at, updated_at
            FROM catering.orders
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Get an order by its human-facing order number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_number(&self, order_number: &str) -> Result<Order, RepositoryError> {
        sqlx::query_as(
            r"
            SELECT id, order_number, customer_name, customer_email, customer_phone,
                   delivery_method, delivery_date, delivery_time, delivery_address,
                   delivery_instructions, notes, language,
                   subtotal, tax, delivery_fee, total,
                   status, stripe_session_id, stripe_customer_id, created_at, updated_at
            FROM catering.orders
            WHERE order_number = $1
            ",
        )
        .bind(order_number)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Get the line items of an order, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let items = sqlx::query_as(
            r"
            SELECT id, order_id, product_id, product_name, product_category,
                   unit_price, quantity, line_subtotal, created_at
            FROM catering.order_items
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// Read-only order + items snapshot, looked up by order number.
    ///
    /// This is what the receipt and order-printing consumers get; they
    /// never see a mutable handle.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn snapshot(
        &self,
        order_number: &str,
    ) -> Result<(Order, Vec<OrderItem>), RepositoryError> {
        let order = self.get_by_number(order_number).await?;
        let items = self.items(order.id).await?;
        Ok((order, items))
    }

    /// List the most recent orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as(
            r"
            SELECT id, order_number, customer_name, customer_email, customer_phone,
                   delivery_method, delivery_date, delivery_time, delivery_address,
                   delivery_instructions, notes, language,
                   subtotal, tax, delivery_fee, total,
                   status, stripe_session_id, stripe_customer_id, created_at, updated_at
            FROM catering.orders
            ORDER BY created_at DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// List all orders placed with a given email, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_email(&self, email: &Email) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as(
            r"
            SELECT id, order_number, customer_name, customer_email, customer_phone,
                   delivery_method, delivery_date, delivery_time, delivery_address,
                   delivery_instructions, notes, language,
                   subtotal, tax, delivery_fee, total,
                   status, stripe_session_id, stripe_customer_id, created_at, updated_at
            FROM catering.orders
            WHERE customer_email = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(email.as_str())
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// Cancel every pending order created before `cutoff` and return them.
    ///
    /// Pending orders are checkouts whose payment never completed; sweeping
    /// them keeps the order list honest. The cutoff is computed by the
    /// caller (the CLI defaults to 72 hours).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn cancel_stale_pending(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Order>, RepositoryError> {
        let cancelled = sqlx::query_as(
            r"
            UPDATE catering.orders
            SET status = $1, updated_at = now()
            WHERE status = $2 AND created_at < $3
            RETURNING id, order_number, customer_name, customer_email, customer_phone,
                      delivery_method, delivery_date, delivery_time, delivery_address,
                      delivery_instructions, notes, language,
                      subtotal, tax, delivery_fee, total,
                      status, stripe_session_id, stripe_customer_id, created_at, updated_at
            ",
        )
        .bind(OrderStatus::Cancelled)
        .bind(OrderStatus::Pending)
        .bind(cutoff)
        .fetch_all(self.pool)
        .await?;

        Ok(cancelled)
    }
}

/// Render `n` in base 36 using uppercase digits.
fn base36_upper(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        let digit = u32::try_from(n % 36).unwrap_or_default();
        if let Some(c) = char::from_digit(digit, 36) {
            out.push(c.to_ascii_uppercase());
        }
        n /= 36;
    }
    out.iter().rev().collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base36_known_values() {
        assert_eq!(base36_upper(0), "0");
        assert_eq!(base36_upper(35), "Z");
        assert_eq!(base36_upper(36), "10");
        assert_eq!(base36_upper(1_700_000_000_000), "LOYW3V28");
    }

    #[test]
    fn test_order_number_shape() {
        let number = OrderRepository::generate_order_number("CMD");
        let parts: Vec<&str> = number.split('-').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(*parts.first().unwrap(), "CMD");
        assert!(!parts.get(1).unwrap().is_empty());
        assert!(
            parts
                .get(1)
                .unwrap()
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        );
        assert_eq!(parts.get(2).unwrap().len(), SUFFIX_LEN);
        assert!(
            parts
                .get(2)
                .unwrap()
                .bytes()
                .all(|b| SUFFIX_ALPHABET.contains(&b))
        );
    }

    #[test]
    fn test_order_numbers_differ() {
        let a = OrderRepository::generate_order_number("CMD");
        let b = OrderRepository::generate_order_number("CMD");
        // The random suffix makes a same-millisecond collision a 1 in 31^4
        // event; a flaky failure here would itself be suspicious.
        assert_ne!(a, b);
    }
}
