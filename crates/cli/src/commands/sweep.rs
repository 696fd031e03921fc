//! Stale pending order sweep.
//!
//! Checkout creates the order before the Stripe session, so a customer who
//! abandons payment leaves a `pending` order with no completed charge.
//! Those rows are harmless but accumulate; this command cancels the ones
//! older than the retention window. Meant to run from cron, outside the
//! request path.

use chrono::{Duration, Utc};
use tracing::info;

use orchidee_storefront::db::{self, OrderRepository};

use super::{CommandError, database_url};

/// Cancel pending orders created more than `older_than_hours` ago.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails,
/// or the update fails.
pub async fn stale_orders(older_than_hours: u32) -> Result<(), CommandError> {
    let url = database_url()?;
    let pool = db::create_pool(&url).await?;

    let cutoff = Utc::now() - Duration::hours(i64::from(older_than_hours));
    info!(%cutoff, "Sweeping pending orders");

    let repo = OrderRepository::new(&pool);
    let cancelled = repo.cancel_stale_pending(cutoff).await?;

    for order in &cancelled {
        info!(
            order_number = %order.order_number,
            created_at = %order.created_at,
            total = %order.total,
            "Cancelled stale pending order"
        );
    }
    info!(count = cancelled.len(), "Sweep complete");

    Ok(())
}
