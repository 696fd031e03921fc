//! Database migration command.
//!
//! Migrations live in `crates/storefront/migrations/` and are embedded in
//! this binary at compile time, so the deployed CLI needs no source tree.
//!
//! # Environment Variables
//!
//! - `ORCHIDEE_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection
//!   string

use tracing::info;

use orchidee_storefront::db;

use super::{CommandError, database_url};

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails,
/// or a migration fails to apply.
pub async fn run() -> Result<(), CommandError> {
    let url = database_url()?;

    info!("Connecting to database...");
    let pool = db::create_pool(&url).await?;

    info!("Running migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    info!("Migrations complete");
    Ok(())
}
