//! Orchidée Traiteur CLI - Database migrations and maintenance tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! orchidee-cli migrate
//!
//! # Cancel pending orders whose payment never completed (default: 72h old)
//! orchidee-cli sweep-stale-orders
//! orchidee-cli sweep-stale-orders --older-than-hours 24
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `sweep-stale-orders` - Cancel stale pending orders (run from cron)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "orchidee-cli")]
#[command(author, version, about = "Orchidée Traiteur CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Cancel pending orders older than the retention window.
    ///
    /// Pending orders with no completed payment are checkout attempts the
    /// customer abandoned; sweeping them keeps the order list honest.
    SweepStaleOrders {
        /// Retention window in hours
        #[arg(long, default_value_t = 72)]
        older_than_hours: u32,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::SweepStaleOrders { older_than_hours } => {
            commands::sweep::stale_orders(older_than_hours).await?;
        }
    }
    Ok(())
}
