//! Subscription tracker service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ axum transport (timeout, body limit)
//!                         │
//!                         ▼
//!                     routing::Router ── request_id → logger → handler
//!                         │
//!                         ▼
//!                     service (validation, date window resolution)
//!                         │
//!                         ▼
//!                     storage (PostgreSQL via sqlx, or in-memory)
//!
//!     Cross-cutting: config, observability (tracing + metrics),
//!                    resilience (connect retry), lifecycle (startup/shutdown)
//! ```

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "subscription-tracker")]
#[command(about = "Subscription tracking REST service", long_about = None)]
struct Args {
    /// Path to the TOML config file.
    #[arg(short, long, env = "CONFIG_PATH")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    subscription_tracker::lifecycle::run(&args.config).await?;
    Ok(())
}
