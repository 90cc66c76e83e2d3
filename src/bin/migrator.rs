//! Applies the database migrations in `migrations/`.

use std::path::PathBuf;

use clap::Parser;

use subscription_tracker::config::load_config;
use subscription_tracker::lifecycle::{signals::spawn_signal_handler, startup_cancel, Shutdown};
use subscription_tracker::observability::init_logging;
use subscription_tracker::storage::PgStore;

#[derive(Parser)]
#[command(name = "migrator")]
#[command(about = "Run subscription-tracker database migrations", long_about = None)]
struct Args {
    /// Path to the TOML config file.
    #[arg(short, long, env = "CONFIG_PATH")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(&args.config)?;
    init_logging(&config)?;

    let shutdown = Shutdown::new();
    let cancel = startup_cancel(config.postgres.retry.startup_timeout(), shutdown.subscribe());
    spawn_signal_handler(shutdown);

    let store = PgStore::connect(&config.postgres, cancel).await?;
    let applied = store.migrate().await?;

    if applied == 0 {
        tracing::info!("No migrations to apply");
    } else {
        tracing::info!(applied, "Migrations applied");
    }
    Ok(())
}
