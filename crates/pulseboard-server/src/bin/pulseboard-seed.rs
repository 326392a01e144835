//! One-shot seeding tool.
//!
//! Backfills the trailing hourly buckets with random order totals and sets
//! the live counters, against the backend named in the config file.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use pulseboard_core::Result;
use pulseboard_server::config;
use pulseboard_server::seed::{seed_store, DEFAULT_SEED_HOURS};
use pulseboard_server::store::build_store;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// How many trailing hours to backfill
    ///
    /// Can be overridden with the PULSEBOARD_SEED_HOURS environment variable
    #[arg(long, default_value_t = DEFAULT_SEED_HOURS, env = "PULSEBOARD_SEED_HOURS")]
    hours: u32,

    /// Configuration file path
    ///
    /// Can be overridden with the PULSEBOARD_CONFIG environment variable
    #[arg(short, long, default_value = "pulseboard.yaml", env = "PULSEBOARD_CONFIG")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let cfg = if std::path::Path::new(&args.config).exists() {
        config::load_from_file(&args.config)?
    } else {
        config::ServerConfig::default()
    };
    let store = build_store(&cfg.store)?;

    let summary = seed_store(store, args.hours).await?;
    tracing::info!(
        hours = summary.hours,
        groups = summary.groups_committed,
        online_users = ?summary.counters.online_users,
        queue_depth = ?summary.counters.queue_depth,
        "seed complete"
    );
    Ok(())
}
