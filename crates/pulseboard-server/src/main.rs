//! Pulseboard server binary.
//!
//! Serves the dashboard data API plus operational endpoints:
//! - `/api/metrics` : combined hourly history + live counters
//! - `/healthz`, `/readyz`, `/metrics`

use std::net::SocketAddr;
use std::path::Path;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use pulseboard_core::{PulseboardError, Result};
use pulseboard_server::{app_state, config, router, seed};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    ///
    /// Can be overridden with the PULSEBOARD_CONFIG environment variable
    #[arg(short, long, default_value = "pulseboard.yaml", env = "PULSEBOARD_CONFIG")]
    config: String,

    /// Seed the store with this many trailing hours at boot
    ///
    /// Can be overridden with the PULSEBOARD_SEED_HOURS environment variable
    #[arg(long, env = "PULSEBOARD_SEED_HOURS")]
    seed_hours: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let cfg = if Path::new(&args.config).exists() {
        config::load_from_file(&args.config)?
    } else {
        tracing::info!(path = %args.config, "no config file, using defaults");
        config::ServerConfig::default()
    };
    let listen: SocketAddr = cfg.server.listen.parse().map_err(|e| {
        PulseboardError::BadRequest(format!("server.listen {:?}: {e}", cfg.server.listen))
    })?;

    let state = app_state::AppState::new(cfg)?;

    if let Some(hours) = args.seed_hours {
        let summary = seed::seed_store(state.store(), hours).await?;
        tracing::info!(hours = summary.hours, "store seeded at boot");
    }

    let app = router::build_router(state);

    tracing::info!(%listen, "pulseboard-server starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| PulseboardError::Internal(format!("bind {listen}: {e}")))?;
    axum::serve(listener, app)
        .await
        .map_err(|e| PulseboardError::Internal(format!("server failed: {e}")))?;
    Ok(())
}
