//! End-to-end demo against an in-memory store.
//!
//! Seeds history, starts a dashboard client, and runs a producer task that
//! patches the live counters every couple of seconds while the dashboard
//! view is printed each tick. Useful for eyeballing the poll/push merge
//! without any external backend.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use rand::Rng;
use tracing_subscriber::{fmt, EnvFilter};

use pulseboard_core::record::CounterPatch;
use pulseboard_core::Result;
use pulseboard_server::dashboard::{DashboardClient, DashboardOptions};
use pulseboard_server::live::LiveCounterStore;
use pulseboard_server::reconcile::DashboardView;
use pulseboard_server::seed::seed_store;
use pulseboard_server::store::{DocumentStore, MemoryStore};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// How many trailing hours to seed
    #[arg(long, default_value_t = 24)]
    hours: u32,

    /// How many dashboard ticks to print before exiting
    #[arg(long, default_value_t = 6)]
    ticks: u32,
}

fn print_view(tick: u32, view: &DashboardView) {
    println!("--- tick {tick} ---");
    println!(
        "online {:>3}  queue {:>2}  updated {}  [{}]",
        view.online_users,
        view.queue_depth,
        view.last_updated_display(),
        view.source.as_str()
    );
    if let Some(error) = &view.error {
        println!("degraded: {error}");
    }
    let tail = view.orders_hourly.iter().rev().take(5).rev();
    for point in tail {
        println!("  {}  count {:>3}  revenue {:>8.2}", point.ts, point.count, point.revenue);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    seed_store(Arc::clone(&store), args.hours).await?;

    let producer_store = Arc::clone(&store);
    let producer = tokio::spawn(async move {
        let live = LiveCounterStore::new(producer_store);
        let mut ticks = tokio::time::interval(Duration::from_secs(2));
        loop {
            ticks.tick().await;
            let patch = {
                let mut rng = rand::thread_rng();
                CounterPatch {
                    online_users: Some(rng.gen_range(5..=30)),
                    queue_depth: Some(rng.gen_range(0..=10)),
                    last_updated: Some(Utc::now()),
                }
            };
            if live.upsert(&patch).await.is_err() {
                break;
            }
        }
    });

    let mut client = DashboardClient::start(
        store,
        DashboardOptions {
            poll_every: Duration::from_secs(3),
            window_hours: args.hours.max(1),
        },
    )
    .await?;

    for tick in 1..=args.ticks {
        tokio::time::sleep(Duration::from_secs(2)).await;
        print_view(tick, &client.view());
    }

    client.shutdown().await;
    producer.abort();
    Ok(())
}
