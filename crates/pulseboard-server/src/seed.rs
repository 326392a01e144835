//! Demo data seeding.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use tracing::info;

use pulseboard_core::bucket::trailing_hour_starts;
use pulseboard_core::record::CounterPatch;
use pulseboard_core::{PulseboardError, Result};

use crate::live::LiveCounterStore;
use crate::store::DocumentStore;
use crate::writer::{BucketWriter, HourlyUpsert, WriteReport};

pub const DEFAULT_SEED_HOURS: u32 = 24;

/// What a seed run wrote.
#[derive(Debug, Clone)]
pub struct SeedSummary {
    pub hours: u32,
    pub groups_committed: usize,
    pub counters: CounterPatch,
}

/// Backfill the trailing `hours` hourly buckets with plausible random order
/// totals and set the live counters. Re-running overwrites the same buckets,
/// so repeated seeds converge instead of accumulating.
pub async fn seed_store(store: Arc<dyn DocumentStore>, hours: u32) -> Result<SeedSummary> {
    if hours == 0 {
        return Err(PulseboardError::BadRequest("hours must be >= 1".into()));
    }

    let now = Utc::now();
    // Random values are drawn up front; ThreadRng must not live across an
    // await.
    let (patch, rows) = {
        let mut rng = rand::thread_rng();
        let patch = CounterPatch {
            online_users: Some(rng.gen_range(5..=30)),
            queue_depth: Some(rng.gen_range(0..=10)),
            last_updated: Some(now),
        };
        let rows: Vec<HourlyUpsert> = trailing_hour_starts(hours as usize, now)
            .into_iter()
            .map(|start| {
                let count: u64 = rng.gen_range(0..=20);
                let revenue: f64 = (0..count).map(|_| 10.0 + rng.gen::<f64>() * 50.0).sum();
                HourlyUpsert {
                    start,
                    count,
                    revenue,
                }
            })
            .collect();
        (patch, rows)
    };

    let live = LiveCounterStore::new(Arc::clone(&store));
    live.upsert(&patch).await?;

    let writer = BucketWriter::new(store);
    let WriteReport {
        groups_committed, ..
    } = writer.upsert_hours(&rows).await?;

    info!(hours, groups = groups_committed, "seed run finished");
    Ok(SeedSummary {
        hours,
        groups_committed,
        counters: patch,
    })
}
