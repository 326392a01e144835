//! Chunked idempotent writer for hourly order buckets.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use pulseboard_core::bucket::{bucket_key, hour_start};
use pulseboard_core::record::{
    FieldValue, Fields, FIELD_COUNT, FIELD_REVENUE, FIELD_TS, FIELD_UPDATED_AT,
};
use pulseboard_core::{PulseboardError, Result};

use crate::store::{hourly_orders, DocumentStore, WriteBatch, MAX_OPS_PER_COMMIT};

/// One hour's worth of order totals, addressed by any instant in the hour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourlyUpsert {
    pub start: DateTime<Utc>,
    pub count: u64,
    pub revenue: f64,
}

/// Outcome of a writer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteReport {
    pub rows: usize,
    pub groups_committed: usize,
}

/// Writes hourly rows as merge-upserts keyed by bucket key, grouped into
/// commits of at most [`MAX_OPS_PER_COMMIT`] operations.
pub struct BucketWriter {
    store: Arc<dyn DocumentStore>,
}

impl BucketWriter {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Upsert `rows` in order. Groups commit one after another; if a group
    /// fails, the run aborts there so the store never holds a gap between
    /// committed groups. Re-running the same rows converges on the same
    /// state apart from `updatedAt`.
    pub async fn upsert_hours(&self, rows: &[HourlyUpsert]) -> Result<WriteReport> {
        let collection = hourly_orders();
        let mut groups_committed = 0usize;

        for group in rows.chunks(MAX_OPS_PER_COMMIT) {
            let now = Utc::now();
            let mut batch = WriteBatch::new();
            for row in group {
                let start = hour_start(row.start);
                let doc = collection.doc(bucket_key(start).as_str())?;
                batch.merge(doc, row_fields(start, row.count, row.revenue, now));
            }
            let ops = batch.len();
            if let Err(e) = self.store.apply(batch).await {
                return Err(PulseboardError::WriteChunkFailed {
                    committed: groups_committed,
                    reason: e.to_string(),
                });
            }
            groups_committed += 1;
            debug!(group = groups_committed, ops, "hourly group committed");
        }

        info!(
            rows = rows.len(),
            groups = groups_committed,
            "hourly upsert run finished"
        );
        Ok(WriteReport {
            rows: rows.len(),
            groups_committed,
        })
    }
}

fn row_fields(start: DateTime<Utc>, count: u64, revenue: f64, now: DateTime<Utc>) -> Fields {
    let mut fields = Fields::new();
    fields.insert(FIELD_TS.to_string(), FieldValue::Timestamp(start));
    fields.insert(
        FIELD_COUNT.to_string(),
        FieldValue::Int(i64::try_from(count).unwrap_or(i64::MAX)),
    );
    fields.insert(
        FIELD_REVENUE.to_string(),
        FieldValue::Float(round2(revenue.max(0.0))),
    );
    fields.insert(FIELD_UPDATED_AT.to_string(), FieldValue::Timestamp(now));
    fields
}

/// Round to cents before persisting.
pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
