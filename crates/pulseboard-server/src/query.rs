//! Range queries over the hourly buckets.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use pulseboard_core::bucket::bucket_key;
use pulseboard_core::record::MetricPoint;

use crate::store::{hourly_orders, DocumentStore};

/// Query result. A store failure never reaches the caller as an `Err`; it
/// degrades to an empty series with the failure text attached.
#[derive(Debug, Clone, Default)]
pub struct RangeQueryOutcome {
    pub points: Vec<MetricPoint>,
    pub error: Option<String>,
}

/// Reads hourly buckets at or after a starting instant, coercing each stored
/// record independently so one malformed document cannot poison a batch.
#[derive(Clone)]
pub struct RangeQueryService {
    store: Arc<dyn DocumentStore>,
}

impl RangeQueryService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Buckets whose hour starts at or after `since`, ascending by instant.
    pub async fn query_since(&self, since: DateTime<Utc>) -> RangeQueryOutcome {
        let collection = hourly_orders();
        let from = bucket_key(since);
        let rows = match self.store.scan(&collection, from.as_str()).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(code = e.code().as_str(), error = %e, "range query failed");
                return RangeQueryOutcome {
                    points: Vec::new(),
                    error: Some(e.to_string()),
                };
            }
        };

        let now = Utc::now();
        let mut keyed: Vec<(DateTime<Utc>, MetricPoint)> = rows
            .iter()
            .map(|(_, fields)| MetricPoint::normalize(fields, now))
            // Coerced timestamps can land before the window even when the
            // document id scanned in range; drop those rows.
            .filter(|(start, _)| *start >= since)
            .collect();
        keyed.sort_by_key(|(start, _)| *start);

        RangeQueryOutcome {
            points: keyed.into_iter().map(|(_, point)| point).collect(),
            error: None,
        }
    }

    /// Trailing window of `hours` ending now.
    pub async fn query_window(&self, hours: u32) -> RangeQueryOutcome {
        let since = Utc::now() - Duration::hours(i64::from(hours));
        self.query_since(since).await
    }
}
