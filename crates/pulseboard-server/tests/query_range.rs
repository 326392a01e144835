//! Range query behavior: windowing, ordering, per-record degradation.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use pulseboard_core::bucket::hour_start;
use pulseboard_core::record::{FieldValue, Fields, FIELD_COUNT, FIELD_TS};
use pulseboard_server::query::RangeQueryService;
use pulseboard_server::store::{hourly_orders, DocumentStore, MemoryStore, WriteBatch};
use pulseboard_server::writer::{BucketWriter, HourlyUpsert};

use test_support::AlwaysFailStore;

fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

async fn seeded_store(base: DateTime<Utc>, hours: &[i64]) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let writer = BucketWriter::new(store.clone());
    let rows: Vec<HourlyUpsert> = hours
        .iter()
        .map(|h| HourlyUpsert {
            start: base + Duration::hours(*h),
            count: *h as u64,
            revenue: 0.0,
        })
        .collect();
    writer.upsert_hours(&rows).await.unwrap();
    store
}

#[tokio::test]
async fn mid_hour_start_excludes_the_containing_bucket() {
    let base = ts("2025-08-20T00:00:00Z");
    let store = seeded_store(base, &[0, 1, 2, 3, 4]).await;
    let query = RangeQueryService::new(store);

    let outcome = query.query_since(base + Duration::minutes(30)).await;
    assert!(outcome.error.is_none());
    // The bucket starting at 00:00 lies before 00:30 and stays out.
    let ts_list: Vec<&str> = outcome.points.iter().map(|p| p.ts.as_str()).collect();
    assert_eq!(
        ts_list,
        vec![
            "2025-08-20T01:00:00.000Z",
            "2025-08-20T02:00:00.000Z",
            "2025-08-20T03:00:00.000Z",
            "2025-08-20T04:00:00.000Z",
        ]
    );
}

#[tokio::test]
async fn points_come_back_ascending_regardless_of_write_order() {
    let base = ts("2025-08-20T00:00:00Z");
    let store = seeded_store(base, &[3, 1, 4, 0, 2]).await;
    let query = RangeQueryService::new(store);

    let outcome = query.query_since(base).await;
    let counts: Vec<u64> = outcome.points.iter().map(|p| p.count).collect();
    assert_eq!(counts, vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn malformed_document_degrades_alone() {
    let base = ts("2025-08-20T00:00:00Z");
    let store = seeded_store(base, &[0, 1, 2]).await;

    // A record whose ts does not parse and whose count is not numeric.
    let mut junk = Fields::new();
    junk.insert(FIELD_TS.into(), FieldValue::Str("not-a-time".into()));
    junk.insert(FIELD_COUNT.into(), FieldValue::Str("seven".into()));
    let mut batch = WriteBatch::new();
    batch.merge(hourly_orders().doc("garbage0000").unwrap(), junk);
    store.apply(batch).await.unwrap();

    let query = RangeQueryService::new(store);
    let outcome = query.query_since(base).await;

    assert!(outcome.error.is_none());
    assert_eq!(outcome.points.len(), 4);
    // The junk record coerces its ts to "now", sorting after the 2025 rows,
    // and its values default to zero.
    let junk_point = outcome.points.last().unwrap();
    assert_eq!(junk_point.count, 0);
    assert_eq!(junk_point.revenue, 0.0);
    let good: Vec<u64> = outcome.points[..3].iter().map(|p| p.count).collect();
    assert_eq!(good, vec![0, 1, 2]);
}

#[tokio::test]
async fn store_failure_degrades_to_empty_with_error() {
    let query = RangeQueryService::new(Arc::new(AlwaysFailStore));
    let outcome = query.query_since(ts("2025-08-20T00:00:00Z")).await;

    assert!(outcome.points.is_empty());
    assert!(outcome.error.unwrap().contains("injected outage"));
}

#[tokio::test]
async fn empty_store_yields_empty_without_error() {
    let query = RangeQueryService::new(Arc::new(MemoryStore::new()));
    let outcome = query.query_since(ts("2025-08-20T00:00:00Z")).await;

    assert!(outcome.points.is_empty());
    assert!(outcome.error.is_none());
}

#[tokio::test]
async fn trailing_window_includes_the_current_hour() {
    let store = Arc::new(MemoryStore::new());
    let writer = BucketWriter::new(store.clone());
    writer
        .upsert_hours(&[HourlyUpsert {
            start: hour_start(Utc::now()),
            count: 42,
            revenue: 0.0,
        }])
        .await
        .unwrap();

    let query = RangeQueryService::new(store);
    let outcome = query.query_window(2).await;
    assert!(outcome.points.iter().any(|p| p.count == 42));
}
