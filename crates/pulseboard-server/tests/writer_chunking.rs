//! Chunked writer behavior: grouping, partial-run durability, idempotence.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use pulseboard_core::bucket::bucket_key;
use pulseboard_core::record::{FieldValue, FIELD_COUNT, FIELD_REVENUE};
use pulseboard_core::PulseboardError;
use pulseboard_server::store::{hourly_orders, DocumentStore, MemoryStore};
use pulseboard_server::writer::{BucketWriter, HourlyUpsert};

use test_support::FailAfterStore;

fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

fn hourly_rows(base: DateTime<Utc>, n: usize) -> Vec<HourlyUpsert> {
    (0..n)
        .map(|i| HourlyUpsert {
            start: base + Duration::hours(i as i64),
            count: (i % 21) as u64,
            revenue: i as f64,
        })
        .collect()
}

#[tokio::test]
async fn six_hundred_rows_commit_in_two_groups() {
    let store = Arc::new(MemoryStore::new());
    let writer = BucketWriter::new(store.clone());
    let rows = hourly_rows(ts("2025-08-20T00:00:00Z"), 600);

    let report = writer.upsert_hours(&rows).await.unwrap();
    assert_eq!(report.rows, 600);
    assert_eq!(report.groups_committed, 2);
    assert_eq!(store.len().await, 600);
}

#[tokio::test]
async fn failed_group_keeps_earlier_groups_durable() {
    let store = Arc::new(FailAfterStore::new(1));
    let writer = BucketWriter::new(store.clone());
    let rows = hourly_rows(ts("2025-08-20T00:00:00Z"), 600);

    let err = writer.upsert_hours(&rows).await.unwrap_err();
    match err {
        PulseboardError::WriteChunkFailed { committed, reason } => {
            assert_eq!(committed, 1);
            assert!(reason.contains("injected outage"));
        }
        other => panic!("unexpected error: {other}"),
    }
    // The first 500-row group survived; nothing from the failed group did.
    assert_eq!(store.inner().len().await, 500);
}

#[tokio::test]
async fn rewriting_the_same_rows_converges() {
    let store = Arc::new(MemoryStore::new());
    let writer = BucketWriter::new(store.clone());
    let rows = hourly_rows(ts("2025-08-20T00:00:00Z"), 24);

    writer.upsert_hours(&rows).await.unwrap();
    writer.upsert_hours(&rows).await.unwrap();

    assert_eq!(store.len().await, 24);
    let doc = hourly_orders()
        .doc(bucket_key(ts("2025-08-20T03:00:00Z")).as_str())
        .unwrap();
    let fields = store.get(&doc).await.unwrap().unwrap();
    assert_eq!(fields.get(FIELD_COUNT), Some(&FieldValue::Int(3)));
}

#[tokio::test]
async fn rows_in_the_same_hour_collapse_to_one_bucket() {
    let store = Arc::new(MemoryStore::new());
    let writer = BucketWriter::new(store.clone());
    let rows = vec![
        HourlyUpsert {
            start: ts("2025-08-20T07:10:00Z"),
            count: 3,
            revenue: 30.0,
        },
        HourlyUpsert {
            start: ts("2025-08-20T07:50:00Z"),
            count: 5,
            revenue: 50.0,
        },
    ];

    writer.upsert_hours(&rows).await.unwrap();

    assert_eq!(store.len().await, 1);
    let doc = hourly_orders()
        .doc(bucket_key(ts("2025-08-20T07:00:00Z")).as_str())
        .unwrap();
    let fields = store.get(&doc).await.unwrap().unwrap();
    // Later row in the run wins the merge.
    assert_eq!(fields.get(FIELD_COUNT), Some(&FieldValue::Int(5)));
    assert_eq!(fields.get(FIELD_REVENUE), Some(&FieldValue::Float(50.0)));
}

#[tokio::test]
async fn revenue_rounds_to_cents_and_clamps_negatives() {
    let store = Arc::new(MemoryStore::new());
    let writer = BucketWriter::new(store.clone());
    let cases = [
        ("2025-08-20T00:00:00Z", 10.006, 10.01),
        ("2025-08-20T01:00:00Z", 33.333_333, 33.33),
        ("2025-08-20T02:00:00Z", -5.0, 0.0),
    ];
    let rows: Vec<HourlyUpsert> = cases
        .iter()
        .map(|(at, revenue, _)| HourlyUpsert {
            start: ts(at),
            count: 1,
            revenue: *revenue,
        })
        .collect();

    writer.upsert_hours(&rows).await.unwrap();

    for (at, _, expected) in cases {
        let doc = hourly_orders()
            .doc(bucket_key(ts(at)).as_str())
            .unwrap();
        let fields = store.get(&doc).await.unwrap().unwrap();
        match fields.get(FIELD_REVENUE) {
            Some(FieldValue::Float(f)) => {
                assert!((f - expected).abs() < 1e-9, "revenue {f} != {expected}")
            }
            other => panic!("unexpected revenue field: {other:?}"),
        }
    }
}
