//! Hourly bucket key scheme.
//!
//! A bucket is one calendar hour in UTC. Its key is the zero-padded
//! `YYYYMMDDHH` of the hour start, which makes keys lexicographically
//! sortable and collision-free across hours, days, months, and years.
//! All functions here are pure and total.

use std::fmt;

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};

/// Hour-granularity bucket identifier (`YYYYMMDDHH`, UTC).
///
/// Doubles as the document id for bucket upserts: writing the same key twice
/// merges into one record instead of duplicating it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BucketKey(String);

impl BucketKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BucketKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Floor an instant to the start of its UTC hour.
pub fn hour_start(at: DateTime<Utc>) -> DateTime<Utc> {
    let secs = at.timestamp();
    let floored = secs - secs.rem_euclid(3600);
    // In range for any chrono-representable input; keep the input otherwise.
    DateTime::from_timestamp(floored, 0).unwrap_or(at)
}

/// Bucket key for the hour containing `at`.
///
/// `bucket_key(t1) == bucket_key(t2)` iff `t1` and `t2` fall in the same UTC
/// hour.
pub fn bucket_key(at: DateTime<Utc>) -> BucketKey {
    let h = hour_start(at);
    BucketKey(format!(
        "{:04}{:02}{:02}{:02}",
        h.year(),
        h.month(),
        h.day(),
        h.hour()
    ))
}

/// Start instants of the `n` trailing hourly windows ending at `end`,
/// ascending. Returns exactly `n` distinct instants; the last one is the
/// start of the hour containing `end`.
pub fn trailing_hour_starts(n: usize, end: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    let last = hour_start(end);
    (0..n)
        .rev()
        .map(|back| last - Duration::hours(back as i64))
        .collect()
}
