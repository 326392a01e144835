//! Field-value model and defensive record normalization.
//!
//! Store documents arrive as untyped field maps. Everything crossing that
//! boundary is coerced right here into the typed `MetricPoint` /
//! `LiveCounters` projections; the untyped form never travels further into
//! the system. Coercion is total: a malformed field degrades to a default
//! instead of failing the batch that contains it.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;

/// Bucket document field names (wire-level).
pub const FIELD_TS: &str = "ts";
pub const FIELD_COUNT: &str = "count";
pub const FIELD_REVENUE: &str = "revenue";
pub const FIELD_UPDATED_AT: &str = "updatedAt";

/// Live counter document field names (wire-level).
pub const FIELD_ONLINE_USERS: &str = "onlineUsers";
pub const FIELD_QUEUE_DEPTH: &str = "queueDepth";
pub const FIELD_LAST_UPDATED: &str = "lastUpdated";

/// Scalar value model of the document store.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// The store's native temporal type.
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    /// Lossy numeric view; `None` for non-numeric values.
    fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(i) => Some(*i as f64),
            FieldValue::Float(f) if f.is_finite() => Some(*f),
            _ => None,
        }
    }
}

/// One document's fields.
pub type Fields = BTreeMap<String, FieldValue>;

/// Merge `patch` into `existing`: supplied fields replace, absent fields are
/// left untouched. This is the merge-write every upsert in the system uses.
pub fn merge_fields(existing: &mut Fields, patch: Fields) {
    existing.extend(patch);
}

/// Render an instant the way the wire expects it: RFC 3339 with millisecond
/// precision and a `Z` suffix.
pub fn render_ts(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Query-facing projection of one hourly bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    /// Bucket start, RFC 3339.
    pub ts: String,
    /// Events aggregated into the bucket.
    pub count: u64,
    /// Revenue aggregated into the bucket, 2 fractional digits.
    pub revenue: f64,
}

impl MetricPoint {
    /// Coerce an untyped bucket record into its query projection.
    ///
    /// - `ts`: native timestamps render as-is; strings must parse RFC 3339;
    ///   anything else defaults to `now`.
    /// - `count` / `revenue`: 0 when absent or non-numeric, negatives clamp
    ///   to 0.
    ///
    /// Returns the coerced bucket start alongside the projection so callers
    /// can filter and order without re-parsing `ts`.
    pub fn normalize(fields: &Fields, now: DateTime<Utc>) -> (DateTime<Utc>, Self) {
        let start = coerce_ts(fields.get(FIELD_TS), now);
        let point = MetricPoint {
            ts: render_ts(start),
            count: coerce_count(fields.get(FIELD_COUNT)),
            revenue: coerce_revenue(fields.get(FIELD_REVENUE)),
        };
        (start, point)
    }
}

/// Typed projection of the live counter singleton.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveCounters {
    #[serde(default)]
    pub online_users: u64,
    #[serde(default)]
    pub queue_depth: u64,
    /// Producer-reported update time, RFC 3339. `None` when never reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl LiveCounters {
    /// Coerce an untyped live counter record, with the same defaulting rules
    /// as [`MetricPoint::normalize`].
    pub fn from_fields(fields: &Fields) -> Self {
        Self {
            online_users: coerce_count(fields.get(FIELD_ONLINE_USERS)),
            queue_depth: coerce_count(fields.get(FIELD_QUEUE_DEPTH)),
            last_updated: coerce_ts_string(fields.get(FIELD_LAST_UPDATED)),
        }
    }
}

/// Partial live counter update. Absent fields never touch stored ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CounterPatch {
    pub online_users: Option<u64>,
    pub queue_depth: Option<u64>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl CounterPatch {
    /// The fields this patch writes; feeds a merge upsert.
    pub fn fields(&self) -> Fields {
        let mut fields = Fields::new();
        if let Some(v) = self.online_users {
            fields.insert(FIELD_ONLINE_USERS.into(), int_field(v));
        }
        if let Some(v) = self.queue_depth {
            fields.insert(FIELD_QUEUE_DEPTH.into(), int_field(v));
        }
        if let Some(at) = self.last_updated {
            fields.insert(FIELD_LAST_UPDATED.into(), FieldValue::Str(render_ts(at)));
        }
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.online_users.is_none() && self.queue_depth.is_none() && self.last_updated.is_none()
    }
}

fn int_field(v: u64) -> FieldValue {
    FieldValue::Int(i64::try_from(v).unwrap_or(i64::MAX))
}

fn coerce_ts(value: Option<&FieldValue>, now: DateTime<Utc>) -> DateTime<Utc> {
    match value {
        Some(FieldValue::Timestamp(t)) => *t,
        Some(FieldValue::Str(s)) => match DateTime::parse_from_rfc3339(s) {
            Ok(t) => t.with_timezone(&Utc),
            Err(err) => {
                tracing::debug!(
                    code = ErrorCode::MalformedRecord.as_str(),
                    value = %s,
                    %err,
                    "unparseable ts, defaulting to current instant"
                );
                now
            }
        },
        _ => now,
    }
}

fn coerce_count(value: Option<&FieldValue>) -> u64 {
    match value {
        Some(FieldValue::Int(i)) => (*i).max(0) as u64,
        Some(FieldValue::Float(f)) if f.is_finite() && *f > 0.0 => *f as u64,
        _ => 0,
    }
}

fn coerce_revenue(value: Option<&FieldValue>) -> f64 {
    match value.and_then(FieldValue::as_f64) {
        Some(v) if v > 0.0 => v,
        _ => 0.0,
    }
}

fn coerce_ts_string(value: Option<&FieldValue>) -> Option<String> {
    match value {
        // Display-only field: strings pass through as the producer wrote them.
        Some(FieldValue::Str(s)) => Some(s.clone()),
        Some(FieldValue::Timestamp(t)) => Some(render_ts(*t)),
        _ => None,
    }
}
