//! pulseboard core: store-agnostic metric primitives and error types.
//!
//! This crate defines the hourly bucket key scheme, the field-value model
//! shared with the document store, and the defensive normalization that turns
//! untyped store records into the typed projections served to dashboards. It
//! intentionally carries no runtime dependencies so it can be reused by the
//! server, the seeder, and tests.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed records must degrade to defaults via `record::*` coercion, and
//! all other fallible paths must surface as `PulseboardError`/`Result` so a
//! reporting process never crashes on bad data.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod bucket;
pub mod error;
pub mod record;

/// Shared result type.
pub use error::{PulseboardError, Result};
