//! Observability.

pub mod metrics;

pub use metrics::ServerMetrics;
