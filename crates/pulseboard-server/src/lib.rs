//! Pulseboard server library entry.
//!
//! This crate wires the document store, bucket writer, live counter paths,
//! dashboard read model, and HTTP surface into a cohesive service. It is
//! consumed by the binaries (`main.rs`, `bin/`) and by integration tests.

pub mod api;
pub mod app_state;
pub mod config;
pub mod dashboard;
pub mod feed;
pub mod live;
pub mod obs;
pub mod ops;
pub mod poll;
pub mod query;
pub mod reconcile;
pub mod router;
pub mod seed;
pub mod store;
pub mod writer;
