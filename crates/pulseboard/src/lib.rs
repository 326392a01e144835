//! Top-level facade crate for Pulseboard.
//!
//! Re-exports the core types and the server library so users can depend on a single crate.

pub mod core {
    pub use pulseboard_core::*;
}

pub mod server {
    pub use pulseboard_server::*;
}
