//! Shared error type across pulseboard crates.

use thiserror::Error;

/// Stable error codes surfaced in API payloads and log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Store unreachable / network failure.
    StoreUnavailable,
    /// Record fields missing or carrying the wrong type.
    MalformedRecord,
    /// A chunked commit group failed.
    WriteChunkFailed,
    /// Change subscription could not be established.
    SubscriptionSetup,
    /// Invalid input / malformed request.
    BadRequest,
    /// Internal server error.
    Internal,
}

impl ErrorCode {
    /// String representation used in JSON responses and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::StoreUnavailable => "STORE_UNAVAILABLE",
            ErrorCode::MalformedRecord => "MALFORMED_RECORD",
            ErrorCode::WriteChunkFailed => "WRITE_CHUNK_FAILED",
            ErrorCode::SubscriptionSetup => "SUBSCRIPTION_SETUP",
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, PulseboardError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum PulseboardError {
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("malformed record {path}: {reason}")]
    MalformedRecord { path: String, reason: String },
    #[error("write chunk failed after {committed} committed group(s): {reason}")]
    WriteChunkFailed { committed: usize, reason: String },
    #[error("subscription setup failed: {0}")]
    SubscriptionSetup(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl PulseboardError {
    /// Map internal error to a stable client-facing code.
    pub fn code(&self) -> ErrorCode {
        match self {
            PulseboardError::StoreUnavailable(_) => ErrorCode::StoreUnavailable,
            PulseboardError::MalformedRecord { .. } => ErrorCode::MalformedRecord,
            PulseboardError::WriteChunkFailed { .. } => ErrorCode::WriteChunkFailed,
            PulseboardError::SubscriptionSetup(_) => ErrorCode::SubscriptionSetup,
            PulseboardError::BadRequest(_) => ErrorCode::BadRequest,
            PulseboardError::Internal(_) => ErrorCode::Internal,
        }
    }
}
