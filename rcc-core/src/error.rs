//! Error taxonomy and normalization (spec §4.1, §4.3, §7).
//!
//! Adapters speak a loose vendor vocabulary (a token, optionally followed by
//! `: <detail>`). The Orchestrator normalizes that vocabulary exactly once,
//! at the system boundary, into the closed six-member set that is the only
//! error vocabulary allowed to leave the process.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An error as returned by an [`crate::adapter::Adapter`] implementation.
///
/// Adapters MUST NOT invent tokens outside the prefix table recognized by
/// [`normalize`]; anything unrecognized normalizes to `INTERNAL`.
#[derive(Debug, Clone, Error)]
pub enum AdapterError {
    /// A vendor-specific failure, e.g. `"INVALID_RANGE: power out of range"`.
    #[error("vendor error: {0}")]
    Vendor(String),
    /// The call was cancelled because the remote end did not respond in time
    /// (as opposed to the local deadline firing first).
    #[error("cancelled")]
    Cancelled,
    /// The local deadline elapsed before the adapter call completed.
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl AdapterError {
    pub fn vendor(token: impl Into<String>) -> Self {
        AdapterError::Vendor(token.into())
    }

    /// The token before `:` (case-sensitive), used for prefix matching.
    fn token(&self) -> Option<&str> {
        match self {
            AdapterError::Vendor(s) => Some(s.split(':').next().unwrap_or(s).trim()),
            _ => None,
        }
    }

    /// The raw wire token this error should be reported as by the vendor
    /// emulator's JSON-RPC surface (spec §4.7 `message`).
    pub fn wire_token(&self) -> String {
        match self {
            AdapterError::Vendor(s) => s.clone(),
            AdapterError::Cancelled | AdapterError::DeadlineExceeded => "UNAVAILABLE".to_string(),
        }
    }
}

/// The closed set of normalized error codes — the only error vocabulary
/// crossing the API or telemetry boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NormalizedError {
    InvalidRange,
    NotFound,
    Busy,
    Unavailable,
    Timeout,
    Internal,
}

impl NormalizedError {
    pub fn as_str(&self) -> &'static str {
        match self {
            NormalizedError::InvalidRange => "INVALID_RANGE",
            NormalizedError::NotFound => "NOT_FOUND",
            NormalizedError::Busy => "BUSY",
            NormalizedError::Unavailable => "UNAVAILABLE",
            NormalizedError::Timeout => "TIMEOUT",
            NormalizedError::Internal => "INTERNAL",
        }
    }

    /// Bit-exact HTTP status mapping (spec §4.3).
    pub fn http_status(&self) -> u16 {
        match self {
            NormalizedError::InvalidRange => 400,
            NormalizedError::NotFound => 404,
            NormalizedError::Busy => 503,
            NormalizedError::Unavailable => 503,
            NormalizedError::Timeout => 503,
            NormalizedError::Internal => 500,
        }
    }
}

impl std::fmt::Display for NormalizedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize an adapter error per the prefix table in spec §4.1.
///
/// Cancellation/deadline handling is split: a cancellation caused by the
/// remote end not responding normalizes to `UNAVAILABLE`; a local deadline
/// firing normalizes to `TIMEOUT`. Both map to HTTP 503 — only the audit
/// record distinguishes them.
pub fn normalize(err: &AdapterError) -> NormalizedError {
    match err {
        AdapterError::Cancelled => NormalizedError::Unavailable,
        AdapterError::DeadlineExceeded => NormalizedError::Timeout,
        AdapterError::Vendor(_) => match err.token() {
            Some("INVALID_RANGE") | Some("OUT_OF_RANGE") | Some("INVALID_PARAMETER") => {
                NormalizedError::InvalidRange
            }
            Some("BUSY") | Some("RETRY") | Some("RATE_LIMIT") => NormalizedError::Busy,
            Some("UNAVAILABLE") | Some("OFFLINE") | Some("NOT_READY") => {
                NormalizedError::Unavailable
            }
            Some("INTERNAL") | Some("UNKNOWN") | Some("ERROR") => NormalizedError::Internal,
            _ => NormalizedError::Internal,
        },
    }
}
