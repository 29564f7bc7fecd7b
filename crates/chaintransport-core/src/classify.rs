//! Backend failure classification.
//!
//! Priority order:
//! ```text
//! Empty              → NoFailure
//! Io { code }        → Unreachable   (ECONNREFUSED, ETIMEDOUT, any other code)
//! Response 429 + "Rate limit exceeded" → Unreachable
//! Response (other)   → Rejected
//! anything else      → Unrecognized  (re-raised to the caller)
//! ```

use crate::error::{BackendError, ErrorCode};

/// Message a rate-limited backend answers with alongside status 429.
pub const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded";

/// HTTP status used for rate limiting.
pub const RATE_LIMIT_STATUS: u16 = 429;

/// What the adapter should do with a backend failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Rejected without an error object; nothing to report.
    NoFailure,
    /// The backend cannot be reached; mark the adapter unconnectable.
    Unreachable { reason: String },
    /// The backend rejected this particular call; log and return it.
    Rejected,
    /// Unknown error shape; must not be absorbed.
    Unrecognized,
}

/// Classify a backend error by its shape.
pub fn classify(err: &BackendError) -> Verdict {
    match err {
        BackendError::Empty => Verdict::NoFailure,
        BackendError::Io { code, message } => Verdict::Unreachable {
            reason: match code {
                ErrorCode::ConnectionRefused => "Connection refused.".to_string(),
                ErrorCode::TimedOut => format!("Timeout : {message}"),
                ErrorCode::Other(code) => format!("{code} - {message}"),
            },
        },
        BackendError::Response {
            status, message, ..
        } if *status == RATE_LIMIT_STATUS && message == RATE_LIMIT_MESSAGE => {
            Verdict::Unreachable {
                reason: RATE_LIMIT_MESSAGE.to_string(),
            }
        }
        BackendError::Response { .. } => Verdict::Rejected,
        BackendError::Rpc { .. } | BackendError::Unsupported(_) | BackendError::Other(_) => {
            Verdict::Unrecognized
        }
    }
}
