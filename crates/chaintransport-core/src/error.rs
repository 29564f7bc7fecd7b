//! Error types for backends and for the adapter.

use serde_json::Value;
use thiserror::Error;

use crate::capability::Capabilities;

/// Low-level connection error code carried by [`BackendError::Io`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    /// `ECONNREFUSED`
    ConnectionRefused,
    /// `ETIMEDOUT`
    TimedOut,
    /// Any other code, e.g. `ECONNRESET` or `ENOTFOUND`.
    Other(String),
}

impl ErrorCode {
    /// Parse a POSIX-style code string.
    pub fn parse(code: &str) -> Self {
        match code {
            "ECONNREFUSED" => Self::ConnectionRefused,
            "ETIMEDOUT" => Self::TimedOut,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::ConnectionRefused => "ECONNREFUSED",
            Self::TimedOut => "ETIMEDOUT",
            Self::Other(code) => code,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors a backend reports for a single call.
///
/// The variant is the error's *shape*; the adapter's classifier decides from
/// the shape alone whether the failure is a connectivity problem, a rejected
/// call, or something it refuses to absorb.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// Network-level failure with a connection error code.
    #[error("{code} - {message}")]
    Io { code: ErrorCode, message: String },

    /// The backend answered with a structured error payload.
    #[error("HTTP {status}: {message}")]
    Response {
        status: u16,
        message: String,
        body: Value,
    },

    /// JSON-RPC protocol-level error returned by the node.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The call was rejected without any error information.
    #[error("call rejected without an error")]
    Empty,

    /// The backend does not implement the requested operation.
    #[error("operation not supported: {0}")]
    Unsupported(Capabilities),

    /// An unexpected error.
    #[error("{0}")]
    Other(String),
}

impl BackendError {
    /// Shorthand for an [`Io`](Self::Io) error.
    pub fn io(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Io {
            code,
            message: message.into(),
        }
    }

    /// Shorthand for a [`Response`](Self::Response) error with the standard
    /// `{status, error}` body.
    pub fn response(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        let body = serde_json::json!({ "status": status, "error": message });
        Self::Response {
            status,
            message,
            body,
        }
    }

    /// Returns `true` for connection-level failures.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

/// Hard failures returned to the adapter's caller.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Empty method name passed to dispatch.
    #[error("Invalid method: {0:?}")]
    InvalidMethod(String),

    /// Parameters do not match what the method expects.
    #[error("Invalid params for {method}: {reason}")]
    InvalidParams { method: String, reason: String },

    #[error("Received an invalid address to fetch: {0}")]
    InvalidAddress(String),

    #[error("Received an invalid txid to fetch: {0}")]
    InvalidTxid(String),

    /// A backend error of a shape the classifier does not absorb.
    #[error("Unhandled backend error: {0}")]
    Unhandled(#[source] BackendError),
}
