//! Dispatchable requests and the normalized call outcome.

use serde_json::Value;

use crate::capability::Capabilities;
use crate::error::{AdapterError, BackendError};

/// A data-fetching call that can travel through the adapter's dispatch path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    BestBlockHeight,
    Status,
    AddressSummary { address: String },
    TransactionById { txid: String },
    Utxo { address: String },
    SendRawTransaction { rawtx: String, instant_send: bool },
}

impl Request {
    /// Capability the backend must declare to serve this request.
    pub fn capability(&self) -> Capabilities {
        match self {
            Self::BestBlockHeight => Capabilities::GET_BEST_BLOCK_HEIGHT,
            Self::Status => Capabilities::GET_STATUS,
            Self::AddressSummary { .. } => Capabilities::GET_ADDRESS_SUMMARY,
            Self::TransactionById { .. } => Capabilities::GET_TRANSACTION_BY_ID,
            Self::Utxo { .. } => Capabilities::GET_UTXO,
            Self::SendRawTransaction { .. } => Capabilities::SEND_RAW_TRANSACTION,
        }
    }

    /// Method name, e.g. `"getTransactionById"`.
    pub fn method(&self) -> &'static str {
        self.capability().method_name().unwrap_or("unknown")
    }

    /// Build a request for `capability` from positional JSON params.
    pub fn from_params(capability: Capabilities, params: Vec<Value>) -> Result<Self, AdapterError> {
        let method = capability.method_name().unwrap_or("unknown");
        let invalid = |reason: &str| AdapterError::InvalidParams {
            method: method.to_string(),
            reason: reason.to_string(),
        };
        let mut params = params.into_iter();
        let mut string_param = |what: &str| -> Result<String, AdapterError> {
            match params.next() {
                Some(Value::String(s)) => Ok(s),
                Some(_) => Err(invalid(&format!("{what} must be a string"))),
                None => Err(invalid(&format!("missing {what}"))),
            }
        };

        let request = if capability == Capabilities::GET_BEST_BLOCK_HEIGHT {
            Self::BestBlockHeight
        } else if capability == Capabilities::GET_STATUS {
            Self::Status
        } else if capability == Capabilities::GET_ADDRESS_SUMMARY {
            Self::AddressSummary {
                address: string_param("address")?,
            }
        } else if capability == Capabilities::GET_TRANSACTION_BY_ID {
            Self::TransactionById {
                txid: string_param("txid")?,
            }
        } else if capability == Capabilities::GET_UTXO {
            Self::Utxo {
                address: string_param("address")?,
            }
        } else if capability == Capabilities::SEND_RAW_TRANSACTION {
            let rawtx = string_param("rawtx")?;
            let instant_send = match params.next() {
                None | Some(Value::Null) => false,
                Some(Value::Bool(b)) => b,
                Some(_) => return Err(invalid("isInstantSend must be a boolean")),
            };
            Self::SendRawTransaction {
                rawtx,
                instant_send,
            }
        } else {
            return Err(invalid("operation cannot be dispatched with JSON params"));
        };
        Ok(request)
    }
}

/// Normalized result of a call through the adapter.
///
/// Every call resolves to exactly one of these three shapes; hard failures
/// (bad input, unrecognized backend errors) are returned as
/// [`AdapterError`] instead.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The backend's raw response.
    Data(Value),
    /// Nothing was fetched: adapter unusable, operation unsupported, or the
    /// backend rejected without an error.
    Unavailable,
    /// A classified backend failure.
    Failed(BackendError),
}

impl Outcome {
    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data(_))
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Borrow the response value, if any.
    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Data(v) => Some(v),
            _ => None,
        }
    }

    /// Take the response value, if any.
    pub fn into_data(self) -> Option<Value> {
        match self {
            Self::Data(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow the classified failure, if any.
    pub fn failure(&self) -> Option<&BackendError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Apply `f` to the response value, leaving other shapes untouched.
    pub fn map_data(self, f: impl FnOnce(Value) -> Value) -> Self {
        match self {
            Self::Data(v) => Self::Data(f(v)),
            other => other,
        }
    }
}
