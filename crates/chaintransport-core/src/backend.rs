//! The `TransportBackend` trait — the capability contract every backend implements.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::capability::Capabilities;
use crate::error::BackendError;

/// Channel the caller hands to a subscription; the backend pushes events into it.
pub type EventSender = mpsc::UnboundedSender<Value>;

/// A blockchain-data backend.
///
/// The four required operations (`get_address_summary`,
/// `get_transaction_by_id`, `get_utxo`, `send_raw_transaction`) must be
/// implemented and declared in [`capabilities`](Self::capabilities) for the
/// backend to be valid. Every other operation is optional: its default
/// returns [`BackendError::Unsupported`] and it is only called when the
/// matching capability is declared.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` for use across Tokio tasks.
///
/// # Object Safety
/// The trait is object-safe and is stored as `Arc<dyn TransportBackend>`.
#[async_trait]
pub trait TransportBackend: Send + Sync + 'static {
    /// Operations this backend exposes.
    fn capabilities(&self) -> Capabilities;

    /// Name used in diagnostics. Defaults to the concrete type name.
    fn kind(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }

    async fn get_address_summary(&self, address: &str) -> Result<Value, BackendError>;

    async fn get_transaction_by_id(&self, txid: &str) -> Result<Value, BackendError>;

    async fn get_utxo(&self, address: &str) -> Result<Value, BackendError>;

    async fn send_raw_transaction(
        &self,
        rawtx: &str,
        instant_send: bool,
    ) -> Result<Value, BackendError>;

    async fn get_best_block_height(&self) -> Result<Value, BackendError> {
        Err(BackendError::Unsupported(Capabilities::GET_BEST_BLOCK_HEIGHT))
    }

    async fn get_status(&self) -> Result<Value, BackendError> {
        Err(BackendError::Unsupported(Capabilities::GET_STATUS))
    }

    async fn subscribe_to_addresses(
        &self,
        _addresses: Vec<String>,
        _events: EventSender,
    ) -> Result<Value, BackendError> {
        Err(BackendError::Unsupported(Capabilities::SUBSCRIBE_TO_ADDRESSES))
    }

    async fn subscribe_to_event(
        &self,
        _event: &str,
        _events: EventSender,
    ) -> Result<Value, BackendError> {
        Err(BackendError::Unsupported(Capabilities::SUBSCRIBE_TO_EVENT))
    }

    /// Release the backend's socket resources.
    async fn close_socket(&self) -> Result<Value, BackendError> {
        Err(BackendError::Unsupported(Capabilities::CLOSE_SOCKET))
    }

    /// Network the backend is statically bound to, if any.
    fn network(&self) -> Option<&str> {
        None
    }

    /// Ask the backend which network it serves.
    /// Only called when [`Capabilities::GET_NETWORK`] is declared.
    fn get_network(&self) -> Option<String> {
        None
    }
}

/// `"my_crate::module::Backend<T>"` → `"Backend"`.
fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bare;

    #[async_trait]
    impl TransportBackend for Bare {
        fn capabilities(&self) -> Capabilities {
            Capabilities::REQUIRED
        }
        async fn get_address_summary(&self, _: &str) -> Result<Value, BackendError> {
            Ok(Value::Null)
        }
        async fn get_transaction_by_id(&self, _: &str) -> Result<Value, BackendError> {
            Ok(Value::Null)
        }
        async fn get_utxo(&self, _: &str) -> Result<Value, BackendError> {
            Ok(Value::Null)
        }
        async fn send_raw_transaction(&self, _: &str, _: bool) -> Result<Value, BackendError> {
            Ok(Value::Null)
        }
    }

    #[test]
    fn short_type_name_strips_path_and_generics() {
        assert_eq!(short_type_name("a::b::DapiClient"), "DapiClient");
        assert_eq!(short_type_name("a::Wrapper<b::Inner>"), "Wrapper");
        assert_eq!(short_type_name("Plain"), "Plain");
    }

    #[test]
    fn kind_defaults_to_type_name() {
        assert_eq!(Bare.kind(), "Bare");
        let dynamic: &dyn TransportBackend = &Bare;
        assert_eq!(dynamic.kind(), "Bare");
    }

    #[tokio::test]
    async fn optional_operations_default_to_unsupported() {
        let err = Bare.get_status().await.unwrap_err();
        assert!(matches!(
            err,
            BackendError::Unsupported(c) if c == Capabilities::GET_STATUS
        ));
        assert!(Bare.network().is_none());
        assert!(Bare.get_network().is_none());
    }
}
