//! The `Transporter` adapter.
//!
//! ```text
//! caller → domain operation → call() → capability check → backend
//!                                                         ↓ Err
//!                       Outcome ← handle_error() ← classify()
//! ```

use std::sync::Arc;

use serde_json::Value;

use crate::backend::{EventSender, TransportBackend};
use crate::capability::Capabilities;
use crate::classify::{classify, Verdict};
use crate::error::{AdapterError, BackendError};
use crate::health::{ConnectionHealth, ConnectionState};
use crate::registry::{BackendRegistry, DEFAULT_BACKEND};
use crate::request::{Outcome, Request};
use crate::validate::{AddressValidator, SyntaxValidator};

/// How the adapter obtains its backend.
#[derive(Clone, Default)]
pub enum TransportArg {
    /// Use [`DEFAULT_BACKEND`] from the registry.
    #[default]
    Default,
    /// A registered backend name, matched case-insensitively.
    Named(String),
    /// An already constructed backend, shape-checked at construction.
    Backend(Arc<dyn TransportBackend>),
}

impl TransportArg {
    /// Wrap a concrete backend.
    pub fn backend(backend: impl TransportBackend) -> Self {
        Self::Backend(Arc::new(backend))
    }
}

impl From<&str> for TransportArg {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for TransportArg {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl From<Arc<dyn TransportBackend>> for TransportArg {
    fn from(backend: Arc<dyn TransportBackend>) -> Self {
        Self::Backend(backend)
    }
}

impl<T: Into<TransportArg>> From<Option<T>> for TransportArg {
    fn from(arg: Option<T>) -> Self {
        arg.map(Into::into).unwrap_or_default()
    }
}

impl std::fmt::Debug for TransportArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => write!(f, "Default"),
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Backend(b) => f.debug_tuple("Backend").field(&b.kind()).finish(),
        }
    }
}

/// Adapter between application code and a pluggable blockchain-data backend.
///
/// Validity is decided once at construction. Connectivity starts as
/// `Connectable` and flips to `Unconnectable` on the first connection-class
/// or rate-limit failure; from then on every dispatched call resolves to
/// [`Outcome::Unavailable`] without touching the backend.
///
/// `Transporter` is `Send + Sync`; share it as `Arc<Transporter>`.
pub struct Transporter {
    is_valid: bool,
    kind: Option<String>,
    backend: Option<Arc<dyn TransportBackend>>,
    health: ConnectionHealth,
    diagnostics: Vec<String>,
    validator: Arc<dyn AddressValidator>,
}

impl Transporter {
    /// Build an adapter with the default [`SyntaxValidator`].
    pub fn new(arg: impl Into<TransportArg>, registry: &BackendRegistry) -> Self {
        Self::with_validator(arg, registry, Arc::new(SyntaxValidator))
    }

    /// Build an adapter with a custom input validator.
    ///
    /// Never fails: an unknown name, a registered backend that cannot be
    /// built, or a backend lacking a required capability yields an invalid
    /// adapter.
    pub fn with_validator(
        arg: impl Into<TransportArg>,
        registry: &BackendRegistry,
        validator: Arc<dyn AddressValidator>,
    ) -> Self {
        let mut transporter = Self {
            is_valid: false,
            kind: None,
            backend: None,
            health: ConnectionHealth::new(),
            diagnostics: Vec::new(),
            validator,
        };

        let backend = match arg.into() {
            TransportArg::Default => transporter.build_registered(registry, DEFAULT_BACKEND),
            TransportArg::Named(name) => transporter.build_registered(registry, &name),
            TransportArg::Backend(backend) => {
                for key in backend.capabilities().missing_required() {
                    tracing::error!("Invalid Transporter. Expected key :{key}");
                    transporter
                        .diagnostics
                        .push(format!("Invalid Transporter. Expected key :{key}"));
                }
                Some(backend)
            }
        };

        if let Some(backend) = backend {
            transporter.is_valid = transporter.diagnostics.is_empty();
            transporter.kind = Some(backend.kind().to_string());
            tracing::debug!(
                kind = backend.kind(),
                valid = transporter.is_valid,
                capabilities = %backend.capabilities(),
                "Transporter - backend attached"
            );
            transporter.backend = Some(backend);
        }
        transporter
    }

    fn build_registered(
        &self,
        registry: &BackendRegistry,
        name: &str,
    ) -> Option<Arc<dyn TransportBackend>> {
        match registry.build(name) {
            Some(Ok(backend)) => Some(backend),
            Some(Err(e)) => {
                tracing::error!(name, error = %e, "Transporter - failed to construct backend");
                None
            }
            None => {
                tracing::warn!(name, "Transporter - unknown transport name");
                None
            }
        }
    }

    /// `true` iff the backend exposes every required capability.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// `true` until a connectivity-class failure has been observed.
    pub fn can_connect(&self) -> bool {
        self.health.is_connectable()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.health.state()
    }

    pub fn health(&self) -> &ConnectionHealth {
        &self.health
    }

    /// Reason recorded when the adapter became unconnectable.
    pub fn unreachable_reason(&self) -> Option<String> {
        self.health.reason()
    }

    /// Backend name for diagnostics; `None` when no backend was attached.
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn backend(&self) -> Option<&Arc<dyn TransportBackend>> {
        self.backend.as_ref()
    }

    /// One entry per required capability the backend was missing.
    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    /// Explicitly return to `Connectable`. Never called automatically.
    pub fn reset_connectivity(&self) -> bool {
        self.health.reset()
    }

    /// Returns `true` if the backend declares `capability`.
    pub fn has_support_for(&self, capability: Capabilities) -> bool {
        self.backend
            .as_ref()
            .is_some_and(|b| b.capabilities().contains(capability))
    }

    fn usable_backend(&self) -> Option<&Arc<dyn TransportBackend>> {
        if !self.is_valid || !self.health.is_connectable() {
            return None;
        }
        self.backend.as_ref()
    }

    /// Dispatch a call by method name with positional JSON params.
    ///
    /// An empty method name is a hard error. Unknown or unsupported methods
    /// resolve to [`Outcome::Unavailable`].
    pub async fn dispatch(&self, method: &str, params: Vec<Value>) -> Result<Outcome, AdapterError> {
        if self.usable_backend().is_none() {
            return Ok(Outcome::Unavailable);
        }
        if method.is_empty() {
            return Err(AdapterError::InvalidMethod(method.to_string()));
        }
        let Some(capability) = Capabilities::from_method(method) else {
            tracing::debug!(method, "Transporter - unknown method");
            return Ok(Outcome::Unavailable);
        };
        if !self.has_support_for(capability) {
            return Ok(Outcome::Unavailable);
        }
        let request = Request::from_params(capability, params)?;
        self.call(request).await
    }

    /// Send a typed request through the gated dispatch path.
    pub async fn call(&self, request: Request) -> Result<Outcome, AdapterError> {
        let Some(backend) = self.usable_backend() else {
            return Ok(Outcome::Unavailable);
        };
        if !backend.capabilities().contains(request.capability()) {
            tracing::debug!(method = request.method(), "Transporter - unsupported method");
            return Ok(Outcome::Unavailable);
        }
        match execute(backend.as_ref(), request).await {
            Ok(value) => Ok(Outcome::Data(value)),
            Err(err) => self.handle_error(err),
        }
    }

    /// Classify a backend failure and update connectivity accordingly.
    pub(crate) fn handle_error(&self, err: BackendError) -> Result<Outcome, AdapterError> {
        match classify(&err) {
            Verdict::NoFailure => Ok(Outcome::Unavailable),
            Verdict::Unreachable { reason } => {
                self.health.mark_unconnectable(reason);
                Ok(Outcome::Failed(err))
            }
            Verdict::Rejected => {
                if let BackendError::Response { status, body, .. } = &err {
                    tracing::error!(status, body = %body, "Transporter - backend rejected call");
                }
                Ok(Outcome::Failed(err))
            }
            Verdict::Unrecognized => Err(AdapterError::Unhandled(err)),
        }
    }

    pub async fn get_best_block_height(&self) -> Result<Outcome, AdapterError> {
        self.call(Request::BestBlockHeight).await
    }

    pub async fn get_status(&self) -> Result<Outcome, AdapterError> {
        self.call(Request::Status).await
    }

    pub async fn get_address_summary(&self, address: &str) -> Result<Outcome, AdapterError> {
        self.check_address(address)?;
        self.call(Request::AddressSummary {
            address: address.to_string(),
        })
        .await
    }

    /// Fetch a transaction by id. The `confirmations` field is stripped from
    /// the response; a `null` response counts as no data.
    pub async fn get_transaction(&self, txid: &str) -> Result<Outcome, AdapterError> {
        if !self.validator.is_valid_txid(txid) {
            return Err(AdapterError::InvalidTxid(txid.to_string()));
        }
        let outcome = self
            .call(Request::TransactionById {
                txid: txid.to_string(),
            })
            .await?;
        Ok(match outcome {
            Outcome::Data(Value::Null) => Outcome::Unavailable,
            other => other.map_data(strip_confirmations),
        })
    }

    pub async fn get_utxo(&self, address: &str) -> Result<Outcome, AdapterError> {
        self.check_address(address)?;
        self.call(Request::Utxo {
            address: address.to_string(),
        })
        .await
    }

    /// Submit a raw transaction.
    ///
    /// Unlike every other operation this goes straight to the backend: it is
    /// not gated on validity, connectivity or the declared capability set.
    /// The payload is passed through as is; format checks are the backend's.
    /// Failures are still classified.
    pub async fn send_raw_transaction(
        &self,
        rawtx: &str,
        instant_send: bool,
    ) -> Result<Outcome, AdapterError> {
        let Some(backend) = self.backend.as_ref() else {
            return Ok(Outcome::Unavailable);
        };
        match backend.send_raw_transaction(rawtx, instant_send).await {
            Ok(value) => Ok(Outcome::Data(value)),
            Err(err) => self.handle_error(err),
        }
    }

    /// Subscribe to activity on `addresses`; events are pushed into `events`.
    pub async fn subscribe_to_addresses(
        &self,
        addresses: Vec<String>,
        events: EventSender,
    ) -> Result<Outcome, AdapterError> {
        if addresses.is_empty() || !self.has_support_for(Capabilities::SUBSCRIBE_TO_ADDRESSES) {
            return Ok(Outcome::Unavailable);
        }
        let Some(backend) = self.backend.as_ref() else {
            return Ok(Outcome::Unavailable);
        };
        match backend.subscribe_to_addresses(addresses, events).await {
            Ok(value) => Ok(Outcome::Data(value)),
            Err(err) => self.handle_error(err),
        }
    }

    /// Subscribe to a named backend event; events are pushed into `events`.
    pub async fn subscribe_to_event(
        &self,
        event: &str,
        events: EventSender,
    ) -> Result<Outcome, AdapterError> {
        if !self.has_support_for(Capabilities::SUBSCRIBE_TO_EVENT) {
            return Ok(Outcome::Unavailable);
        }
        let Some(backend) = self.backend.as_ref() else {
            return Ok(Outcome::Unavailable);
        };
        match backend.subscribe_to_event(event, events).await {
            Ok(value) => Ok(Outcome::Data(value)),
            Err(err) => self.handle_error(err),
        }
    }

    /// Close the backend's socket if it has one.
    pub async fn disconnect(&self) -> Result<Outcome, AdapterError> {
        if !self.has_support_for(Capabilities::CLOSE_SOCKET) {
            return Ok(Outcome::Unavailable);
        }
        let Some(backend) = self.backend.as_ref() else {
            return Ok(Outcome::Unavailable);
        };
        match backend.close_socket().await {
            Ok(value) => Ok(Outcome::Data(value)),
            Err(err) => self.handle_error(err),
        }
    }

    /// The backend's declared network, else whatever its `get_network`
    /// capability reports, else `None`.
    pub fn get_network(&self) -> Option<String> {
        let backend = self.backend.as_ref()?;
        if let Some(network) = backend.network() {
            return Some(network.to_string());
        }
        if backend.capabilities().contains(Capabilities::GET_NETWORK) {
            return backend.get_network();
        }
        None
    }

    fn check_address(&self, address: &str) -> Result<(), AdapterError> {
        if self.validator.is_valid_address(address) {
            Ok(())
        } else {
            Err(AdapterError::InvalidAddress(address.to_string()))
        }
    }
}

impl std::fmt::Debug for Transporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transporter")
            .field("is_valid", &self.is_valid)
            .field("kind", &self.kind)
            .field("health", &self.health)
            .finish()
    }
}

async fn execute(backend: &dyn TransportBackend, request: Request) -> Result<Value, BackendError> {
    match request {
        Request::BestBlockHeight => backend.get_best_block_height().await,
        Request::Status => backend.get_status().await,
        Request::AddressSummary { address } => backend.get_address_summary(&address).await,
        Request::TransactionById { txid } => backend.get_transaction_by_id(&txid).await,
        Request::Utxo { address } => backend.get_utxo(&address).await,
        Request::SendRawTransaction {
            rawtx,
            instant_send,
        } => backend.send_raw_transaction(&rawtx, instant_send).await,
    }
}

fn strip_confirmations(mut value: Value) -> Value {
    if let Value::Object(map) = &mut value {
        map.remove("confirmations");
    }
    value
}
