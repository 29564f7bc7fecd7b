//! DAPI JSON-RPC client backed by `reqwest`.
//!
//! Features:
//! - Round-robin over the configured seed nodes
//! - Bounded retry with exponential backoff, for connection failures only
//! - Error mapping into the shapes the adapter's classifier understands

use std::error::Error as _;
use std::io;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{json, Value};

use chaintransport_core::{BackendError, Capabilities, ErrorCode, TransportBackend};

use crate::config::{DapiConfig, SeedEndpoint};
use crate::retry::RetryPolicy;
use crate::rpc::{RpcRequest, RpcResponse};

/// DAPI client speaking JSON-RPC over HTTP to a set of seed nodes.
pub struct DapiClient {
    seeds: Vec<SeedEndpoint>,
    http: reqwest::Client,
    retry: RetryPolicy,
    network: Option<String>,
    cursor: AtomicUsize,
    req_id: AtomicU64,
}

impl DapiClient {
    /// Create a client for the configured seeds.
    pub fn new(config: DapiConfig) -> Result<Self, BackendError> {
        if config.seeds.is_empty() {
            return Err(BackendError::Other("no DAPI seeds configured".into()));
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BackendError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            seeds: config.seeds,
            http,
            retry: RetryPolicy::with_retries(config.retries),
            network: config.network,
            cursor: AtomicUsize::new(0),
            req_id: AtomicU64::new(1),
        })
    }

    /// Seeds this client rotates over.
    pub fn seeds(&self) -> &[SeedEndpoint] {
        &self.seeds
    }

    fn next_seed(&self) -> &SeedEndpoint {
        let idx = self.cursor.fetch_add(1, Ordering::Relaxed) % self.seeds.len();
        &self.seeds[idx]
    }

    async fn send_once(&self, url: &str, req: &RpcRequest) -> Result<Value, BackendError> {
        let resp = self
            .http
            .post(url)
            .json(req)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(response_error(status.as_u16(), &text));
        }

        let text = resp.text().await.map_err(map_reqwest_error)?;
        let rpc: RpcResponse = serde_json::from_str(&text)
            .map_err(|e| BackendError::Other(format!("malformed DAPI response: {e}")))?;
        rpc.into_result().map_err(|e| BackendError::Rpc {
            code: e.code,
            message: e.message,
        })
    }

    /// Call `method` with named `params`, retrying connection failures.
    pub async fn request(&self, method: &str, params: Value) -> Result<Value, BackendError> {
        let req = RpcRequest::new(self.req_id.fetch_add(1, Ordering::Relaxed), method, params);

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let url = self.next_seed().url();
            match self.send_once(&url, &req).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_connection_error() => match self.retry.next_delay(attempt) {
                    Some(delay) => {
                        tracing::warn!(
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            url = %url,
                            method,
                            "retrying DAPI request"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    None => {
                        tracing::error!(
                            attempt,
                            error = %e,
                            url = %url,
                            method,
                            "DAPI retries exhausted"
                        );
                        return Err(e);
                    }
                },
                Err(e) => return Err(e),
            }
        }
    }
}

impl std::fmt::Debug for DapiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DapiClient")
            .field("seeds", &self.seeds)
            .field("retries", &self.retry.max_retries)
            .field("network", &self.network)
            .finish()
    }
}

#[async_trait]
impl TransportBackend for DapiClient {
    fn capabilities(&self) -> Capabilities {
        Capabilities::REQUIRED | Capabilities::GET_BEST_BLOCK_HEIGHT | Capabilities::GET_STATUS
    }

    async fn get_address_summary(&self, address: &str) -> Result<Value, BackendError> {
        self.request("getAddressSummary", json!({ "address": address }))
            .await
    }

    async fn get_transaction_by_id(&self, txid: &str) -> Result<Value, BackendError> {
        self.request("getTransactionById", json!({ "txid": txid }))
            .await
    }

    async fn get_utxo(&self, address: &str) -> Result<Value, BackendError> {
        self.request("getUTXO", json!({ "address": address })).await
    }

    async fn send_raw_transaction(
        &self,
        rawtx: &str,
        instant_send: bool,
    ) -> Result<Value, BackendError> {
        self.request(
            "sendRawTransaction",
            json!({ "rawTransaction": rawtx, "isInstantSend": instant_send }),
        )
        .await
    }

    async fn get_best_block_height(&self) -> Result<Value, BackendError> {
        self.request("getBestBlockHeight", json!({})).await
    }

    async fn get_status(&self) -> Result<Value, BackendError> {
        self.request("getStatus", json!({})).await
    }

    fn network(&self) -> Option<&str> {
        self.network.as_deref()
    }
}

/// Build a [`BackendError::Response`] from a non-2xx reply.
///
/// DAPI error bodies look like `{"status": 429, "error": "Rate limit exceeded"}`;
/// anything else keeps the HTTP status and uses the raw text as the message.
fn response_error(http_status: u16, text: &str) -> BackendError {
    let body = serde_json::from_str::<Value>(text).unwrap_or_else(|_| Value::String(text.into()));
    let status = body
        .get("status")
        .and_then(Value::as_u64)
        .and_then(|s| u16::try_from(s).ok())
        .unwrap_or(http_status);
    let message = body
        .get("error")
        .or_else(|| body.get("message"))
        .and_then(Value::as_str)
        .unwrap_or(text)
        .to_string();
    BackendError::Response {
        status,
        message,
        body,
    }
}

fn map_reqwest_error(e: reqwest::Error) -> BackendError {
    if e.is_timeout() {
        return BackendError::io(ErrorCode::TimedOut, e.to_string());
    }
    if let Some(kind) = io_error_kind(&e) {
        return BackendError::io(error_code(kind), e.to_string());
    }
    if e.is_connect() {
        return BackendError::io(ErrorCode::Other("ECONNECT".into()), e.to_string());
    }
    BackendError::Other(e.to_string())
}

/// Walk the source chain looking for the underlying socket error.
fn io_error_kind(e: &reqwest::Error) -> Option<io::ErrorKind> {
    let mut source = e.source();
    while let Some(err) = source {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            return Some(io_err.kind());
        }
        source = err.source();
    }
    None
}

/// POSIX-style code for a socket error kind.
pub(crate) fn error_code(kind: io::ErrorKind) -> ErrorCode {
    let code = match kind {
        io::ErrorKind::ConnectionRefused => return ErrorCode::ConnectionRefused,
        io::ErrorKind::TimedOut => return ErrorCode::TimedOut,
        io::ErrorKind::ConnectionReset => "ECONNRESET",
        io::ErrorKind::ConnectionAborted => "ECONNABORTED",
        io::ErrorKind::NotConnected => "ENOTCONN",
        io::ErrorKind::AddrNotAvailable => "EADDRNOTAVAIL",
        io::ErrorKind::BrokenPipe => "EPIPE",
        io::ErrorKind::UnexpectedEof => "ECONNRESET",
        _ => "EIO",
    };
    ErrorCode::Other(code.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_seed_list_is_rejected() {
        let config = DapiConfig {
            seeds: vec![],
            ..DapiConfig::default()
        };
        let err = DapiClient::new(config).unwrap_err();
        assert!(err.to_string().contains("no DAPI seeds"));
    }

    #[test]
    fn seeds_rotate_round_robin() {
        let client = DapiClient::new(DapiConfig {
            seeds: vec![SeedEndpoint::new("a:1"), SeedEndpoint::new("b:2")],
            ..DapiConfig::default()
        })
        .unwrap();
        let picked: Vec<_> = (0..4).map(|_| client.next_seed().service.clone()).collect();
        assert_eq!(picked, ["a:1", "b:2", "a:1", "b:2"]);
    }

    #[test]
    fn rate_limit_body_is_parsed() {
        let err = response_error(429, r#"{"status":429,"error":"Rate limit exceeded"}"#);
        match err {
            BackendError::Response {
                status, message, ..
            } => {
                assert_eq!(status, 429);
                assert_eq!(message, "Rate limit exceeded");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn plain_text_body_keeps_http_status() {
        let err = response_error(502, "Bad Gateway");
        match err {
            BackendError::Response {
                status,
                message,
                body,
            } => {
                assert_eq!(status, 502);
                assert_eq!(message, "Bad Gateway");
                assert_eq!(body, Value::String("Bad Gateway".into()));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn socket_error_codes() {
        assert_eq!(
            error_code(io::ErrorKind::ConnectionRefused),
            ErrorCode::ConnectionRefused
        );
        assert_eq!(error_code(io::ErrorKind::TimedOut), ErrorCode::TimedOut);
        assert_eq!(
            error_code(io::ErrorKind::ConnectionReset),
            ErrorCode::Other("ECONNRESET".into())
        );
        assert_eq!(error_code(io::ErrorKind::Other), ErrorCode::Other("EIO".into()));
    }
}
