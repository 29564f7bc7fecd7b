//! chaintransport-dapi — DAPI JSON-RPC backend for chaintransport.
//!
//! # Quick start
//! ```rust,no_run
//! use chaintransport_core::Transporter;
//! use chaintransport_dapi::default_registry;
//!
//! // Built-in seed, 20s timeout, 5 retries.
//! let transporter = Transporter::new("dapi", &default_registry());
//! assert!(transporter.is_valid());
//! ```

pub mod client;
pub mod config;
pub mod retry;
pub mod rpc;

use std::sync::Arc;

use chaintransport_core::{BackendRegistry, TransportBackend, DEFAULT_BACKEND};

pub use client::DapiClient;
pub use config::{DapiConfig, SeedEndpoint, DEFAULT_SEED};
pub use retry::RetryPolicy;

/// Registry with the DAPI backend registered under `"dapi"`, built from `config`.
pub fn registry(config: DapiConfig) -> BackendRegistry {
    let mut registry = BackendRegistry::new();
    registry.register(DEFAULT_BACKEND, move || {
        let client = DapiClient::new(config.clone())?;
        Ok(Arc::new(client) as Arc<dyn TransportBackend>)
    });
    registry
}

/// [`registry`] with [`DapiConfig::default`].
pub fn default_registry() -> BackendRegistry {
    registry(DapiConfig::default())
}
