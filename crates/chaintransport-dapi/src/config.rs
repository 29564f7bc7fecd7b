//! DAPI backend configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Seed node used when no other seed is configured.
pub const DEFAULT_SEED: &str = "18.236.131.253:3000";

/// A DAPI seed node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedEndpoint {
    /// `host:port`, e.g. "18.236.131.253:3000"
    pub service: String,
}

impl SeedEndpoint {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// JSON-RPC endpoint URL for this seed.
    pub fn url(&self) -> String {
        if self.service.starts_with("http://") || self.service.starts_with("https://") {
            self.service.clone()
        } else {
            format!("http://{}", self.service)
        }
    }
}

/// Configuration for [`DapiClient`](crate::DapiClient).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DapiConfig {
    /// Seed nodes, used round-robin.
    #[serde(default = "default_seeds")]
    pub seeds: Vec<SeedEndpoint>,
    /// Per-request timeout.
    #[serde(default = "default_timeout", with = "millis")]
    pub timeout: Duration,
    /// Retry attempts on connection failures (not counting the first try).
    #[serde(default = "default_retries")]
    pub retries: u32,
    /// Network the seeds belong to ("testnet", "mainnet", ...), if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
}

fn default_seeds() -> Vec<SeedEndpoint> {
    vec![SeedEndpoint::new(DEFAULT_SEED)]
}
fn default_timeout() -> Duration { Duration::from_millis(20_000) }
fn default_retries() -> u32 { 5 }

impl Default for DapiConfig {
    fn default() -> Self {
        Self {
            seeds: default_seeds(),
            timeout: default_timeout(),
            retries: default_retries(),
            network: None,
        }
    }
}

impl DapiConfig {
    /// Config for a single seed with default timeout and retries.
    pub fn single_seed(service: impl Into<String>) -> Self {
        Self {
            seeds: vec![SeedEndpoint::new(service)],
            ..Self::default()
        }
    }
}

/// `Duration` as integer milliseconds (`"timeout": 20000`).
mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
