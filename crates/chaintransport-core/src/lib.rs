//! chaintransport-core — backend-agnostic transport adapter.
//!
//! # Overview
//!
//! The core crate sits between application code and a pluggable
//! blockchain-data backend. It defines:
//!
//! - [`TransportBackend`] — the async capability contract every backend implements
//! - [`Capabilities`] — the set of operations a backend declares
//! - [`Transporter`] — the adapter: validation, dispatch, connection health
//! - [`BackendError`] / [`AdapterError`] — structured error types
//! - [`Outcome`] — the normalized result of every call
//! - [`classify`] module — the failure classification policy
//! - [`BackendRegistry`] — named backend factories
//! - [`AddressValidator`] — injected address/txid validation
//!
//! # Quick start
//! ```rust,no_run
//! use chaintransport_core::{BackendRegistry, Transporter};
//!
//! # async fn run(registry: BackendRegistry) -> Result<(), chaintransport_core::AdapterError> {
//! let transporter = Transporter::new("dapi", &registry);
//! let height = transporter.get_best_block_height().await?;
//! println!("{:?}", height.data());
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod capability;
pub mod classify;
pub mod error;
pub mod health;
pub mod registry;
pub mod request;
pub mod transporter;
pub mod validate;

pub use backend::{EventSender, TransportBackend};
pub use capability::Capabilities;
pub use classify::Verdict;
pub use error::{AdapterError, BackendError, ErrorCode};
pub use health::{ConnectionHealth, ConnectionState};
pub use registry::{BackendFactory, BackendRegistry, DEFAULT_BACKEND};
pub use request::{Outcome, Request};
pub use transporter::{TransportArg, Transporter};
pub use validate::{AddressValidator, SyntaxValidator};
