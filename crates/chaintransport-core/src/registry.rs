//! Named backend factories.
//!
//! Registered names are trusted: a backend built from the registry is not
//! shape-checked by the adapter.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::backend::TransportBackend;
use crate::error::BackendError;

/// Canonical backend used when the adapter is built without an argument.
pub const DEFAULT_BACKEND: &str = "dapi";

/// Builds a fresh backend instance.
pub type BackendFactory =
    Arc<dyn Fn() -> Result<Arc<dyn TransportBackend>, BackendError> + Send + Sync>;

/// Case-insensitive map of backend name → factory.
#[derive(Clone, Default)]
pub struct BackendRegistry {
    factories: BTreeMap<String, BackendFactory>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: &str, factory: F) -> &mut Self
    where
        F: Fn() -> Result<Arc<dyn TransportBackend>, BackendError> + Send + Sync + 'static,
    {
        self.factories
            .insert(name.to_lowercase(), Arc::new(factory));
        self
    }

    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&name.to_lowercase())
    }

    /// Build the backend registered under `name`.
    ///
    /// Returns `None` if the name is not registered.
    pub fn build(&self, name: &str) -> Option<Result<Arc<dyn TransportBackend>, BackendError>> {
        self.factories.get(&name.to_lowercase()).map(|f| f())
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Capabilities;
    use async_trait::async_trait;
    use serde_json::Value;

    struct Dummy;

    #[async_trait]
    impl TransportBackend for Dummy {
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
    fn lookup_is_case_insensitive() {
        let mut reg = BackendRegistry::new();
        reg.register("Dummy", || Ok(Arc::new(Dummy)));
        assert!(reg.contains("dummy"));
        assert!(reg.contains("DUMMY"));
        assert!(!reg.contains("other"));
        assert_eq!(reg.build("dUmMy").unwrap().unwrap().kind(), "Dummy");
        assert!(reg.build("other").is_none());
    }

    #[test]
    fn failing_factory_surfaces_its_error() {
        let mut reg = BackendRegistry::new();
        reg.register("broken", || Err(BackendError::Other("no seeds configured".into())));
        let err = reg.build("broken").unwrap().err().unwrap();
        assert_eq!(err.to_string(), "no seeds configured");
    }

    #[test]
    fn names_are_sorted() {
        let mut reg = BackendRegistry::new();
        reg.register("zeta", || Ok(Arc::new(Dummy)))
            .register("alpha", || Ok(Arc::new(Dummy)));
        assert_eq!(reg.names(), vec!["alpha", "zeta"]);
        assert_eq!(reg.len(), 2);
        assert!(!reg.is_empty());
    }
}
