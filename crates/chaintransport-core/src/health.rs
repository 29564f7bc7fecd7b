//! Two-state connection health: Connectable → Unconnectable.
//!
//! The transition is one-way for the life of the adapter unless the caller
//! explicitly resets it. Marking an already unconnectable backend again is a
//! no-op, so concurrent failures log a single transition.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Connection state of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Calls are forwarded to the backend.
    Connectable,
    /// The backend is known to be down; calls short-circuit.
    Unconnectable,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connectable => write!(f, "connectable"),
            Self::Unconnectable => write!(f, "unconnectable"),
        }
    }
}

struct HealthInner {
    state: ConnectionState,
    reason: Option<String>,
    transitions: u32,
}

/// Thread-safe connection health tracker.
pub struct ConnectionHealth {
    inner: Mutex<HealthInner>,
}

impl ConnectionHealth {
    /// Create a tracker in `Connectable` state.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HealthInner {
                state: ConnectionState::Connectable,
                reason: None,
                transitions: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HealthInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> ConnectionState {
        self.lock().state
    }

    pub fn is_connectable(&self) -> bool {
        self.state() == ConnectionState::Connectable
    }

    /// Reason recorded by the last transition to `Unconnectable`.
    pub fn reason(&self) -> Option<String> {
        self.lock().reason.clone()
    }

    /// Number of Connectable → Unconnectable transitions so far.
    pub fn transitions(&self) -> u32 {
        self.lock().transitions
    }

    /// Move to `Unconnectable`.
    ///
    /// Returns `true` if this call performed the transition, `false` if the
    /// backend was already marked unconnectable.
    pub fn mark_unconnectable(&self, reason: impl Into<String>) -> bool {
        let mut inner = self.lock();
        if inner.state == ConnectionState::Unconnectable {
            return false;
        }
        let reason = reason.into();
        tracing::error!(reason = %reason, "Transporter - Unable to connect");
        inner.state = ConnectionState::Unconnectable;
        inner.reason = Some(reason);
        inner.transitions += 1;
        true
    }

    /// Return to `Connectable`. Returns `true` if the state changed.
    pub fn reset(&self) -> bool {
        let mut inner = self.lock();
        if inner.state == ConnectionState::Connectable {
            return false;
        }
        inner.state = ConnectionState::Connectable;
        inner.reason = None;
        tracing::info!("Transporter - connectivity reset");
        true
    }
}

impl Default for ConnectionHealth {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("ConnectionHealth")
            .field("state", &inner.state)
            .field("reason", &inner.reason)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_connectable() {
        let h = ConnectionHealth::new();
        assert_eq!(h.state(), ConnectionState::Connectable);
        assert!(h.reason().is_none());
        assert_eq!(h.transitions(), 0);
    }

    #[test]
    fn mark_transitions_once() {
        let h = ConnectionHealth::new();
        assert!(h.mark_unconnectable("Connection refused."));
        assert!(!h.mark_unconnectable("Timeout : x"));
        assert!(!h.is_connectable());
        assert_eq!(h.transitions(), 1);
        // First reason wins.
        assert_eq!(h.reason().as_deref(), Some("Connection refused."));
    }

    #[test]
    fn reset_returns_to_connectable() {
        let h = ConnectionHealth::new();
        assert!(!h.reset());
        h.mark_unconnectable("Rate limit exceeded");
        assert!(h.reset());
        assert!(h.is_connectable());
        assert!(h.reason().is_none());

        assert!(h.mark_unconnectable("again"));
        assert_eq!(h.transitions(), 2);
    }

    #[test]
    fn concurrent_marks_transition_once() {
        let h = std::sync::Arc::new(ConnectionHealth::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let h = h.clone();
                std::thread::spawn(move || h.mark_unconnectable(format!("worker {i}")))
            })
            .collect();
        let won = handles
            .into_iter()
            .map(|t| t.join().unwrap())
            .filter(|w| *w)
            .count();
        assert_eq!(won, 1);
        assert_eq!(h.transitions(), 1);
    }
}
