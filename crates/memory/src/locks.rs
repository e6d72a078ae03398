//! Per-session append gates.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A lazily populated map of session key → async mutex.
///
/// Two appends to the same session run one after the other; appends to
/// different sessions never wait on each other. Gates are created on first
/// use and kept for the life of the store.
#[derive(Debug, Default)]
pub struct SessionLocks {
    gates: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The gate for `key`, creating it if needed.
    pub fn gate(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut gates = self
            .gates
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        gates.entry(key.to_string()).or_default().clone()
    }

    /// Number of gates created so far.
    pub fn len(&self) -> usize {
        self.gates
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
