//! Registry of open connection spies.
//!
//! Each connection spy registers on creation and unregisters when closed or
//! dropped. The connection log target dumps the registry on every open/close,
//! which makes leaked connections easy to spot.

use std::collections::BTreeSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

// Process-wide registry used unless a spy is given its own
static GLOBAL: Lazy<Arc<ConnectionRegistry>> = Lazy::new(|| Arc::new(ConnectionRegistry::new()));

#[derive(Debug, Default)]
struct RegistryState {
    next_number: u64,
    open: BTreeSet<u64>,
}

/// Tracks open connections by number. Numbers start at 1 and are never reused.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    state: Mutex<RegistryState>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL)
    }

    /// Register a new connection and return its number.
    pub fn register(&self) -> u64 {
        let mut state = self.state.lock();
        state.next_number += 1;
        let number = state.next_number;
        state.open.insert(number);
        number
    }

    /// Remove a connection. Returns `false` if it was not registered.
    pub fn unregister(&self, number: u64) -> bool {
        self.state.lock().open.remove(&number)
    }

    pub fn is_open(&self, number: u64) -> bool {
        self.state.lock().open.contains(&number)
    }

    pub fn open_count(&self) -> usize {
        self.state.lock().open.len()
    }

    /// Numbers of open connections, ascending.
    pub fn snapshot(&self) -> Vec<u64> {
        self.state.lock().open.iter().copied().collect()
    }

    /// One-line summary: `open connections:  1 3 (2)` or `open connections:  none`.
    pub fn dump(&self) -> String {
        let open = self.snapshot();
        if open.is_empty() {
            return "open connections:  none".to_string();
        }
        let numbers: Vec<String> = open.iter().map(u64::to_string).collect();
        format!("open connections:  {} ({})", numbers.join(" "), open.len())
    }
}
