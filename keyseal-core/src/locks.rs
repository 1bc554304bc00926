//! Per-name serialization for key creation.
//!
//! Each key name gets its own mutex, created on first use and dropped from
//! the map once nobody holds or waits on it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

type Slot = Arc<Mutex<()>>;

#[derive(Default)]
pub(crate) struct NameLocks {
    slots: Mutex<HashMap<String, Slot>>,
}

impl NameLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Runs `f` while holding the lock for `name`.
    ///
    /// Calls for the same name run one at a time; calls for different names
    /// do not contend beyond the brief map access.
    pub(crate) fn with_lock<T>(&self, name: &str, f: impl FnOnce() -> T) -> T {
        let slot = self.acquire(name);
        let result = {
            // The mutex guards `()`, so a poisoned lock carries no torn state.
            let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };
        self.release(name, slot);
        result
    }

    /// Number of live per-name entries.
    pub(crate) fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn acquire(&self, name: &str) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(name.to_string()).or_default())
    }

    fn release(&self, name: &str, slot: Slot) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the map plus ours: nobody else is waiting.
        if Arc::strong_count(&slot) == 2 {
            slots.remove(name);
        }
    }
}
