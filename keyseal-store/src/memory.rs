//! In-process key store.

use crate::{validate_name, KeyStore, StoreError, StoreResult};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// In-memory implementation of [`KeyStore`].
///
/// Suitable for tests and throwaway instances. Records are lost when the
/// process exits, which makes every key unrecoverable with it.
#[derive(Default)]
pub struct MemoryKeyStore {
    records: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyStore for MemoryKeyStore {
    fn read(&self, name: &str) -> StoreResult<Vec<u8>> {
        validate_name(name)?;
        let records = self
            .records
            .read()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        records
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    fn write(&self, name: &str, blob: &[u8]) -> StoreResult<()> {
        validate_name(name)?;
        let mut records = self
            .records
            .write()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        records.insert(name.to_string(), blob.to_vec());
        Ok(())
    }

    fn stat(&self, name: &str) -> StoreResult<bool> {
        validate_name(name)?;
        let records = self
            .records
            .read()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(records.contains_key(name))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
