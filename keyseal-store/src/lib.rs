//! Durable name → blob storage for wrapped key records.
//!
//! The key coordinator only ever talks to a [`KeyStore`]; backend selection
//! happens at the edge (the server picks one from its config). Each backend
//! must make `write` all-or-nothing: a reader sees either the prior state or
//! the complete new blob.

mod fs;
mod memory;
mod s3;

pub use fs::FsKeyStore;
pub use memory::MemoryKeyStore;
pub use s3::{S3KeyStore, S3StoreConfig};

// ============================================================================
// Error types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("key record not found: {0}")]
    NotFound(String),
    #[error("invalid key name: {0:?}")]
    InvalidName(String),
    #[error("I/O error on key record {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

// ============================================================================
// KeyStore capability
// ============================================================================

/// Storage capability consumed by the key coordinator.
///
/// Implementations are shared across threads and must be individually
/// atomic per call; no cross-call transaction is assumed.
pub trait KeyStore: Send + Sync {
    /// Reads the blob stored under `name`, or [`StoreError::NotFound`].
    fn read(&self, name: &str) -> StoreResult<Vec<u8>>;

    /// Stores `blob` under `name`, replacing any previous blob atomically.
    fn write(&self, name: &str, blob: &[u8]) -> StoreResult<()>;

    /// Reports whether a blob exists under `name`. Absence is `Ok(false)`.
    fn stat(&self, name: &str) -> StoreResult<bool>;

    /// Short backend label for log lines.
    fn backend_name(&self) -> &'static str;
}

/// Names accepted by every backend: non-empty, not `.`/`..`, and limited to
/// `[A-Za-z0-9._-]` so they are safe as file names and object keys.
pub fn validate_name(name: &str) -> StoreResult<()> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'_' || b == b'-');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidName(name.to_string()))
    }
}
