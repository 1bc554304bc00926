//! Key coordinator error types.

use keyseal_crypto::CryptoError;
use keyseal_store::StoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for keyseal operations.
pub type KeySealResult<T> = Result<T, KeySealError>;

/// Operation during which an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Exists,
    Encrypt,
    Decrypt,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Operation::Create => "create",
            Operation::Exists => "exists",
            Operation::Encrypt => "encrypt",
            Operation::Decrypt => "decrypt",
        })
    }
}

/// Errors that can occur in keyseal operations.
#[derive(Debug, Error)]
pub enum KeySealError {
    #[error("master key must be exactly {expected} bytes, got {actual}")]
    InvalidMasterKeyLength { expected: usize, actual: usize },

    #[error("unable to read master key file {}: {source}", .path.display())]
    MasterKeyUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("key already exists: {0}")]
    KeyAlreadyExists(String),

    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("authentication failed during {op} with key {name} (wrong key or tampered data)")]
    AuthenticationFailure { op: Operation, name: String },

    #[error("storage failure during {op} of key {name}: {source}")]
    Persistence {
        op: Operation,
        name: String,
        #[source]
        source: StoreError,
    },

    #[error("random source failure during {op} of key {name}: {reason}")]
    RandomSource {
        op: Operation,
        name: String,
        reason: String,
    },

    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("invalid encoding during {op} with key {name}: {reason}")]
    InvalidEncoding {
        op: Operation,
        name: String,
        reason: String,
    },

    #[error("crypto error during {op} with key {name}: {source}")]
    Crypto {
        op: Operation,
        name: String,
        #[source]
        source: CryptoError,
    },
}

impl KeySealError {
    /// Attaches operation and key name to a cipher error.
    pub(crate) fn from_crypto(op: Operation, name: &str, err: CryptoError) -> Self {
        match err {
            CryptoError::AuthenticationFailure => KeySealError::AuthenticationFailure {
                op,
                name: name.to_string(),
            },
            CryptoError::RandomSource(reason) => KeySealError::RandomSource {
                op,
                name: name.to_string(),
                reason,
            },
            CryptoError::InvalidKeyLength { expected, actual } => {
                KeySealError::InvalidKeyLength { expected, actual }
            }
            source @ CryptoError::Encryption(_) => KeySealError::Crypto {
                op,
                name: name.to_string(),
                source,
            },
        }
    }

    /// Attaches operation and key name to a storage error. A missing record
    /// becomes [`KeySealError::KeyNotFound`].
    pub(crate) fn from_store(op: Operation, name: &str, err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => KeySealError::KeyNotFound(name.to_string()),
            source => KeySealError::Persistence {
                op,
                name: name.to_string(),
                source,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, KeySealError::KeyNotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, KeySealError::KeyAlreadyExists(_))
    }

    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, KeySealError::AuthenticationFailure { .. })
    }
}
