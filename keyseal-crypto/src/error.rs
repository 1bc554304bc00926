//! Crypto error types.

use thiserror::Error;

/// Result type for cipher and key operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors raised by the envelope cipher and key material.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// Tag verification failed: wrong key, corrupted or truncated blob.
    #[error("authentication failed (wrong key or tampered data)")]
    AuthenticationFailure,

    #[error("random source failure: {0}")]
    RandomSource(String),

    #[error("encryption failed: {0}")]
    Encryption(String),
}
