//! Fixed-size secret key material.

use crate::error::{CryptoError, CryptoResult};
use rand::rngs::OsRng;
use rand::TryRngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Key size in bytes (256 bits).
pub const KEY_SIZE: usize = 32;

/// A 256-bit key that wipes its memory when dropped.
///
/// Used both for the master key and for per-name data keys. Deliberately not
/// `Clone`: each copy of key material is an explicit `from_slice`.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    bytes: [u8; KEY_SIZE],
}

impl SecretKey {
    /// Draws a new key from the operating system CSPRNG.
    pub fn generate() -> CryptoResult<Self> {
        let mut bytes = [0u8; KEY_SIZE];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| CryptoError::RandomSource(e.to_string()))?;
        Ok(Self { bytes })
    }

    /// Copies key material out of a slice that must be exactly `KEY_SIZE` long.
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: KEY_SIZE,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; KEY_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self { bytes: arr })
    }

    /// Raw key bytes. Never log or persist these.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}
