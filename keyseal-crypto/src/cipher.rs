//! AES-256-GCM seal/open over `nonce || ciphertext || tag` blobs.

use crate::error::{CryptoError, CryptoResult};
use crate::key::KEY_SIZE;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::rngs::OsRng;
use rand::TryRngCore;

/// GCM nonce size in bytes (96 bits).
pub const NONCE_SIZE: usize = 12;

/// GCM authentication tag size in bytes (128 bits).
pub const TAG_SIZE: usize = 16;

/// Length of the blob `seal` produces for a plaintext of `plaintext_len` bytes.
pub fn sealed_len(plaintext_len: usize) -> usize {
    NONCE_SIZE + plaintext_len + TAG_SIZE
}

/// Draws a fresh nonce from the OS CSPRNG.
///
/// Random 96-bit nonces stay safe for roughly 2^32 seals under one key.
pub fn random_nonce() -> CryptoResult<[u8; NONCE_SIZE]> {
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng
        .try_fill_bytes(&mut nonce)
        .map_err(|e| CryptoError::RandomSource(e.to_string()))?;
    Ok(nonce)
}

fn cipher_for(key: &[u8]) -> CryptoResult<Aes256Gcm> {
    if key.len() != KEY_SIZE {
        return Err(CryptoError::InvalidKeyLength {
            expected: KEY_SIZE,
            actual: key.len(),
        });
    }
    Aes256Gcm::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength {
        expected: KEY_SIZE,
        actual: key.len(),
    })
}

/// Encrypts `plaintext` under a 256-bit key.
///
/// Returns `nonce || ciphertext || tag`. Every call draws a new nonce, so
/// sealing the same plaintext twice yields different blobs.
pub fn seal(key: &[u8], plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
    let cipher = cipher_for(key)?;
    let nonce = random_nonce()?;

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// Decrypts a blob produced by [`seal`].
///
/// Any blob shorter than nonce + tag, or whose tag does not verify under
/// `key`, fails with [`CryptoError::AuthenticationFailure`].
pub fn open(key: &[u8], blob: &[u8]) -> CryptoResult<Vec<u8>> {
    let cipher = cipher_for(key)?;

    if blob.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::AuthenticationFailure);
    }
    let (nonce, ciphertext) = blob.split_at(NONCE_SIZE);

    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::AuthenticationFailure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SecretKey;

    #[test]
    fn seal_open_roundtrip() {
        let key = SecretKey::generate().unwrap();
        let blob = seal(key.as_bytes(), b"invoice-42").unwrap();
        assert_eq!(blob.len(), sealed_len(10));
        assert_eq!(open(key.as_bytes(), &blob).unwrap(), b"invoice-42");
    }

    #[test]
    fn empty_plaintext_is_tag_only() {
        let key = SecretKey::generate().unwrap();
        let blob = seal(key.as_bytes(), b"").unwrap();
        assert_eq!(blob.len(), NONCE_SIZE + TAG_SIZE);
        assert!(open(key.as_bytes(), &blob).unwrap().is_empty());
    }

    #[test]
    fn short_key_rejected_on_both_sides() {
        let short = [0u8; 16];
        assert!(matches!(
            seal(&short, b"x"),
            Err(CryptoError::InvalidKeyLength { expected: 32, actual: 16 })
        ));
        assert!(matches!(
            open(&short, &[0u8; 40]),
            Err(CryptoError::InvalidKeyLength { expected: 32, actual: 16 })
        ));
    }

    #[test]
    fn truncated_blob_is_authentication_failure() {
        let key = SecretKey::generate().unwrap();
        for len in [0, 1, NONCE_SIZE, NONCE_SIZE + TAG_SIZE - 1] {
            assert!(matches!(
                open(key.as_bytes(), &vec![0u8; len]),
                Err(CryptoError::AuthenticationFailure)
            ));
        }
    }
}
