//! Master key holder: wraps and unwraps data keys.

use crate::config::MasterKeySource;
use crate::error::{KeySealError, KeySealResult};
use keyseal_crypto::{open, seal, CryptoResult, SecretKey, KEY_SIZE};
use std::path::Path;
use zeroize::Zeroizing;

/// Owns the process master key (the key-encrypting key).
///
/// There is exactly one per coordinator and it is never cloned; the key is
/// wiped from memory when the manager is dropped.
pub struct MasterKeyManager {
    key: SecretKey,
}

impl MasterKeyManager {
    /// Builds a manager from a passphrase that must be exactly 32 bytes.
    pub fn new(passphrase: &[u8]) -> KeySealResult<Self> {
        if passphrase.len() != KEY_SIZE {
            return Err(KeySealError::InvalidMasterKeyLength {
                expected: KEY_SIZE,
                actual: passphrase.len(),
            });
        }
        let key = SecretKey::from_slice(passphrase).map_err(|_| {
            KeySealError::InvalidMasterKeyLength {
                expected: KEY_SIZE,
                actual: passphrase.len(),
            }
        })?;
        Ok(Self { key })
    }

    /// Uses the full contents of `path` as the passphrase.
    pub fn from_file(path: impl AsRef<Path>) -> KeySealResult<Self> {
        let path = path.as_ref();
        let bytes = Zeroizing::new(std::fs::read(path).map_err(|source| {
            KeySealError::MasterKeyUnreadable {
                path: path.to_path_buf(),
                source,
            }
        })?);
        Self::new(&bytes)
    }

    pub fn from_source(source: &MasterKeySource) -> KeySealResult<Self> {
        let bytes = source.resolve()?;
        Self::new(&bytes)
    }

    /// Seals a data key under the master key, producing the persisted record.
    pub fn wrap(&self, data_key: &SecretKey) -> CryptoResult<Vec<u8>> {
        seal(self.key.as_bytes(), data_key.as_bytes())
    }

    /// Opens a persisted record back into its data key.
    pub fn unwrap(&self, record: &[u8]) -> CryptoResult<SecretKey> {
        let bytes = Zeroizing::new(open(self.key.as_bytes(), record)?);
        SecretKey::from_slice(&bytes)
    }
}

impl std::fmt::Debug for MasterKeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKeyManager")
            .field("key", &self.key)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyseal_crypto::{CryptoError, NONCE_SIZE, TAG_SIZE};

    #[test]
    fn rejects_wrong_lengths() {
        for len in [0, 16, 31, 33] {
            match MasterKeyManager::new(&vec![0x41; len]) {
                Err(KeySealError::InvalidMasterKeyLength { expected, actual }) => {
                    assert_eq!(expected, 32);
                    assert_eq!(actual, len);
                }
                other => panic!("expected InvalidMasterKeyLength for {len}, got {other:?}"),
            }
        }
    }

    #[test]
    fn wrap_unwrap_roundtrip() {
        let manager = MasterKeyManager::new(&[0x41; 32]).unwrap();
        let data_key = SecretKey::generate().unwrap();

        let record = manager.wrap(&data_key).unwrap();
        assert_eq!(record.len(), NONCE_SIZE + KEY_SIZE + TAG_SIZE);

        let recovered = manager.unwrap(&record).unwrap();
        assert_eq!(recovered.as_bytes(), data_key.as_bytes());
    }

    #[test]
    fn unwrap_under_other_master_fails() {
        let a = MasterKeyManager::new(&[0x41; 32]).unwrap();
        let b = MasterKeyManager::new(&[0x42; 32]).unwrap();
        let record = a.wrap(&SecretKey::generate().unwrap()).unwrap();
        assert!(matches!(
            b.unwrap(&record),
            Err(CryptoError::AuthenticationFailure)
        ));
    }

    #[test]
    fn debug_does_not_leak_key() {
        let manager = MasterKeyManager::new(&[0x41; 32]).unwrap();
        let rendered = format!("{manager:?}");
        assert!(rendered.contains("REDACTED"));
        assert!(!rendered.contains("65"));
    }
}
