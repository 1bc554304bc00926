//! Named-key envelope encryption.
//!
//! Resolves a key name to its wrapped record, unwraps it with the master key
//! and applies the envelope cipher to the caller's payload. Creation runs the
//! same path in reverse: generate, wrap, persist.

use crate::error::{KeySealError, KeySealResult, Operation};
use crate::locks::NameLocks;
use crate::master::MasterKeyManager;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use keyseal_crypto::{open, seal, SecretKey};
use keyseal_store::KeyStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

// ============================================================================
// KeyCoordinator
// ============================================================================

/// Orchestrates key creation, existence checks and encrypt/decrypt by name.
///
/// Shareable across threads (`Arc<KeyCoordinator>`). Only creation takes a
/// lock, and only on the name being created.
pub struct KeyCoordinator {
    master: MasterKeyManager,
    store: Arc<dyn KeyStore>,
    creation_locks: NameLocks,
}

impl KeyCoordinator {
    pub fn new(master: MasterKeyManager, store: Arc<dyn KeyStore>) -> Self {
        info!("key coordinator ready on {} storage", store.backend_name());
        Self {
            master,
            store,
            creation_locks: NameLocks::new(),
        }
    }

    /// Label of the storage backend in use.
    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Whether a key record exists for `name`. Never mutates storage.
    pub fn exists(&self, name: &str) -> KeySealResult<bool> {
        self.store
            .stat(name)
            .map_err(|e| KeySealError::from_store(Operation::Exists, name, e))
    }

    /// Creates the data key for `name`, failing if one already exists.
    ///
    /// The existence check and the write happen under the per-name lock, so
    /// at most one concurrent creator of a given name succeeds. A failed
    /// write leaves the name absent; retrying is safe.
    pub fn generate_new_key(&self, name: &str) -> KeySealResult<()> {
        self.creation_locks
            .with_lock(name, || self.create_locked(name))
    }

    fn create_locked(&self, name: &str) -> KeySealResult<()> {
        let op = Operation::Create;

        if self
            .store
            .stat(name)
            .map_err(|e| KeySealError::from_store(op, name, e))?
        {
            debug!("refusing to create key {name}: already exists");
            return Err(KeySealError::KeyAlreadyExists(name.to_string()));
        }

        let data_key =
            SecretKey::generate().map_err(|e| KeySealError::from_crypto(op, name, e))?;
        let record = self
            .master
            .wrap(&data_key)
            .map_err(|e| KeySealError::from_crypto(op, name, e))?;

        self.store.write(name, &record).map_err(|source| {
            warn!("failed to persist key {name}: {source}");
            KeySealError::Persistence {
                op,
                name: name.to_string(),
                source,
            }
        })?;

        info!("created key {name}");
        Ok(())
    }

    /// Number of per-name creation locks currently held or awaited.
    pub fn key_name_lock_count(&self) -> usize {
        self.creation_locks.len()
    }

    /// Reads and unwraps the data key for `name`. The returned key is
    /// zeroized when the caller drops it.
    fn data_key(&self, op: Operation, name: &str) -> KeySealResult<SecretKey> {
        let record = self
            .store
            .read(name)
            .map_err(|e| KeySealError::from_store(op, name, e))?;

        self.master.unwrap(&record).map_err(|e| {
            warn!("could not unwrap key record {name} during {op}: {e}");
            KeySealError::from_crypto(op, name, e)
        })
    }

    /// Encrypts `plaintext` with the data key of `name`.
    ///
    /// Output is `nonce || ciphertext || tag` with a fresh nonce per call.
    pub fn encrypt(&self, name: &str, plaintext: &[u8]) -> KeySealResult<Vec<u8>> {
        let op = Operation::Encrypt;
        let data_key = self.data_key(op, name)?;
        let blob =
            seal(data_key.as_bytes(), plaintext).map_err(|e| KeySealError::from_crypto(op, name, e))?;
        debug!("encrypted {} bytes with key {name}", plaintext.len());
        Ok(blob)
    }

    /// Decrypts a blob produced by [`KeyCoordinator::encrypt`] under `name`.
    pub fn decrypt(&self, name: &str, blob: &[u8]) -> KeySealResult<Vec<u8>> {
        let op = Operation::Decrypt;
        let data_key = self.data_key(op, name)?;
        open(data_key.as_bytes(), blob).map_err(|e| {
            warn!("decryption with key {name} rejected: {e}");
            KeySealError::from_crypto(op, name, e)
        })
    }

    // ── Encoding adapters ──

    pub fn encrypt_str(&self, name: &str, plaintext: &str) -> KeySealResult<Vec<u8>> {
        self.encrypt(name, plaintext.as_bytes())
    }

    /// Encrypts and returns the blob as standard padded base64.
    pub fn encrypt_to_base64(&self, name: &str, plaintext: &[u8]) -> KeySealResult<String> {
        Ok(STANDARD.encode(self.encrypt(name, plaintext)?))
    }

    pub fn encrypt_str_to_base64(&self, name: &str, plaintext: &str) -> KeySealResult<String> {
        self.encrypt_to_base64(name, plaintext.as_bytes())
    }

    /// Decrypts and requires the plaintext to be valid UTF-8.
    pub fn decrypt_to_string(&self, name: &str, blob: &[u8]) -> KeySealResult<String> {
        let plaintext = self.decrypt(name, blob)?;
        String::from_utf8(plaintext).map_err(|e| KeySealError::InvalidEncoding {
            op: Operation::Decrypt,
            name: name.to_string(),
            reason: format!("plaintext is not UTF-8: {e}"),
        })
    }

    /// Decodes a standard padded base64 blob, then decrypts it.
    pub fn decrypt_base64(&self, name: &str, encoded: &str) -> KeySealResult<Vec<u8>> {
        let blob = STANDARD
            .decode(encoded)
            .map_err(|e| KeySealError::InvalidEncoding {
                op: Operation::Decrypt,
                name: name.to_string(),
                reason: format!("base64 decode error: {e}"),
            })?;
        self.decrypt(name, &blob)
    }

    pub fn decrypt_base64_to_string(&self, name: &str, encoded: &str) -> KeySealResult<String> {
        let plaintext = self.decrypt_base64(name, encoded)?;
        String::from_utf8(plaintext).map_err(|e| KeySealError::InvalidEncoding {
            op: Operation::Decrypt,
            name: name.to_string(),
            reason: format!("plaintext is not UTF-8: {e}"),
        })
    }
}

impl std::fmt::Debug for KeyCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyCoordinator")
            .field("master", &self.master)
            .field("backend", &self.store.backend_name())
            .finish()
    }
}
