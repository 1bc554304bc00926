//! Envelope encryption engine for keyseal.
//!
//! A process-lifetime master key wraps one data key per key name; the data
//! key encrypts caller payloads. Callers only ever see key names.
//!
//! # Architecture
//!
//! 1. **Master key**: exactly 32 bytes supplied at startup (literal or file
//!    contents). Held by an explicitly owned [`MasterKeyManager`], never
//!    persisted, zeroized on drop.
//!
//! 2. **Data key**: 32 random bytes created once per name by
//!    [`KeyCoordinator::generate_new_key`], wrapped under the master key and
//!    written to a [`KeyStore`]. It is unwrapped for every encrypt/decrypt
//!    call and dropped (and zeroized) at the end of that call; nothing caches
//!    it.
//!
//! Creation is serialized per key name, so two racing creators of the same
//! name cannot both observe "absent" and overwrite each other, while
//! creations of unrelated names proceed in parallel.

mod config;
mod coordinator;
mod error;
mod locks;
mod master;

pub use config::MasterKeySource;
pub use coordinator::KeyCoordinator;
pub use error::{KeySealError, KeySealResult, Operation};
pub use master::MasterKeyManager;

pub use keyseal_crypto::{SecretKey, KEY_SIZE, NONCE_SIZE, TAG_SIZE};
pub use keyseal_store::{
    FsKeyStore, KeyStore, MemoryKeyStore, S3KeyStore, S3StoreConfig, StoreError,
};
