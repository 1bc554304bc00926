//! Storage failure injection for the key coordinator.
//!
//! Validates that storage errors surface immediately with operation and key
//! context, that nothing is retried, and that a failed creation leaves the
//! name absent so a later attempt succeeds.

use keyseal_core::{
    KeyCoordinator, KeySealError, KeyStore, MasterKeyManager, MemoryKeyStore, Operation,
    StoreError,
};
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Wraps a memory store and fails selected calls on demand.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryKeyStore,
    fail_writes: AtomicBool,
    fail_stats: AtomicBool,
    fail_reads: AtomicBool,
    writes: AtomicUsize,
}

fn io_failure(name: &str) -> StoreError {
    StoreError::Io {
        name: name.to_string(),
        source: io::Error::other("disk on fire"),
    }
}

impl KeyStore for FlakyStore {
    fn read(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(io_failure(name));
        }
        self.inner.read(name)
    }

    fn write(&self, name: &str, blob: &[u8]) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io_failure(name));
        }
        self.inner.write(name, blob)
    }

    fn stat(&self, name: &str) -> Result<bool, StoreError> {
        if self.fail_stats.load(Ordering::SeqCst) {
            return Err(io_failure(name));
        }
        self.inner.stat(name)
    }

    fn backend_name(&self) -> &'static str {
        "flaky"
    }
}

fn setup() -> (Arc<FlakyStore>, KeyCoordinator) {
    let store = Arc::new(FlakyStore::default());
    let master = MasterKeyManager::new(&[0x41; 32]).unwrap();
    let coordinator = KeyCoordinator::new(master, store.clone());
    (store, coordinator)
}

#[test]
fn failed_write_is_persistence_failure_and_leaves_name_absent() {
    let (store, c) = setup();
    store.fail_writes.store(true, Ordering::SeqCst);

    let err = c.generate_new_key("orders").unwrap_err();
    match &err {
        KeySealError::Persistence { op, name, source } => {
            assert_eq!(*op, Operation::Create);
            assert_eq!(name, "orders");
            assert!(matches!(source, StoreError::Io { .. }));
        }
        other => panic!("expected Persistence, got {other:?}"),
    }
    assert_eq!(store.writes.load(Ordering::SeqCst), 1, "no retries");
    assert!(!c.exists("orders").unwrap());

    store.fail_writes.store(false, Ordering::SeqCst);
    c.generate_new_key("orders").unwrap();
    assert!(c.exists("orders").unwrap());
}

#[test]
fn failed_existence_check_does_not_write() {
    let (store, c) = setup();
    store.fail_stats.store(true, Ordering::SeqCst);

    let err = c.generate_new_key("orders").unwrap_err();
    assert!(matches!(
        err,
        KeySealError::Persistence { op: Operation::Create, .. }
    ));
    assert_eq!(store.writes.load(Ordering::SeqCst), 0);
}

#[test]
fn exists_surfaces_io_errors_instead_of_absent() {
    let (store, c) = setup();
    store.fail_stats.store(true, Ordering::SeqCst);
    assert!(matches!(
        c.exists("orders"),
        Err(KeySealError::Persistence { op: Operation::Exists, .. })
    ));
}

#[test]
fn read_failure_during_encrypt_is_persistence_not_missing() {
    let (store, c) = setup();
    c.generate_new_key("orders").unwrap();
    store.fail_reads.store(true, Ordering::SeqCst);

    let err = c.encrypt("orders", b"data").unwrap_err();
    assert!(!err.is_not_found());
    assert!(matches!(
        err,
        KeySealError::Persistence { op: Operation::Encrypt, .. }
    ));
}

#[test]
fn invalid_name_is_reported_not_created() {
    let (store, c) = setup();
    let err = c.generate_new_key("../escape").unwrap_err();
    assert!(matches!(
        err,
        KeySealError::Persistence { source: StoreError::InvalidName(_), .. }
    ));
    assert_eq!(store.writes.load(Ordering::SeqCst), 0);
}

#[test]
fn error_messages_carry_operation_and_name() {
    let (store, c) = setup();
    store.fail_writes.store(true, Ordering::SeqCst);
    let message = c.generate_new_key("orders").unwrap_err().to_string();
    assert!(message.contains("create"), "{message}");
    assert!(message.contains("orders"), "{message}");
    assert!(message.contains("disk on fire"), "{message}");
}
