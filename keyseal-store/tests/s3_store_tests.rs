//! Integration tests for S3KeyStore against real MinIO.
//!
//! Requires a MinIO at localhost:9000 with the `minioaccesskey` /
//! `miniosecretkey` root pair and a `keyseal-test` bucket, e.g.
//! `docker run -p 9000:9000 -e MINIO_ROOT_USER=minioaccesskey
//! -e MINIO_ROOT_PASSWORD=miniosecretkey minio/minio server /data`.
//! Run with `cargo test -p keyseal-store -- --ignored`.

use keyseal_store::{KeyStore, S3KeyStore, S3StoreConfig, StoreError};
use pretty_assertions::assert_eq;
use tokio::runtime::Runtime;
use uuid::Uuid;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap()
}

/// Store under a per-test prefix so runs never collide.
fn test_store(rt: &Runtime) -> S3KeyStore {
    let config = S3StoreConfig {
        endpoint: Some("localhost:9000".into()),
        region: "us-east-1".into(),
        access_key: "minioaccesskey".into(),
        secret_key: "miniosecretkey".into(),
        use_ssl: false,
        bucket: "keyseal-test".into(),
        path_prefix: format!("test-runs/{}", Uuid::new_v4().simple()),
    };
    S3KeyStore::new(&config, rt.handle().clone())
}

#[test]
#[ignore = "requires MinIO at localhost:9000"]
fn write_read_roundtrip() {
    let rt = runtime();
    let store = test_store(&rt);

    store.write("orders", b"wrapped-record").unwrap();
    assert_eq!(store.read("orders").unwrap(), b"wrapped-record".to_vec());
}

#[test]
#[ignore = "requires MinIO at localhost:9000"]
fn stat_false_then_true() {
    let rt = runtime();
    let store = test_store(&rt);

    assert!(!store.stat("orders").unwrap());
    store.write("orders", b"data").unwrap();
    assert!(store.stat("orders").unwrap());
}

#[test]
#[ignore = "requires MinIO at localhost:9000"]
fn missing_record_is_not_found() {
    let rt = runtime();
    let store = test_store(&rt);

    let err = store.read("ghost").unwrap_err();
    assert!(matches!(err, StoreError::NotFound(ref name) if name == "ghost"));
}

#[test]
#[ignore = "requires MinIO at localhost:9000"]
fn overwrite_returns_latest_record() {
    let rt = runtime();
    let store = test_store(&rt);

    store.write("orders", b"version-1").unwrap();
    store.write("orders", b"version-2").unwrap();
    assert_eq!(store.read("orders").unwrap(), b"version-2".to_vec());
}

#[test]
#[ignore = "requires MinIO at localhost:9000"]
fn missing_bucket_is_backend_error() {
    let rt = runtime();
    let store = S3KeyStore::new(
        &S3StoreConfig {
            endpoint: Some("localhost:9000".into()),
            region: "us-east-1".into(),
            access_key: "minioaccesskey".into(),
            secret_key: "miniosecretkey".into(),
            use_ssl: false,
            bucket: format!("absent-{}", Uuid::new_v4().simple()),
            path_prefix: String::new(),
        },
        rt.handle().clone(),
    );

    assert!(matches!(
        store.write("orders", b"data"),
        Err(StoreError::Backend(_))
    ));
}
