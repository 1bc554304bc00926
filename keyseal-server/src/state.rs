//! Application state for the HTTP server

use crate::config::{ServerConfig, StorageConfig};
use crate::error::{ServerError, ServerResult};
use keyseal_core::{
    FsKeyStore, KeyCoordinator, KeyStore, MasterKeyManager, MemoryKeyStore, S3KeyStore, StoreError,
};
use std::sync::Arc;
use tracing::info;

/// Shared handler state
#[derive(Clone, Debug)]
pub struct AppState {
    pub coordinator: Arc<KeyCoordinator>,
    /// Shortest key name accepted on the key routes
    pub min_key_name_len: usize,
    /// Server version reported by /health
    pub version: String,
}

impl AppState {
    pub fn new(coordinator: Arc<KeyCoordinator>, min_key_name_len: usize) -> Self {
        Self {
            coordinator,
            min_key_name_len,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Loads the master key and opens the configured storage backend.
    ///
    /// The S3 backend captures the current tokio runtime, so it must be
    /// configured from within one.
    pub fn from_config(config: &ServerConfig) -> ServerResult<Self> {
        let source = config
            .master_key
            .as_ref()
            .ok_or(ServerError::MissingMasterKey)?;
        let master = MasterKeyManager::from_source(source).map_err(ServerError::MasterKey)?;

        let store: Arc<dyn KeyStore> = match &config.storage {
            StorageConfig::Memory => Arc::new(MemoryKeyStore::new()),
            StorageConfig::Filesystem { base_path } => {
                info!("key records stored under {}", base_path.display());
                Arc::new(FsKeyStore::open(base_path.clone())?)
            }
            StorageConfig::S3(s3) => {
                let runtime = tokio::runtime::Handle::try_current()
                    .map_err(|e| StoreError::Backend(format!("S3 storage needs a tokio runtime: {e}")))?;
                info!("key records stored in s3://{}/{}", s3.bucket, s3.path_prefix);
                Arc::new(S3KeyStore::new(s3, runtime))
            }
        };

        let coordinator = Arc::new(KeyCoordinator::new(master, store));
        Ok(Self::new(coordinator, config.min_key_name_len))
    }
}
