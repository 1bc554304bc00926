//! Server configuration.

use keyseal_core::{MasterKeySource, S3StoreConfig};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Where wrapped key records are kept.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StorageConfig {
    /// Process memory; every key is lost on exit.
    Memory,
    /// One file per key under `base_path`.
    Filesystem { base_path: PathBuf },
    /// One object per key in an S3-compatible bucket.
    S3(S3StoreConfig),
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Filesystem {
            base_path: PathBuf::from("./data"),
        }
    }
}

/// Configuration for the keyseal HTTP server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind.
    pub listen: SocketAddr,

    /// Path prefix for the key routes (e.g. "/api/v1"). Empty means none.
    pub api_prefix: String,

    /// Master key provisioning. Required to start.
    pub master_key: Option<MasterKeySource>,

    pub storage: StorageConfig,

    /// Key names shorter than this (in bytes) are refused with 412.
    pub min_key_name_len: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 8042)),
            api_prefix: String::new(),
            master_key: None,
            storage: StorageConfig::default(),
            min_key_name_len: 5,
        }
    }
}

impl ServerConfig {
    /// The prefix with exactly one leading slash and no trailing slash, or
    /// an empty string when no prefix is configured.
    pub fn normalized_prefix(&self) -> String {
        let trimmed = self.api_prefix.trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_normalization() {
        let cases = [
            ("", ""),
            ("/", ""),
            ("api", "/api"),
            ("/api/", "/api"),
            ("//api/v1//", "/api/v1"),
        ];
        for (raw, expected) in cases {
            let config = ServerConfig {
                api_prefix: raw.to_string(),
                ..ServerConfig::default()
            };
            assert_eq!(config.normalized_prefix(), expected, "prefix {raw:?}");
        }
    }
}
