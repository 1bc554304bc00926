//! Master key provisioning.

use crate::error::{KeySealError, KeySealResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use zeroize::Zeroizing;

/// Where the master key comes from at startup.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MasterKeySource {
    /// The key is the UTF-8 bytes of this string.
    Literal(String),
    /// The key is the full contents of this file, byte for byte.
    File(PathBuf),
}

impl MasterKeySource {
    /// Reads the raw key bytes. Length is checked by the manager, not here.
    pub fn resolve(&self) -> KeySealResult<Zeroizing<Vec<u8>>> {
        match self {
            MasterKeySource::Literal(s) => Ok(Zeroizing::new(s.as_bytes().to_vec())),
            MasterKeySource::File(path) => std::fs::read(path)
                .map(Zeroizing::new)
                .map_err(|source| KeySealError::MasterKeyUnreadable {
                    path: path.clone(),
                    source,
                }),
        }
    }
}

impl std::fmt::Debug for MasterKeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MasterKeySource::Literal(_) => f.write_str("Literal([REDACTED])"),
            MasterKeySource::File(path) => f.debug_tuple("File").field(path).finish(),
        }
    }
}
