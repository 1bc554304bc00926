//! Local filesystem key store: one file per key name.

use crate::{validate_name, KeyStore, StoreError, StoreResult};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Stores each wrapped key record as `<base_path>/<name>`.
///
/// Writes go to a sibling temp file that is fsynced and then renamed over
/// the target, so a crash mid-write leaves either the old record or none.
/// Temp names contain `~`, which [`validate_name`] never admits, so they can
/// never shadow a real key.
pub struct FsKeyStore {
    base_path: PathBuf,
}

impl FsKeyStore {
    /// Opens a store rooted at `base_path`, creating the directory if needed.
    pub fn open(base_path: impl Into<PathBuf>) -> StoreResult<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).map_err(|source| StoreError::Io {
            name: base_path.display().to_string(),
            source,
        })?;
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn record_path(&self, name: &str) -> StoreResult<PathBuf> {
        validate_name(name)?;
        Ok(self.base_path.join(name))
    }

    fn temp_path(&self, name: &str) -> PathBuf {
        self.base_path
            .join(format!("{name}~{}.tmp", uuid::Uuid::new_v4().simple()))
    }
}

impl KeyStore for FsKeyStore {
    fn read(&self, name: &str) -> StoreResult<Vec<u8>> {
        let path = self.record_path(name)?;
        fs::read(&path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                StoreError::NotFound(name.to_string())
            } else {
                StoreError::Io {
                    name: name.to_string(),
                    source,
                }
            }
        })
    }

    fn write(&self, name: &str, blob: &[u8]) -> StoreResult<()> {
        let path = self.record_path(name)?;
        let tmp = self.temp_path(name);
        let io_err = |source| StoreError::Io {
            name: name.to_string(),
            source,
        };

        let result = (|| -> std::io::Result<()> {
            let mut file = OpenOptions::new().write(true).create_new(true).open(&tmp)?;
            file.write_all(blob)?;
            file.sync_all()?;
            fs::rename(&tmp, &path)
        })();

        if let Err(source) = result {
            if let Err(e) = fs::remove_file(&tmp) {
                if e.kind() != ErrorKind::NotFound {
                    warn!("could not remove temp file {}: {e}", tmp.display());
                }
            }
            return Err(io_err(source));
        }

        debug!("wrote {} bytes to {}", blob.len(), path.display());
        Ok(())
    }

    fn stat(&self, name: &str) -> StoreResult<bool> {
        let path = self.record_path(name)?;
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StoreError::Io {
                name: name.to_string(),
                source,
            }),
        }
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }
}
