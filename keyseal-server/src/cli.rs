//! Command line interface.

use clap::{ArgGroup, Args, Parser, Subcommand};
use keyseal_core::{MasterKeySource, S3StoreConfig, SecretKey};
use std::fs::OpenOptions;
use std::io::Write;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::{ServerConfig, StorageConfig};
use crate::error::{ServerError, ServerResult};

#[derive(Debug, Parser)]
#[command(name = "keyseal")]
#[command(about = "Envelope encryption service with named data keys")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve(ServeArgs),

    /// Write a fresh random 32-byte master key to a new file
    GenerateMasterKey {
        /// Destination file; must not exist yet
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("master_key")
        .required(true)
        .args(["key_file", "key_string"]),
))]
pub struct ServeArgs {
    /// Address and port to listen on
    #[arg(long, env = "KEYSEAL_LISTEN", default_value = "0.0.0.0:8042")]
    pub listen: SocketAddr,

    /// Prefix for the key routes (e.g. /api/v1)
    #[arg(long, env = "KEYSEAL_API_PREFIX", default_value = "")]
    pub api_prefix: String,

    /// Read the 32-byte master key from this file
    #[arg(long, env = "KEYSEAL_KEY_FILE")]
    pub key_file: Option<PathBuf>,

    /// Use this 32-byte string as the master key
    #[arg(long, env = "KEYSEAL_KEY_STRING", hide_env_values = true)]
    pub key_string: Option<String>,

    /// Directory holding wrapped key records
    #[arg(long, env = "KEYSEAL_DATA_DIR", default_value = "./data", conflicts_with = "memory_store")]
    pub data_dir: PathBuf,

    /// Keep key records in memory only (lost on exit)
    #[arg(long)]
    pub memory_store: bool,

    /// Store key records in this S3 bucket instead of on disk
    #[arg(
        long,
        alias = "s3_bucket_name",
        env = "KEYSEAL_S3_BUCKET_NAME",
        conflicts_with_all = ["memory_store", "data_dir"],
        requires = "s3_access_key",
        requires = "s3_secret_key"
    )]
    pub s3_bucket_name: Option<String>,

    /// S3 endpoint host (e.g. localhost:9000); AWS when omitted
    #[arg(long, alias = "s3_endpoint", env = "KEYSEAL_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    #[arg(long, alias = "s3_region", env = "KEYSEAL_S3_REGION", default_value = "us-east-1")]
    pub s3_region: String,

    #[arg(long, alias = "s3_access_key", env = "KEYSEAL_S3_ACCESS_KEY")]
    pub s3_access_key: Option<String>,

    #[arg(
        long,
        alias = "s3_secret_key",
        env = "KEYSEAL_S3_SECRET_KEY",
        hide_env_values = true
    )]
    pub s3_secret_key: Option<String>,

    /// Use https for an endpoint given without a scheme
    #[arg(long, alias = "s3_use_ssl", env = "KEYSEAL_S3_USE_SSL")]
    pub s3_use_ssl: bool,

    /// Prefix prepended to every object key
    #[arg(long, alias = "s3_path_prefix", env = "KEYSEAL_S3_PATH_PREFIX", default_value = "")]
    pub s3_path_prefix: String,

    /// Shortest accepted key name, in bytes
    #[arg(long, default_value_t = 5)]
    pub min_key_name_len: usize,
}

impl ServeArgs {
    pub fn into_config(self) -> ServerConfig {
        let master_key = match (self.key_file, self.key_string) {
            (Some(path), _) => Some(MasterKeySource::File(path)),
            (None, Some(literal)) => Some(MasterKeySource::Literal(literal)),
            (None, None) => None,
        };
        let storage = if self.memory_store {
            StorageConfig::Memory
        } else if let Some(bucket) = self.s3_bucket_name {
            StorageConfig::S3(S3StoreConfig {
                endpoint: self.s3_endpoint,
                region: self.s3_region,
                access_key: self.s3_access_key.unwrap_or_default(),
                secret_key: self.s3_secret_key.unwrap_or_default(),
                use_ssl: self.s3_use_ssl,
                bucket,
                path_prefix: self.s3_path_prefix,
            })
        } else {
            StorageConfig::Filesystem {
                base_path: self.data_dir,
            }
        };

        ServerConfig {
            listen: self.listen,
            api_prefix: self.api_prefix,
            master_key,
            storage,
            min_key_name_len: self.min_key_name_len,
        }
    }
}

/// Writes 32 random bytes to `path`, which must not exist. On unix the file
/// is created with mode 0600.
pub fn write_master_key_file(path: &Path) -> ServerResult<()> {
    let key = SecretKey::generate().map_err(|e| ServerError::KeyGeneration(e.to_string()))?;

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::AlreadyExists {
            ServerError::WouldOverwrite(path.to_path_buf())
        } else {
            ServerError::Io(e)
        }
    })?;
    file.write_all(key.as_bytes())?;
    file.sync_all()?;

    info!("wrote new master key to {}", path.display());
    Ok(())
}
