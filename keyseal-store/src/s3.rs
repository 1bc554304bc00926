//! S3-compatible object storage key store.
//!
//! Each wrapped key record is one object at `<path_prefix>/<name>` in a
//! single bucket. `PutObject` replaces an object atomically, so readers see
//! either the prior record or the complete new one.

use crate::{validate_name, KeyStore, StoreError, StoreResult};
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use tokio::runtime::Handle;
use tracing::debug;

/// Connection settings for an S3-compatible endpoint (AWS, MinIO, ...).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3StoreConfig {
    /// `host:port` or full URL. `None` uses the AWS endpoint for `region`.
    pub endpoint: Option<String>,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    /// Scheme for an `endpoint` given without one.
    pub use_ssl: bool,
    pub bucket: String,
    /// Object key prefix, without leading or trailing slash. May be empty.
    pub path_prefix: String,
}

impl S3StoreConfig {
    /// The endpoint as a URL, adding `http://` or `https://` when the
    /// configured value has no scheme.
    pub fn endpoint_url(&self) -> Option<String> {
        self.endpoint.as_ref().map(|endpoint| {
            if endpoint.contains("://") {
                endpoint.clone()
            } else if self.use_ssl {
                format!("https://{endpoint}")
            } else {
                format!("http://{endpoint}")
            }
        })
    }
}

impl std::fmt::Debug for S3StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3StoreConfig")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("access_key", &self.access_key)
            .field("secret_key", &"[REDACTED]")
            .field("use_ssl", &self.use_ssl)
            .field("bucket", &self.bucket)
            .field("path_prefix", &self.path_prefix)
            .finish()
    }
}

/// [`KeyStore`] over an S3 bucket.
///
/// The trait is synchronous while the SDK is async: every call blocks on
/// `runtime`. Call it from plain threads or `spawn_blocking`, never from
/// inside an async task.
pub struct S3KeyStore {
    client: S3Client,
    bucket: String,
    path_prefix: String,
    runtime: Handle,
}

impl S3KeyStore {
    pub fn new(config: &S3StoreConfig, runtime: Handle) -> Self {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "keyseal-static",
        );

        let mut config_builder = aws_sdk_s3::Config::builder()
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .behavior_version_latest();

        if let Some(endpoint) = config.endpoint_url() {
            config_builder = config_builder
                .endpoint_url(endpoint)
                .force_path_style(true);
        }

        Self {
            client: S3Client::from_conf(config_builder.build()),
            bucket: config.bucket.clone(),
            path_prefix: config.path_prefix.trim_matches('/').to_string(),
            runtime,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Object key for `name`, after name validation.
    pub fn object_key(&self, name: &str) -> StoreResult<String> {
        validate_name(name)?;
        Ok(if self.path_prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{name}", self.path_prefix)
        })
    }

    fn block_on<F: Future>(&self, fut: F) -> F::Output {
        self.runtime.block_on(fut)
    }
}

impl KeyStore for S3KeyStore {
    fn read(&self, name: &str) -> StoreResult<Vec<u8>> {
        let key = self.object_key(name)?;
        self.block_on(async {
            let resp = match self
                .client
                .get_object()
                .bucket(&self.bucket)
                .key(&key)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    let service_err = e.into_service_error();
                    if service_err.is_no_such_key() {
                        return Err(StoreError::NotFound(name.to_string()));
                    }
                    return Err(StoreError::Backend(format!(
                        "get object failed for {key}: {}",
                        DisplayErrorContext(&service_err)
                    )));
                }
            };

            let body = resp.body.collect().await.map_err(|e| {
                StoreError::Backend(format!("failed to read body for {key}: {e}"))
            })?;
            let bytes = body.into_bytes().to_vec();
            debug!("read {} bytes from s3://{}/{key}", bytes.len(), self.bucket);
            Ok(bytes)
        })
    }

    fn write(&self, name: &str, blob: &[u8]) -> StoreResult<()> {
        let key = self.object_key(name)?;
        self.block_on(async {
            self.client
                .put_object()
                .bucket(&self.bucket)
                .key(&key)
                .body(ByteStream::from(blob.to_vec()))
                .send()
                .await
                .map_err(|e| {
                    StoreError::Backend(format!(
                        "put object failed for {key}: {}",
                        DisplayErrorContext(&e)
                    ))
                })?;
            debug!("wrote {} bytes to s3://{}/{key}", blob.len(), self.bucket);
            Ok(())
        })
    }

    fn stat(&self, name: &str) -> StoreResult<bool> {
        let key = self.object_key(name)?;
        self.block_on(async {
            match self
                .client
                .head_object()
                .bucket(&self.bucket)
                .key(&key)
                .send()
                .await
            {
                Ok(_) => Ok(true),
                Err(e) => {
                    let service_err = e.into_service_error();
                    if service_err.is_not_found() {
                        Ok(false)
                    } else {
                        Err(StoreError::Backend(format!(
                            "head object failed for {key}: {}",
                            DisplayErrorContext(&service_err)
                        )))
                    }
                }
            }
        })
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }
}
