//! Object store client
//!
//! A blocking facade over the async S3 SDK. The store owns a private tokio
//! runtime so callers stay synchronous. Calls made from inside another tokio
//! runtime fail with `StorageError::AsyncContext`; wrap them in
//! `spawn_blocking` instead.

use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use chrono::NaiveDate;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::runtime::Runtime;

use crate::error::StorageError;
use crate::storage::credentials::StorageCredentials;
use crate::storage::prefix::{make_date_prefix, object_key, s3a_uri};

const CREDENTIALS_PROVIDER: &str = "tfds-config";

fn sdk_error(err: impl std::error::Error) -> StorageError {
    StorageError::Sdk(DisplayErrorContext(err).to_string())
}

/// S3-compatible object store
pub struct ObjectStore {
    client: Client,
    endpoint_url: String,
    runtime: Option<Arc<Runtime>>,
}

impl Drop for ObjectStore {
    fn drop(&mut self) {
        // A runtime must not be dropped from within an async context
        if let Some(runtime) = self.runtime.take() {
            let _ = std::thread::spawn(move || drop(runtime));
        }
    }
}

impl ObjectStore {
    /// Create a path-style client for the given credentials
    pub fn connect(credentials: &StorageCredentials) -> Result<Self, StorageError> {
        ensure_blocking_context()?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .map_err(|e| StorageError::Io(e.to_string()))?;

        let shared_config = runtime.block_on(async {
            aws_config::defaults(BehaviorVersion::latest())
                .region(Region::new(credentials.region.clone()))
                .credentials_provider(Credentials::new(
                    credentials.access_key.clone(),
                    credentials.secret_key.clone(),
                    None,
                    None,
                    CREDENTIALS_PROVIDER,
                ))
                .endpoint_url(credentials.endpoint_url.clone())
                .load()
                .await
        });

        let s3_config = aws_sdk_s3::config::Builder::from(&shared_config)
            .force_path_style(true)
            .build();

        tracing::debug!(endpoint = %credentials.endpoint_url, "Created object store client");

        Ok(Self {
            client: Client::from_conf(s3_config),
            endpoint_url: credentials.endpoint_url.clone(),
            runtime: Some(Arc::new(runtime)),
        })
    }

    /// Connect with credentials from the named config
    pub fn from_config(config_name: &str) -> Result<Self, StorageError> {
        Self::connect(&StorageCredentials::resolve(config_name)?)
    }

    /// Connect with credentials from the config named by `TFDS_S3_CONFIG`
    pub fn from_env() -> Result<Self, StorageError> {
        Self::connect(&StorageCredentials::from_env()?)
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    fn block_on<F: Future>(&self, future: F) -> Result<F::Output, StorageError> {
        ensure_blocking_context()?;
        let runtime = self
            .runtime
            .as_ref()
            .ok_or_else(|| StorageError::Io("object store closed".to_string()))?;
        Ok(runtime.block_on(future))
    }

    /// Check if the service answers a bucket listing
    pub fn is_available(&self) -> bool {
        match self.bucket_names() {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(endpoint = %self.endpoint_url, error = %e, "Object store unavailable");
                false
            }
        }
    }

    fn bucket_names(&self) -> Result<Vec<String>, StorageError> {
        let output = self
            .block_on(self.client.list_buckets().send())?
            .map_err(sdk_error)?;
        Ok(output
            .buckets()
            .iter()
            .filter_map(|bucket| bucket.name().map(str::to_string))
            .collect())
    }

    pub fn bucket_exists(&self, bucket: &str) -> Result<bool, StorageError> {
        Ok(self.bucket_names()?.iter().any(|name| name == bucket))
    }

    /// Create a bucket; an existing bucket is left as is
    pub fn create_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        if self.bucket_exists(bucket)? {
            tracing::debug!(bucket = %bucket, "Bucket already exists");
            return Ok(());
        }

        self.block_on(self.client.create_bucket().bucket(bucket).send())?
            .map_err(|e| {
                tracing::error!(bucket = %bucket, error = %DisplayErrorContext(&e), "Failed to create bucket");
                sdk_error(e)
            })?;

        tracing::info!(bucket = %bucket, "Created bucket");
        Ok(())
    }

    /// Delete a bucket; a missing bucket is not an error
    pub fn delete_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        if !self.bucket_exists(bucket)? {
            tracing::debug!(bucket = %bucket, "Bucket does not exist, nothing to delete");
            return Ok(());
        }

        self.block_on(self.client.delete_bucket().bucket(bucket).send())?
            .map_err(sdk_error)?;

        tracing::info!(bucket = %bucket, "Deleted bucket");
        Ok(())
    }

    /// Upload a local file to `prefix/file_name`, returning the object key
    pub fn put_file(
        &self,
        local_path: &Path,
        bucket: &str,
        prefix: &str,
        file_name: &str,
    ) -> Result<String, StorageError> {
        let key = object_key(prefix, file_name);
        let client = self.client.clone();

        self.block_on(async {
            let body = ByteStream::from_path(local_path)
                .await
                .map_err(|e| StorageError::Io(e.to_string()))?;
            client
                .put_object()
                .bucket(bucket)
                .key(&key)
                .body(body)
                .send()
                .await
                .map_err(sdk_error)?;
            Ok::<_, StorageError>(())
        })??;

        tracing::debug!(bucket = %bucket, key = %key, path = %local_path.display(), "Uploaded file");
        Ok(key)
    }

    /// Download `prefix/file_name` into a local file
    pub fn get_file(
        &self,
        local_path: &Path,
        bucket: &str,
        prefix: &str,
        file_name: &str,
    ) -> Result<(), StorageError> {
        let key = object_key(prefix, file_name);
        let client = self.client.clone();

        self.block_on(async {
            let output = client
                .get_object()
                .bucket(bucket)
                .key(&key)
                .send()
                .await
                .map_err(sdk_error)?;
            let mut file = tokio::fs::File::create(local_path)
                .await
                .map_err(|e| StorageError::Io(e.to_string()))?;
            let mut body = output.body.into_async_read();
            tokio::io::copy(&mut body, &mut file)
                .await
                .map_err(|e| StorageError::Io(e.to_string()))?;
            file.flush()
                .await
                .map_err(|e| StorageError::Io(e.to_string()))?;
            Ok::<_, StorageError>(())
        })??;

        tracing::debug!(bucket = %bucket, key = %key, path = %local_path.display(), "Downloaded file");
        Ok(())
    }

    /// Every object key under a prefix, across all result pages
    pub fn list_files(&self, prefix: &str, bucket: &str) -> Result<Vec<String>, StorageError> {
        let client = self.client.clone();

        self.block_on(async {
            let mut pages = client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(prefix)
                .into_paginator()
                .send();

            let mut keys = Vec::new();
            while let Some(page) = pages.next().await {
                let page = page.map_err(sdk_error)?;
                keys.extend(
                    page.contents()
                        .iter()
                        .filter_map(|object| object.key().map(str::to_string)),
                );
            }
            Ok::<_, StorageError>(keys)
        })?
    }

    /// `s3a://` URIs of every object in the given date partitions
    pub fn list_files_for_dates(
        &self,
        dates: &[NaiveDate],
        bucket: &str,
    ) -> Result<Vec<String>, StorageError> {
        let mut uris = Vec::new();
        for date in dates {
            let keys = self.list_files(&make_date_prefix(*date), bucket)?;
            uris.extend(keys.iter().map(|key| s3a_uri(bucket, key)));
        }
        Ok(uris)
    }
}

/// Nested `block_on` panics, so refuse to run inside a tokio runtime
fn ensure_blocking_context() -> Result<(), StorageError> {
    match tokio::runtime::Handle::try_current() {
        Ok(_) => Err(StorageError::AsyncContext),
        Err(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_credentials() -> StorageCredentials {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        StorageCredentials {
            access_key: "ak".to_string(),
            secret_key: "sk".to_string(),
            endpoint_url: format!("http://127.0.0.1:{}", port),
            region: "us-east-1".to_string(),
        }
    }

    #[test]
    fn test_connect_does_not_touch_network() {
        let credentials = unreachable_credentials();
        let store = ObjectStore::connect(&credentials).unwrap();
        assert_eq!(store.endpoint_url(), credentials.endpoint_url);
    }

    #[test]
    fn test_is_available_false_when_unreachable() {
        let store = ObjectStore::connect(&unreachable_credentials()).unwrap();
        assert!(!store.is_available());
    }

    #[test]
    fn test_bucket_exists_propagates_errors() {
        let store = ObjectStore::connect(&unreachable_credentials()).unwrap();
        assert!(matches!(
            store.bucket_exists("bucket1"),
            Err(StorageError::Sdk(_))
        ));
    }

    #[test]
    fn test_calls_inside_async_runtime_fail() {
        let credentials = unreachable_credentials();
        let store = ObjectStore::connect(&credentials).unwrap();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();

        runtime.block_on(async {
            assert!(matches!(
                store.bucket_exists("bucket1"),
                Err(StorageError::AsyncContext)
            ));
            assert!(!store.is_available());
            assert!(matches!(
                ObjectStore::connect(&credentials),
                Err(StorageError::AsyncContext)
            ));
        });
    }
}
