//! Object Store Adapter: byte blobs addressed by storage key.
//!
//! Handlers never talk to S3 directly; they go through `ObjectStore`, carried in
//! `AppState` as `Arc<dyn ObjectStore>` so tests can swap in an in-memory store.

use async_trait::async_trait;
use bytes::Bytes;

use crate::errors::AppError;

mod s3;

pub use s3::S3ObjectStore;

/// Where a blob ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Writes `body` under `key`, replacing anything already there.
    async fn put(&self, key: &str, body: Bytes, content_type: &str)
        -> Result<StoredObject, AppError>;

    async fn get(&self, key: &str) -> Result<Bytes, AppError>;

    /// Removes the blob under `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), AppError>;
}

/// Joins a public base URL and a storage key.
pub fn object_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key.trim_start_matches('/'))
}
