use std::time::Duration;

use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use tracing::{debug, info};

use super::{object_url, ObjectStore, StoredObject};
use crate::config::Config;
use crate::deadline::bounded;
use crate::errors::AppError;

/// `ObjectStore` backed by S3 (AWS in production, MinIO locally).
#[derive(Clone)]
pub struct S3ObjectStore {
    client: S3Client,
    bucket: String,
    public_url: String,
    timeout: Duration,
}

impl S3ObjectStore {
    pub fn new(client: S3Client, bucket: String, public_url: String, timeout: Duration) -> Self {
        Self {
            client,
            bucket,
            public_url,
            timeout,
        }
    }

    /// Constructs an S3 client configured for MinIO (custom endpoint) or AWS.
    pub async fn from_config(config: &Config) -> Self {
        let credentials = Credentials::new(
            &config.aws_access_key_id,
            &config.aws_secret_access_key,
            None,
            None,
            "submissions-static",
        );

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.s3_region.clone()))
            .credentials_provider(credentials);
        if let Some(endpoint) = &config.s3_endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.s3_endpoint.is_some())
            .build();

        info!(bucket = %config.s3_bucket, "S3 client initialized");

        Self::new(
            S3Client::from_conf(s3_config),
            config.s3_bucket.clone(),
            config.s3_public_url.clone(),
            config.io_timeout,
        )
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<StoredObject, AppError> {
        let size = body.len();
        bounded("object store", self.timeout, async {
            self.client
                .put_object()
                .bucket(&self.bucket)
                .key(key)
                .body(ByteStream::from(body))
                .content_type(content_type)
                .send()
                .await
                .map_err(|e| {
                    AppError::Storage(format!("put {key} failed: {}", DisplayErrorContext(&e)))
                })
        })
        .await?;

        debug!(key, size, "Stored object");
        Ok(StoredObject {
            key: key.to_string(),
            url: object_url(&self.public_url, key),
        })
    }

    async fn get(&self, key: &str) -> Result<Bytes, AppError> {
        bounded("object store", self.timeout, async {
            let output = self
                .client
                .get_object()
                .bucket(&self.bucket)
                .key(key)
                .send()
                .await
                .map_err(|e| {
                    AppError::Storage(format!("get {key} failed: {}", DisplayErrorContext(&e)))
                })?;
            let data = output
                .body
                .collect()
                .await
                .map_err(|e| AppError::Storage(format!("reading {key} failed: {e}")))?;
            Ok(data.into_bytes())
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        bounded("object store", self.timeout, async {
            self.client
                .delete_object()
                .bucket(&self.bucket)
                .key(key)
                .send()
                .await
                .map_err(|e| {
                    AppError::Storage(format!("delete {key} failed: {}", DisplayErrorContext(&e)))
                })
        })
        .await?;

        debug!(key, "Deleted object");
        Ok(())
    }
}
