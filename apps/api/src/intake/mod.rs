//! File Intake Pipeline: validate → recompress (PDF only) → derive key → object store.
//!
//! Nothing reaches the object store unless validation and recompression both
//! succeed, and the pipeline never touches the document store. Callers persist
//! the record only after `store` returns.

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::storage::ObjectStore;

pub mod compress;
pub mod validation;

pub use validation::DocumentKind;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("No file uploaded.")]
    MissingFile,

    #[error("The uploaded file is empty.")]
    EmptyFile,

    #[error("Invalid file type. Only PDF or DOC files are allowed.")]
    InvalidFileType { mime_type: String },

    #[error("File too large: {size} bytes exceeds the {max} byte limit.")]
    FileTooLarge { size: usize, max: usize },

    #[error("PDF compression failed: {0}")]
    Compression(String),

    #[error(transparent)]
    Store(AppError),
}

/// A file as received from the client.
#[derive(Debug, Clone)]
pub struct Upload {
    pub bytes: Bytes,
    pub mime_type: String,
    pub original_name: String,
}

/// Result of a successful intake.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub resume_url: String,
    pub storage_key: String,
    pub original_filename: String,
    pub stored_bytes: usize,
}

#[derive(Clone)]
pub struct IntakePipeline {
    objects: Arc<dyn ObjectStore>,
    max_bytes: usize,
}

impl IntakePipeline {
    pub fn new(objects: Arc<dyn ObjectStore>, max_bytes: usize) -> Self {
        Self { objects, max_bytes }
    }

    /// Type and size checks only; no I/O.
    pub fn validate(&self, upload: &Upload) -> Result<DocumentKind, IntakeError> {
        validation::validate_upload(&upload.mime_type, upload.bytes.len(), self.max_bytes)
    }

    pub async fn store(&self, upload: Upload) -> Result<StoredUpload, IntakeError> {
        let kind = self.validate(&upload)?;

        let received = upload.bytes.len();
        let body = match kind {
            DocumentKind::Pdf => {
                let raw = upload.bytes.clone();
                let compressed =
                    tokio::task::spawn_blocking(move || compress::recompress_pdf(&raw))
                        .await
                        .map_err(|e| IntakeError::Compression(e.to_string()))??;
                debug!(received, compressed = compressed.len(), "PDF recompressed");
                Bytes::from(compressed)
            }
            DocumentKind::Doc | DocumentKind::Docx => upload.bytes,
        };

        let storage_key = validation::storage_key(&upload.original_name, kind);
        let stored_bytes = body.len();
        let stored = self
            .objects
            .put(&storage_key, body, kind.mime_type())
            .await
            .map_err(IntakeError::Store)?;

        info!(key = %stored.key, stored_bytes, "Upload stored");

        Ok(StoredUpload {
            resume_url: stored.url,
            storage_key: stored.key,
            original_filename: validation::display_name(&upload.original_name, kind),
            stored_bytes,
        })
    }
}
