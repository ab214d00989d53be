use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::intake::{IntakeError, Upload};
use crate::models::{NewSubmission, SubmissionRecord};
use crate::relay::Notice;
use crate::state::AppState;

/// A resume form as posted by the browser.
#[derive(Debug, Clone, Default)]
pub struct SubmissionInput {
    pub name: String,
    pub email: String,
    pub upload: Option<Upload>,
}

/// Trims and checks the contact fields.
pub fn validate_contact(name: &str, email: &str) -> Result<(String, String), AppError> {
    let name = name.trim();
    let email = email.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required.".to_string()));
    }
    if email.is_empty() {
        return Err(AppError::Validation("Email is required.".to_string()));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
        _ => {
            return Err(AppError::Validation(
                "Email address is not valid.".to_string(),
            ))
        }
    }
    Ok((name.to_string(), email.to_string()))
}

/// Validates, stores the file, persists the record, then sends the confirmation.
pub async fn submit(state: &AppState, input: SubmissionInput) -> Result<SubmissionRecord, AppError> {
    let (name, email) = validate_contact(&input.name, &input.email)?;
    let upload = input.upload.ok_or(IntakeError::MissingFile)?;

    let stored = state.intake.store(upload).await?;
    let stored_bytes = stored.stored_bytes;

    let new = NewSubmission {
        name,
        email,
        resume_url: stored.resume_url,
        storage_key: stored.storage_key.clone(),
        original_filename: stored.original_filename,
    };
    let record = match state.documents.insert_submission(new).await {
        Ok(record) => record,
        Err(e) => match settle_failed_insert(state, &stored.storage_key, &e).await {
            Some(record) => record,
            None => return Err(e),
        },
    };

    info!(
        submission_id = %record.id,
        key = %record.storage_key,
        stored_bytes,
        "Submission created"
    );

    if let Err(e) = state
        .relay
        .notify(
            &Notice::submission_received(&record.name),
            std::slice::from_ref(&record.email),
        )
        .await
    {
        warn!(submission_id = %record.id, error = %e, "Submission confirmation not recorded");
    }

    Ok(record)
}

/// Decides what happens to the blob after `insert_submission` failed.
///
/// A timed-out insert may still have committed, so the row is looked up by key
/// first: if it exists the submission stands. The blob is removed only once the
/// row is known to be absent.
async fn settle_failed_insert(
    state: &AppState,
    storage_key: &str,
    err: &AppError,
) -> Option<SubmissionRecord> {
    if matches!(err, AppError::Timeout(_)) {
        match state.documents.find_submission_by_storage_key(storage_key).await {
            Ok(Some(record)) => {
                warn!(key = %storage_key, "Submission insert timed out but the row was committed");
                return Some(record);
            }
            Ok(None) => {}
            Err(lookup) => {
                warn!(key = %storage_key, error = %lookup, "Cannot tell whether timed-out insert committed, keeping blob");
                return None;
            }
        }
    }

    if let Err(cleanup) = state.objects.delete(storage_key).await {
        warn!(key = %storage_key, error = %cleanup, "Failed to remove blob after insert failure");
    }
    None
}

pub async fn list(state: &AppState) -> Result<Vec<SubmissionRecord>, AppError> {
    state.documents.list_submissions().await
}

/// Deletes the blob, then the row, then emails a deletion notice (best-effort).
pub async fn delete(state: &AppState, id: Uuid) -> Result<SubmissionRecord, AppError> {
    let record = state
        .documents
        .find_submission(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Form not found".to_string()))?;

    state.objects.delete(&record.storage_key).await?;

    if !state.documents.delete_submission(id).await? {
        warn!(submission_id = %id, "Submission row already gone after blob delete");
    }
    info!(submission_id = %id, key = %record.storage_key, "Submission deleted");

    let body = format!(
        "Hello {}, your resume submission has been deleted.",
        record.name
    );
    state
        .relay
        .email_all("Resume deleted", &body, std::slice::from_ref(&record.email))
        .await;

    Ok(record)
}
