//! Record Lifecycle Handler: create / list / delete per record type.
//!
//! Ordering rules shared by every type:
//! - a document row is written only after its blob write succeeded;
//! - on delete, the blob goes first and the row stays if that fails.

pub mod events;
pub mod forms;
pub mod handlers;
pub mod notifications;

use uuid::Uuid;

use crate::errors::AppError;

/// Path ids that are not UUIDs cannot name a record.
pub fn parse_id(raw: &str, what: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::NotFound(format!("{what} not found")))
}
