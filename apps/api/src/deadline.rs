use std::future::Future;
use std::time::Duration;

use crate::errors::AppError;

/// Runs an external call with an upper bound on how long the request may wait for it.
pub async fn bounded<T, F>(what: &'static str, limit: Duration, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Timeout(what)),
    }
}
