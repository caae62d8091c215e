//! Worker lifecycle errors

use lunchsync_domain::LunchError;
use thiserror::Error;

/// Errors returned by the background workers' `start`/`stop`
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Worker already running")]
    AlreadyRunning,

    #[error("Worker not running")]
    NotRunning,

    #[error("Failed to subscribe: {0}")]
    Subscribe(#[from] LunchError),

    #[error("Worker task panicked: {0}")]
    Panicked(String),

    #[error("Worker task did not finish within {0:?}")]
    JoinTimeout(std::time::Duration),
}

/// Await a worker task, bounded by `join_timeout`.
pub(crate) async fn join_worker(
    handle: tokio::task::JoinHandle<()>,
    join_timeout: std::time::Duration,
) -> Result<(), WorkerError> {
    match tokio::time::timeout(join_timeout, handle).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Worker task panicked");
            Err(WorkerError::Panicked(e.to_string()))
        }
        Err(_) => {
            tracing::warn!(?join_timeout, "Worker task did not complete within timeout");
            Err(WorkerError::JoinTimeout(join_timeout))
        }
    }
}
