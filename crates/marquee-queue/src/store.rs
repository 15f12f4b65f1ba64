//! Job store trait

use crate::job::{Job, JobId};
use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// Backing store unreachable or the query failed.
    #[error("job store unavailable: {0}")]
    Unavailable(String),
    #[error("job not found")]
    NotFound,
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Source of truth for job records.
///
/// `claim_next` is the concurrency-critical operation: the select-and-transition
/// must be atomic so that two concurrent callers never receive the same job.
/// Contention is resolved by that guarantee, never by an error.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Create a job with status `Pending` and zero attempts.
    async fn enqueue(&self, job_type: &str, payload: Value) -> Result<JobId, QueueError>;

    /// Atomically claim the oldest pending job, moving it to `Processing`.
    /// Returns `None` when no pending job exists.
    async fn claim_next(&self) -> Result<Option<Job>, QueueError>;

    /// Transition `Processing` -> `Completed` and stamp `processed_at`.
    /// A job in any other state is left untouched, so a stale or duplicate
    /// worker cannot resurrect a finished job.
    async fn mark_completed(&self, id: JobId) -> Result<(), QueueError>;

    /// Transition `Processing` -> `Failed`, increment `attempts` and record
    /// the error. Same guard as `mark_completed`.
    async fn mark_failed(&self, id: JobId, error: &str) -> Result<(), QueueError>;

    /// Fetch a job record (status lookups and audit tooling).
    async fn get(&self, id: JobId) -> Result<Job, QueueError>;
}
