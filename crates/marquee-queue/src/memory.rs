//! In-memory job store
//!
//! Claim atomicity comes from holding the single write lock for the whole
//! select-and-transition.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::job::{Job, JobId, JobStatus};
use crate::store::{JobStore, QueueError};

#[derive(Debug, Default)]
struct Inner {
    jobs: HashMap<JobId, Job>,
    /// Pending ids in enqueue order; enqueue order is `created_at` order.
    pending: VecDeque<JobId>,
}

/// In-memory `JobStore` for tests and single-process deployments.
#[derive(Debug, Default, Clone)]
pub struct MemoryJobStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn enqueue(&self, job_type: &str, payload: Value) -> Result<JobId, QueueError> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let job = Job {
            id,
            job_type: job_type.to_string(),
            payload,
            status: JobStatus::Pending,
            attempts: 0,
            last_error: None,
            created_at: now,
            updated_at: now,
            processed_at: None,
        };

        let mut inner = self.inner.write().await;
        inner.jobs.insert(id, job);
        inner.pending.push_back(id);
        Ok(id)
    }

    async fn claim_next(&self) -> Result<Option<Job>, QueueError> {
        let mut inner = self.inner.write().await;
        while let Some(id) = inner.pending.pop_front() {
            if let Some(job) = inner.jobs.get_mut(&id) {
                if job.status == JobStatus::Pending {
                    job.status = JobStatus::Processing;
                    job.updated_at = Utc::now();
                    return Ok(Some(job.clone()));
                }
            }
        }
        Ok(None)
    }

    async fn mark_completed(&self, id: JobId) -> Result<(), QueueError> {
        let mut inner = self.inner.write().await;
        let job = inner.jobs.get_mut(&id).ok_or(QueueError::NotFound)?;
        if job.status == JobStatus::Processing {
            let now = Utc::now();
            job.status = JobStatus::Completed;
            job.processed_at = Some(now);
            job.updated_at = now;
        }
        Ok(())
    }

    async fn mark_failed(&self, id: JobId, error: &str) -> Result<(), QueueError> {
        let mut inner = self.inner.write().await;
        let job = inner.jobs.get_mut(&id).ok_or(QueueError::NotFound)?;
        if job.status == JobStatus::Processing {
            job.status = JobStatus::Failed;
            job.attempts += 1;
            job.last_error = Some(error.to_string());
            job.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn get(&self, id: JobId) -> Result<Job, QueueError> {
        let inner = self.inner.read().await;
        inner.jobs.get(&id).cloned().ok_or(QueueError::NotFound)
    }
}
