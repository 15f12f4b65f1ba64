//! Job records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Job identifier
pub type JobId = Uuid;

/// Job status
///
/// `Completed` and `Failed` are terminal: nothing transitions a job out of
/// either state, and no edge returns a claimed job to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Waiting in queue
    Pending,
    /// Claimed by a worker
    Processing,
    /// Applied successfully
    Completed,
    /// Apply attempt failed
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(JobStatus::Pending),
            "processing" => Some(JobStatus::Processing),
            "completed" => Some(JobStatus::Completed),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// A durable record of deferred work
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    /// Discriminator selecting the apply routine.
    pub job_type: String,
    /// Captured verbatim at enqueue time; validated only by the apply routine.
    pub payload: serde_json::Value,
    pub status: JobStatus,
    /// Failed apply attempts recorded against this job. Bookkeeping only:
    /// nothing re-claims a failed job.
    pub attempts: u32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set once, on the transition into `Completed`.
    pub processed_at: Option<DateTime<Utc>>,
}
