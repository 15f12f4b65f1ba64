//! Unit tests for the marquee-queue worker

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use marquee_queue::store::{JobStore, QueueError};
use marquee_queue::worker::{ApplyError, JobHandler, Worker, WorkerConfig};
use marquee_queue::{Job, JobId, JobStatus, MemoryJobStore};

/// Handler that counts applies and records the order payloads arrive in.
#[derive(Debug, Default)]
struct RecordingHandler {
    calls: AtomicU32,
    seen: Mutex<Vec<Value>>,
}

#[async_trait]
impl JobHandler for RecordingHandler {
    async fn apply(&self, payload: Value) -> Result<(), ApplyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().await.push(payload);
        Ok(())
    }
}

/// Handler that always rejects its payload.
#[derive(Debug)]
struct RejectingHandler;

#[async_trait]
impl JobHandler for RejectingHandler {
    async fn apply(&self, _payload: Value) -> Result<(), ApplyError> {
        Err(ApplyError::Validation("name is required".to_string()))
    }
}

/// A store whose every operation fails, to exercise tick-boundary resilience.
#[derive(Debug)]
struct DownStore;

#[async_trait]
impl JobStore for DownStore {
    async fn enqueue(&self, _job_type: &str, _payload: Value) -> Result<JobId, QueueError> {
        Err(QueueError::Unavailable("store down".into()))
    }

    async fn claim_next(&self) -> Result<Option<Job>, QueueError> {
        Err(QueueError::Unavailable("store down".into()))
    }

    async fn mark_completed(&self, _id: JobId) -> Result<(), QueueError> {
        Err(QueueError::Unavailable("store down".into()))
    }

    async fn mark_failed(&self, _id: JobId, _error: &str) -> Result<(), QueueError> {
        Err(QueueError::Unavailable("store down".into()))
    }

    async fn get(&self, _id: JobId) -> Result<Job, QueueError> {
        Err(QueueError::Unavailable("store down".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn worker_with(
        store: Arc<MemoryJobStore>,
        job_type: &str,
        handler: Arc<dyn JobHandler>,
    ) -> Worker<MemoryJobStore> {
        let mut worker = Worker::new(store, WorkerConfig::default());
        worker.register(job_type, handler);
        worker
    }

    #[tokio::test]
    async fn tick_applies_one_pending_job() {
        let store = Arc::new(MemoryJobStore::new());
        let handler = Arc::new(RecordingHandler::default());
        let worker = worker_with(store.clone(), "echo", handler.clone());

        let id = store.enqueue("echo", json!({"k": "v"})).await.unwrap();
        worker.run_tick().await;

        let job = store.get(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.processed_at.is_some());
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn tick_processes_at_most_one_job() {
        let store = Arc::new(MemoryJobStore::new());
        let handler = Arc::new(RecordingHandler::default());
        let worker = worker_with(store.clone(), "echo", handler.clone());

        let first = store.enqueue("echo", json!({"n": 1})).await.unwrap();
        let second = store.enqueue("echo", json!({"n": 2})).await.unwrap();

        worker.run_tick().await;

        assert_eq!(
            store.get(first).await.unwrap().status,
            JobStatus::Completed
        );
        assert_eq!(store.get(second).await.unwrap().status, JobStatus::Pending);
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn jobs_are_applied_oldest_first() {
        let store = Arc::new(MemoryJobStore::new());
        let handler = Arc::new(RecordingHandler::default());
        let worker = worker_with(store.clone(), "echo", handler.clone());

        for n in 1..=3 {
            store.enqueue("echo", json!({"n": n})).await.unwrap();
        }
        for _ in 0..3 {
            worker.run_tick().await;
        }

        let seen = handler.seen.lock().await;
        let order: Vec<i64> = seen.iter().map(|p| p["n"].as_i64().unwrap()).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn failed_apply_is_terminal_with_one_attempt() {
        let store = Arc::new(MemoryJobStore::new());
        let worker = worker_with(store.clone(), "strict", Arc::new(RejectingHandler));

        let id = store.enqueue("strict", json!({})).await.unwrap();
        worker.run_tick().await;

        let job = store.get(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.attempts, 1);
        assert!(job.last_error.unwrap().contains("name is required"));
        assert!(job.processed_at.is_none());

        // No retry: further ticks leave the job alone.
        worker.run_tick().await;
        let job = store.get(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.attempts, 1);
    }

    #[tokio::test]
    async fn unknown_job_type_is_routed_to_failed() {
        let store = Arc::new(MemoryJobStore::new());
        let worker = worker_with(store.clone(), "echo", Arc::new(RecordingHandler::default()));

        let id = store.enqueue("mystery", json!({})).await.unwrap();
        worker.run_tick().await;

        let job = store.get(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.last_error.unwrap().contains("unknown job type"));
    }

    #[tokio::test]
    async fn tick_on_empty_queue_is_a_noop() {
        let store = Arc::new(MemoryJobStore::new());
        let handler = Arc::new(RecordingHandler::default());
        let worker = worker_with(store.clone(), "echo", handler.clone());

        worker.run_tick().await;
        assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn tick_survives_an_unreachable_store() {
        let worker: Worker<DownStore> =
            Worker::new(Arc::new(DownStore), WorkerConfig::default());
        // Must log and return, not panic or propagate.
        worker.run_tick().await;
    }

    #[tokio::test]
    async fn claimed_job_without_an_outcome_stays_processing() {
        // Documents the liveness gap: there is no lease expiry, so a job
        // claimed by a worker that dies stays `Processing` forever.
        let store = Arc::new(MemoryJobStore::new());
        let worker = worker_with(store.clone(), "echo", Arc::new(RecordingHandler::default()));

        let id = store.enqueue("echo", json!({})).await.unwrap();
        let claimed = store.claim_next().await.unwrap().unwrap();
        assert_eq!(claimed.id, id);

        for _ in 0..3 {
            worker.run_tick().await;
        }
        assert_eq!(
            store.get(id).await.unwrap().status,
            JobStatus::Processing
        );
    }

    #[tokio::test]
    async fn start_and_stop_lifecycle() {
        let store = Arc::new(MemoryJobStore::new());
        let handler = Arc::new(RecordingHandler::default());
        let mut worker = Worker::new(
            store.clone(),
            WorkerConfig {
                poll_interval: Duration::from_millis(10),
            },
        );
        worker.register("echo", handler.clone());

        let id = store.enqueue("echo", json!({})).await.unwrap();
        let handle = worker.start();

        // Generous bound; the first tick fires immediately.
        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.stop().await;

        assert_eq!(store.get(id).await.unwrap().status, JobStatus::Completed);
    }

    #[tokio::test]
    async fn worker_config_defaults() {
        let config = WorkerConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(5));
    }
}
