//! Worker loop: one claimed job per polling tick

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::job::Job;
use crate::store::JobStore;

/// Error produced by an apply routine.
#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    /// Payload failed the routine's domain checks.
    #[error("validation failed: {0}")]
    Validation(String),
    /// Target store unreachable.
    #[error("target store unavailable: {0}")]
    Storage(String),
}

/// Type-specific apply routine. Decodes the payload for its job kind and
/// applies it against the target store.
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn apply(&self, payload: serde_json::Value) -> Result<(), ApplyError>;
}

#[derive(Debug, Clone, Copy)]
pub struct WorkerConfig {
    /// Fixed delay between polling ticks.
    pub poll_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
        }
    }
}

/// Drives jobs from `Pending` to a terminal state.
///
/// One job is processed per tick, so throughput is bounded to one job per
/// `poll_interval` per worker instance. That limitation is deliberate; scale
/// out by running more worker processes against the same store — the atomic
/// claim keeps them from colliding.
///
/// Ticks never overlap within one instance: the next tick is not armed until
/// the current claim/apply/outcome write has finished.
pub struct Worker<S: JobStore + ?Sized> {
    store: Arc<S>,
    config: WorkerConfig,
    handlers: HashMap<String, Arc<dyn JobHandler>>,
}

impl<S: JobStore + ?Sized> Worker<S> {
    pub fn new(store: Arc<S>, config: WorkerConfig) -> Self {
        Self {
            store,
            config,
            handlers: HashMap::new(),
        }
    }

    /// Register the apply routine for a job kind. New kinds plug in here
    /// without touching the polling loop.
    pub fn register(&mut self, job_type: &str, handler: Arc<dyn JobHandler>) {
        self.handlers.insert(job_type.to_string(), handler);
    }

    /// Run a single polling tick: claim at most one pending job, apply it,
    /// write the outcome. Store errors are logged and swallowed here so a
    /// transient failure never kills the schedule.
    pub async fn run_tick(&self) {
        let job = match self.store.claim_next().await {
            Ok(Some(job)) => job,
            Ok(None) => return,
            Err(e) => {
                error!(error = %e, "claim failed, retrying next tick");
                return;
            }
        };

        info!(job_id = %job.id, job_type = %job.job_type, "processing job");
        self.apply(job).await;
    }

    async fn apply(&self, job: Job) {
        let Some(handler) = self.handlers.get(&job.job_type) else {
            warn!(job_id = %job.id, job_type = %job.job_type, "no handler for job type");
            let reason = format!("unknown job type '{}'", job.job_type);
            if let Err(e) = self.store.mark_failed(job.id, &reason).await {
                error!(job_id = %job.id, error = %e, "failed to record outcome");
            }
            return;
        };

        match handler.apply(job.payload.clone()).await {
            Ok(()) => {
                info!(job_id = %job.id, "job completed");
                if let Err(e) = self.store.mark_completed(job.id).await {
                    error!(job_id = %job.id, error = %e, "failed to record completion");
                }
            }
            Err(e) => {
                warn!(job_id = %job.id, error = %e, "job failed");
                if let Err(e) = self.store.mark_failed(job.id, &e.to_string()).await {
                    error!(job_id = %job.id, error = %e, "failed to record failure");
                }
            }
        }
    }

    /// Spawn the recurring polling task and hand back its lifecycle handle.
    pub fn start(self) -> WorkerHandle
    where
        S: 'static,
    {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.config.poll_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            info!(
                poll_interval_ms = self.config.poll_interval.as_millis() as u64,
                "worker started"
            );
            loop {
                tokio::select! {
                    _ = ticker.tick() => self.run_tick().await,
                    _ = shutdown_rx.changed() => {
                        info!("worker stopped");
                        break;
                    }
                }
            }
        });
        WorkerHandle {
            shutdown: shutdown_tx,
            join,
        }
    }
}

/// Handle to a running worker task. Dropping the handle also stops the
/// worker, since the shutdown channel closes with it.
pub struct WorkerHandle {
    shutdown: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl WorkerHandle {
    /// Signal the worker to stop and wait for any in-flight tick to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.join.await;
    }
}
