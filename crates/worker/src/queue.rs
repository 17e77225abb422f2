//! Bounded enhancement job queue and its worker pool.
//!
//! Upload handlers reserve a [`JobSlot`] before creating a record, so a full
//! queue is reported to the client instead of silently piling up work. A
//! fixed number of worker tasks drain the queue, run the
//! [`EnhancementProcessor`], and apply the outcome to the store.
//!
//! Jobs are never retried. If the process dies mid-job the record stays
//! `processing`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use pixelift_core::enhancement::EnhancementType;
use pixelift_core::types::DbId;
use pixelift_db::models::enhancement::UpdateEnhancement;
use pixelift_db::store::SharedStorage;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::processor::EnhancementProcessor;

/// Default number of concurrent workers.
pub const DEFAULT_WORKER_COUNT: usize = 4;

/// Default number of jobs that may wait for a worker.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// One unit of background work.
#[derive(Debug, Clone)]
pub struct EnhancementJob {
    pub enhancement_id: DbId,
    pub source_path: PathBuf,
    pub enhancement_type: EnhancementType,
}

/// Worker pool sizing.
#[derive(Debug, Clone, Copy)]
pub struct QueueConfig {
    pub worker_count: usize,
    pub capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("Enhancement queue is full")]
    Full,

    #[error("Enhancement queue is shut down")]
    Closed,
}

/// Producer handle. Cheap to clone.
#[derive(Debug, Clone)]
pub struct JobQueue {
    tx: mpsc::Sender<EnhancementJob>,
}

/// A reserved place in the queue. Dropping it releases the place.
#[derive(Debug)]
pub struct JobSlot {
    permit: mpsc::OwnedPermit<EnhancementJob>,
}

impl JobSlot {
    /// Enqueue the job into the reserved place. Never blocks.
    pub fn submit(self, job: EnhancementJob) {
        tracing::debug!(enhancement_id = job.enhancement_id, "Enhancement job queued");
        self.permit.send(job);
    }
}

impl JobQueue {
    /// Reserve room for one job without waiting.
    pub fn try_reserve(&self) -> Result<JobSlot, QueueError> {
        match self.tx.clone().try_reserve_owned() {
            Ok(permit) => Ok(JobSlot { permit }),
            Err(mpsc::error::TrySendError::Full(_)) => Err(QueueError::Full),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(QueueError::Closed),
        }
    }

    /// Jobs that can still be accepted right now.
    pub fn available_capacity(&self) -> usize {
        self.tx.capacity()
    }
}

/// Handles of the running workers.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
    cancel: CancellationToken,
}

impl WorkerPool {
    /// Start `config.worker_count` workers and return the producer handle.
    ///
    /// Workers stop taking new jobs once `cancel` fires; a job already in
    /// progress runs to completion.
    pub fn start(
        store: SharedStorage,
        processor: EnhancementProcessor,
        config: QueueConfig,
        cancel: CancellationToken,
    ) -> (JobQueue, WorkerPool) {
        let (tx, rx) = mpsc::channel(config.capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));
        let worker_count = config.worker_count.max(1);

        let handles = (0..worker_count)
            .map(|worker_id| {
                tokio::spawn(worker_loop(
                    worker_id,
                    Arc::clone(&rx),
                    Arc::clone(&store),
                    processor.clone(),
                    cancel.clone(),
                ))
            })
            .collect();

        tracing::info!(
            worker_count,
            capacity = config.capacity.max(1),
            "Enhancement worker pool started",
        );

        (JobQueue { tx }, WorkerPool { handles, cancel })
    }

    /// Signal the workers and wait up to `timeout` for them to finish.
    /// Workers still busy after the timeout are aborted.
    pub async fn shutdown(self, timeout: Duration) {
        self.cancel.cancel();
        for handle in self.handles {
            let abort = handle.abort_handle();
            if tokio::time::timeout(timeout, handle).await.is_err() {
                tracing::warn!("Enhancement worker did not stop in time, aborting");
                abort.abort();
            }
        }
        tracing::info!("Enhancement worker pool stopped");
    }
}

async fn worker_loop(
    worker_id: usize,
    rx: Arc<Mutex<mpsc::Receiver<EnhancementJob>>>,
    store: SharedStorage,
    processor: EnhancementProcessor,
    cancel: CancellationToken,
) {
    tracing::debug!(worker_id, "Enhancement worker started");
    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => break,
            job = async { rx.lock().await.recv().await } => job,
        };
        let Some(job) = next else {
            break;
        };
        process_and_record(&store, &processor, job).await;
    }
    tracing::debug!(worker_id, "Enhancement worker stopped");
}

/// Run one job and write its terminal state to the store.
///
/// Errors are logged, never propagated: the record is the only channel
/// through which the client learns the outcome.
pub async fn process_and_record(
    store: &SharedStorage,
    processor: &EnhancementProcessor,
    job: EnhancementJob,
) {
    let started = Instant::now();
    let update = match processor
        .process(&job.source_path, job.enhancement_type)
        .await
    {
        Ok(done) => {
            tracing::info!(
                enhancement_id = job.enhancement_id,
                enhanced_path = %done.enhanced_path.display(),
                "Enhancement completed",
            );
            UpdateEnhancement::completed(
                done.enhanced_path.to_string_lossy(),
                done.processing_time,
            )
        }
        Err(e) => {
            tracing::error!(
                enhancement_id = job.enhancement_id,
                error = %e,
                "Enhancement failed",
            );
            UpdateEnhancement::failed(started.elapsed().as_secs_f64())
        }
    };

    match store.update_enhancement(job.enhancement_id, &update).await {
        Ok(Some(_)) => {}
        Ok(None) => tracing::warn!(
            enhancement_id = job.enhancement_id,
            "Enhancement record vanished before its result was stored",
        ),
        Err(e) => tracing::error!(
            enhancement_id = job.enhancement_id,
            error = %e,
            "Failed to store enhancement result",
        ),
    }
}
