//! Job manager: the store, the admission gate, the worker pool and the
//! purge sweep wired to one cancellation token.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use lingoclip_media::{FfprobeInspector, MediaInspector, StagedMedia};
use lingoclip_models::{Job, JobId};
use lingoclip_queue::{
    job_queue, AdmissionGate, JobStore, QueueError, QueueResult, QueuedItem, ResultFetch,
    StoreStats,
};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::executor::WorkerPool;
use crate::metrics;
use crate::processor::ClipProcessor;
use crate::purge::PurgeSweep;
use crate::transcript::{FixedTranscript, TranscriptProducer};

/// Owns the running job system.
///
/// Must be started inside a Tokio runtime.
pub struct JobManager {
    config: WorkerConfig,
    store: Arc<JobStore>,
    gate: AdmissionGate,
    cancel: CancellationToken,
    workers: WorkerPool,
    sweep: JoinHandle<()>,
}

impl JobManager {
    /// Start with the given capabilities.
    pub fn start(
        config: WorkerConfig,
        inspector: Arc<dyn MediaInspector>,
        transcriber: Arc<dyn TranscriptProducer>,
    ) -> WorkerResult<Self> {
        let config = config.normalized();
        if !config.max_clip_seconds.is_finite() || config.max_clip_seconds <= 0.0 {
            return Err(WorkerError::config_error(format!(
                "max_clip_seconds must be a positive number, got {}",
                config.max_clip_seconds
            )));
        }

        let store = Arc::new(JobStore::new());
        let (gate, receiver) = job_queue(config.queue_capacity);
        let cancel = CancellationToken::new();

        let processor = Arc::new(ClipProcessor::new(
            inspector,
            transcriber,
            config.max_clip_seconds,
        ));
        let workers = WorkerPool::spawn(
            config.worker_count,
            receiver,
            gate.clone(),
            Arc::clone(&store),
            processor,
            cancel.clone(),
        );

        let sweep = PurgeSweep::new(Arc::clone(&store), config.job_ttl, config.purge_interval);
        let sweep = tokio::spawn(sweep.run(cancel.clone()));

        info!(
            workers = config.worker_count,
            queue_capacity = config.queue_capacity,
            max_clip_seconds = config.max_clip_seconds,
            "Job manager started"
        );

        Ok(Self {
            config,
            store,
            gate,
            cancel,
            workers,
            sweep,
        })
    }

    /// Start with ffprobe inspection and the fixed transcript.
    pub fn with_ffprobe(config: WorkerConfig) -> WorkerResult<Self> {
        let inspector = FfprobeInspector::new(&config.ffprobe_path, config.probe_timeout);
        if !inspector.is_available() {
            warn!(
                ffprobe = %inspector.binary().display(),
                "ffprobe not found; every job will fail media validation"
            );
        }
        Self::start(config, Arc::new(inspector), Arc::new(FixedTranscript::new()))
    }

    /// Admit an uploaded clip.
    ///
    /// A queue slot is reserved before the record is created, so a
    /// rejected submission leaves no record. On rejection the media is
    /// deleted here.
    pub async fn submit(&self, media: StagedMedia) -> QueueResult<JobId> {
        let slot = match self.gate.reserve() {
            Ok(slot) => slot,
            Err(e) => {
                self.reject(&e);
                if let Err(release_err) = media.release().await {
                    warn!("Failed to delete rejected upload: {}", release_err);
                }
                return Err(e);
            }
        };

        // No await between the insert and admit: a record is never left unqueued.
        let job_id = self.store.create().await;
        slot.admit(QueuedItem::new(job_id.clone(), media));

        metrics::record_job_submitted();
        metrics::set_queue_depth(self.gate.depth());
        info!(job_id = %job_id, "Job queued");
        Ok(job_id)
    }

    fn reject(&self, e: &QueueError) {
        match e {
            QueueError::QueueFull { capacity } => {
                info!(capacity, "Queue full, rejecting submission");
                metrics::record_job_rejected("queue_full");
            }
            QueueError::Closed => {
                warn!("Queue closed, rejecting submission");
                metrics::record_job_rejected("closed");
            }
        }
    }

    pub async fn get(&self, id: &JobId) -> Option<Job> {
        self.store.get(id).await
    }

    /// Look up a result; a `Done` job is deleted on fetch when
    /// `purge_on_fetch` is set.
    pub async fn fetch_result(&self, id: &JobId) -> ResultFetch {
        let purge = self.config.purge_on_fetch;
        let fetch = self.store.fetch_result(id, purge).await;
        if purge && matches!(fetch, ResultFetch::Ready(_)) {
            metrics::record_jobs_purged("fetch", 1);
        }
        fetch
    }

    /// Delete a record now. Missing records are fine.
    pub async fn purge(&self, id: &JobId) -> bool {
        let removed = self.store.delete(id).await;
        if removed {
            metrics::record_jobs_purged("manual", 1);
        }
        removed
    }

    pub fn queue_depth(&self) -> usize {
        self.gate.depth()
    }

    pub fn queue_capacity(&self) -> usize {
        self.gate.capacity()
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub async fn stats(&self) -> StoreStats {
        self.store.stats().await
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Signal every worker and the sweep, then wait for them.
    ///
    /// In-flight pipelines finish; items still queued are dropped and
    /// their media deleted.
    pub async fn shutdown(self) {
        info!("Shutting down job manager");
        self.cancel.cancel();
        self.workers.join().await;
        if let Err(e) = self.sweep.await {
            error!("Purge sweep task failed: {}", e);
        }
        info!("Job manager stopped");
    }
}
