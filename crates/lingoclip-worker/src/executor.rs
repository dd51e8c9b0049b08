//! Worker pool draining the admission queue.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use lingoclip_queue::{AdmissionGate, JobStore, QueueReceiver};

use crate::metrics;
use crate::processor::ClipProcessor;

/// Fixed set of workers, each running one pipeline at a time.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `count` workers (at least one).
    ///
    /// Cancellation is observed before each item is picked up; an item
    /// already in the pipeline runs to completion.
    pub fn spawn(
        count: usize,
        receiver: QueueReceiver,
        gate: AdmissionGate,
        store: Arc<JobStore>,
        processor: Arc<ClipProcessor>,
        cancel: CancellationToken,
    ) -> Self {
        let count = count.max(1);
        info!("Starting worker pool with {} workers", count);

        let handles = (0..count)
            .map(|worker| {
                let worker_loop = WorkerLoop {
                    worker,
                    receiver: receiver.clone(),
                    gate: gate.clone(),
                    store: Arc::clone(&store),
                    processor: Arc::clone(&processor),
                    cancel: cancel.clone(),
                };
                tokio::spawn(worker_loop.run())
            })
            .collect();

        Self { handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every worker to exit.
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Worker task failed: {}", e);
            }
        }
    }
}

struct WorkerLoop {
    worker: usize,
    receiver: QueueReceiver,
    gate: AdmissionGate,
    store: Arc<JobStore>,
    processor: Arc<ClipProcessor>,
    cancel: CancellationToken,
}

impl WorkerLoop {
    async fn run(self) {
        debug!(worker = self.worker, "Worker started");

        loop {
            let item = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                item = self.receiver.recv() => match item {
                    Some(item) => item,
                    None => break,
                },
            };
            metrics::set_queue_depth(self.gate.depth());

            let job_id = item.job_id.clone();
            let outcome = self.processor.process(item).await;
            let status = outcome.status();

            if self.store.update(&job_id, outcome).await {
                metrics::record_job_finished(status);
            } else {
                debug!(job_id = %job_id, "Job record gone before completion");
            }
        }

        debug!(worker = self.worker, "Worker stopped");
    }
}
