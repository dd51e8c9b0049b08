//! Bounded admission queue.
//!
//! Admission reserves a channel slot before anything else happens, so the
//! configured capacity is a hard cap on items waiting for a worker and a
//! rejected submission leaves no trace behind.

use std::sync::Arc;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

use lingoclip_media::StagedMedia;
use lingoclip_models::JobId;

use crate::error::{QueueError, QueueResult};

/// Work item travelling from admission to a worker.
#[derive(Debug)]
pub struct QueuedItem {
    pub job_id: JobId,
    pub media: StagedMedia,
}

impl QueuedItem {
    pub fn new(job_id: JobId, media: StagedMedia) -> Self {
        Self { job_id, media }
    }
}

/// Create a queue with `capacity` slots.
///
/// A capacity of zero is raised to one.
pub fn job_queue(capacity: usize) -> (AdmissionGate, QueueReceiver) {
    let capacity = capacity.max(1);
    let (tx, rx) = mpsc::channel(capacity);
    (
        AdmissionGate { tx, capacity },
        QueueReceiver {
            rx: Arc::new(Mutex::new(rx)),
        },
    )
}

/// Sending half: accepts work only while a slot is free.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    tx: mpsc::Sender<QueuedItem>,
    capacity: usize,
}

impl AdmissionGate {
    /// Reserve a slot without blocking.
    ///
    /// Dropping the returned slot unused gives the capacity back.
    pub fn reserve(&self) -> QueueResult<AdmissionSlot<'_>> {
        match self.tx.try_reserve() {
            Ok(permit) => Ok(AdmissionSlot { permit }),
            Err(TrySendError::Full(())) => Err(QueueError::queue_full(self.capacity)),
            Err(TrySendError::Closed(())) => Err(QueueError::Closed),
        }
    }

    /// Enqueue an item, rejecting immediately when full.
    ///
    /// On rejection the item is dropped, which releases its media.
    pub fn submit(&self, item: QueuedItem) -> QueueResult<()> {
        self.reserve()?.admit(item);
        Ok(())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Items waiting for a worker (including reserved slots).
    pub fn depth(&self) -> usize {
        self.capacity.saturating_sub(self.tx.capacity())
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// A reserved queue slot.
pub struct AdmissionSlot<'a> {
    permit: mpsc::Permit<'a, QueuedItem>,
}

impl AdmissionSlot<'_> {
    /// Place the item into the reserved slot. Cannot fail.
    pub fn admit(self, item: QueuedItem) {
        debug!(job_id = %item.job_id, "Admitted job");
        self.permit.send(item);
    }
}

/// Receiving half shared by every worker.
#[derive(Debug, Clone)]
pub struct QueueReceiver {
    rx: Arc<Mutex<mpsc::Receiver<QueuedItem>>>,
}

impl QueueReceiver {
    /// Wait for the next item. `None` once every gate is dropped and the
    /// queue is drained.
    ///
    /// The queue closes by dropping ends, never through this lock: an idle
    /// worker holds it for as long as it waits.
    pub async fn recv(&self) -> Option<QueuedItem> {
        self.rx.lock().await.recv().await
    }
}
