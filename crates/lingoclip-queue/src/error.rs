//! Queue error types.

use thiserror::Error;

pub type QueueResult<T> = Result<T, QueueError>;

#[derive(Debug, Error)]
pub enum QueueError {
    /// Backpressure: every slot is taken. Callers should retry later.
    #[error("Job queue is full (capacity {capacity})")]
    QueueFull { capacity: usize },

    #[error("Job queue is closed")]
    Closed,
}

impl QueueError {
    pub fn queue_full(capacity: usize) -> Self {
        Self::QueueFull { capacity }
    }

    /// Check if error is expected backpressure rather than a fault.
    pub fn is_backpressure(&self) -> bool {
        matches!(self, QueueError::QueueFull { .. })
    }
}
