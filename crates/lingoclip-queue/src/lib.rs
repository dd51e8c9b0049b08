//! In-memory job store and bounded admission queue.
//!
//! This crate provides:
//! - `JobStore`, the concurrency-safe table of job records
//! - `AdmissionGate`, reject-fast admission with a hard capacity
//! - `QueueReceiver`, the receive side shared by the worker pool

pub mod error;
pub mod queue;
pub mod store;

pub use error::{QueueError, QueueResult};
pub use queue::{job_queue, AdmissionGate, AdmissionSlot, QueueReceiver, QueuedItem};
pub use store::{JobStore, ResultFetch, StoreStats};
