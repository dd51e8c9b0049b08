//! Clip analysis worker.
//!
//! This crate provides:
//! - The processing pipeline that drives a clip to a terminal status
//! - A fixed worker pool draining the admission queue
//! - The TTL purge sweep
//! - `JobManager`, which wires them together behind one cancellation token

pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod manager;
pub mod metrics;
pub mod processor;
pub mod purge;
pub mod transcript;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use executor::WorkerPool;
pub use logging::JobLogger;
pub use manager::JobManager;
pub use processor::ClipProcessor;
pub use purge::PurgeSweep;
pub use transcript::{FixedTranscript, Transcript, TranscriptProducer};

pub use lingoclip_queue::{QueueError, ResultFetch, StoreStats};
