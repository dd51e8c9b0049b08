//! Shared data models for LingoClip backend.
//!
//! This crate provides Serde-serializable types for:
//! - Jobs and their lifecycle status
//! - Bilingual clip transcripts (segments and tokens)
//! - Polling response schemas

pub mod clip;
pub mod job;
pub mod response;

// Re-export common types
pub use clip::{ClipResult, InvalidSegment, Segment, Token};
pub use job::{Job, JobId, JobOutcome, JobStatus, UnknownJobStatus};
pub use response::{JobCreatedResponse, JobStatusResponse};
