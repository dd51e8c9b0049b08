//! Job records tracked by the job store.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::ClipResult;

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Job lifecycle status.
///
/// `Processing` is the only non-terminal value. A job leaves it exactly
/// once and never returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Queued or running in the pipeline
    #[default]
    Processing,
    /// Transcript produced
    Done,
    /// Media has no audio stream
    FailedNoAudio,
    /// Media exceeds the maximum clip duration
    FailedTooLong,
    /// Media could not be inspected
    FailedTranscode,
    /// Transcript stage failed or produced nothing
    FailedTranscribe,
}

impl JobStatus {
    pub const ALL: [JobStatus; 6] = [
        JobStatus::Processing,
        JobStatus::Done,
        JobStatus::FailedNoAudio,
        JobStatus::FailedTooLong,
        JobStatus::FailedTranscode,
        JobStatus::FailedTranscribe,
    ];

    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Processing => "PROCESSING",
            JobStatus::Done => "DONE",
            JobStatus::FailedNoAudio => "FAILED_NO_AUDIO",
            JobStatus::FailedTooLong => "FAILED_TOO_LONG",
            JobStatus::FailedTranscode => "FAILED_TRANSCODE",
            JobStatus::FailedTranscribe => "FAILED_TRANSCRIBE",
        }
    }

    /// Check if this is a terminal state (no more updates expected).
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Processing)
    }

    pub fn is_failure(&self) -> bool {
        self.is_terminal() && *self != JobStatus::Done
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown job status: {0}")]
pub struct UnknownJobStatus(pub String);

impl FromStr for JobStatus {
    type Err = UnknownJobStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownJobStatus(s.to_string()))
    }
}

/// Terminal result of one pipeline run.
///
/// A `ClipResult` can only travel with `Done`, so a job carries a result
/// exactly when its status is `Done`.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Done(ClipResult),
    Failed { status: JobStatus, message: String },
}

impl JobOutcome {
    /// Build a failure outcome.
    ///
    /// Non-failure statuses are coerced to `FailedTranscribe` so a failure
    /// can never masquerade as `Processing` or `Done`.
    pub fn failed(status: JobStatus, message: impl Into<String>) -> Self {
        let status = if status.is_failure() {
            status
        } else {
            JobStatus::FailedTranscribe
        };
        Self::Failed {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> JobStatus {
        match self {
            JobOutcome::Done(_) => JobStatus::Done,
            JobOutcome::Failed { status, .. } => *status,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            JobOutcome::Done(_) => "",
            JobOutcome::Failed { message, .. } => message,
        }
    }
}

/// One tracked submission.
///
/// Values handed out by the store are snapshots; the attached result is
/// shared behind an `Arc` and never mutated after the transition to `Done`.
#[derive(Debug, Clone)]
pub struct Job {
    /// Unique job ID
    pub id: JobId,
    /// Current status
    pub status: JobStatus,
    /// Failure explanation, empty unless the status is a failure
    pub message: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Present if and only if `status == Done`
    pub result: Option<Arc<ClipResult>>,
}

impl Job {
    /// Create a new job in the `Processing` state.
    pub fn new(id: JobId) -> Self {
        Self {
            id,
            status: JobStatus::Processing,
            message: String::new(),
            created_at: Utc::now(),
            result: None,
        }
    }

    /// Apply a terminal outcome.
    ///
    /// Returns `false` and leaves the job untouched if it already left
    /// `Processing`.
    pub fn finish(&mut self, outcome: JobOutcome) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        match outcome {
            JobOutcome::Done(result) => {
                self.status = JobStatus::Done;
                self.message.clear();
                self.result = Some(Arc::new(result));
            }
            JobOutcome::Failed { status, message } => {
                self.status = status;
                self.message = message;
                self.result = None;
            }
        }
        true
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Creation time in milliseconds since the Unix epoch.
    pub fn created_at_ms(&self) -> i64 {
        self.created_at.timestamp_millis()
    }
}
