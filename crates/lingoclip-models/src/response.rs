//! Wire shapes returned to polling clients.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{Job, JobStatus};

/// Job status response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusResponse {
    pub job_id: String,
    pub status: JobStatus,
    pub message: String,
    /// Milliseconds since the Unix epoch
    pub created_at: i64,
}

impl From<&Job> for JobStatusResponse {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.id.to_string(),
            status: job.status,
            message: job.message.clone(),
            created_at: job.created_at_ms(),
        }
    }
}

/// Response to an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobCreatedResponse {
    pub job_id: String,
}
