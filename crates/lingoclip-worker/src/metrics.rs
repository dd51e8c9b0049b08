//! Job lifecycle metrics.
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! binary installs a recorder.

use metrics::{counter, gauge};

use lingoclip_models::JobStatus;

/// Metric names as constants for consistency.
pub mod names {
    pub const JOBS_SUBMITTED_TOTAL: &str = "lingoclip_jobs_submitted_total";
    pub const JOBS_REJECTED_TOTAL: &str = "lingoclip_jobs_rejected_total";
    pub const JOBS_FINISHED_TOTAL: &str = "lingoclip_jobs_finished_total";
    pub const JOBS_PURGED_TOTAL: &str = "lingoclip_jobs_purged_total";
    pub const QUEUE_DEPTH: &str = "lingoclip_queue_depth";
}

pub fn record_job_submitted() {
    counter!(names::JOBS_SUBMITTED_TOTAL).increment(1);
}

pub fn record_job_rejected(reason: &'static str) {
    counter!(names::JOBS_REJECTED_TOTAL, "reason" => reason).increment(1);
}

pub fn record_job_finished(status: JobStatus) {
    counter!(names::JOBS_FINISHED_TOTAL, "status" => status.as_str()).increment(1);
}

/// `trigger` is `sweep`, `fetch` or `manual`.
pub fn record_jobs_purged(trigger: &'static str, count: usize) {
    counter!(names::JOBS_PURGED_TOTAL, "trigger" => trigger).increment(count as u64);
}

pub fn set_queue_depth(depth: usize) {
    gauge!(names::QUEUE_DEPTH).set(depth as f64);
}
