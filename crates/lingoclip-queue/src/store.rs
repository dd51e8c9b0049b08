//! In-memory job store.
//!
//! One reader/writer lock guards the whole table. Each record has a
//! single writer for its terminal update (the worker that processed it),
//! so per-record locking would buy nothing.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use lingoclip_models::{ClipResult, Job, JobId, JobOutcome, JobStatus};

/// Outcome of a result lookup.
#[derive(Debug, Clone)]
pub enum ResultFetch {
    /// Unknown or already purged job.
    NotFound,
    /// The job exists but has no result (still processing or failed).
    NotReady(Job),
    /// The job is `Done`.
    Ready(Arc<ClipResult>),
}

/// Record counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub total: usize,
    pub processing: usize,
    pub done: usize,
    pub failed: usize,
}

/// Concurrency-safe table of job records.
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new `Processing` record and return its ID.
    ///
    /// IDs are regenerated until unused, so two live records never share one.
    pub async fn create(&self) -> JobId {
        let mut jobs = self.jobs.write().await;
        let mut id = JobId::new();
        while jobs.contains_key(&id) {
            id = JobId::new();
        }
        jobs.insert(id.clone(), Job::new(id.clone()));
        debug!(job_id = %id, "Created job record");
        id
    }

    /// Snapshot of a record.
    pub async fn get(&self, id: &JobId) -> Option<Job> {
        self.jobs.read().await.get(id).cloned()
    }

    /// Apply the terminal outcome of a job.
    ///
    /// Returns `false` when the record is gone (purged while processing) or
    /// already terminal. A missing record is never recreated.
    pub async fn update(&self, id: &JobId, outcome: JobOutcome) -> bool {
        let mut jobs = self.jobs.write().await;
        let Some(job) = jobs.get_mut(id) else {
            debug!(job_id = %id, "Job record no longer exists, dropping update");
            return false;
        };
        let status = outcome.status();
        if !job.finish(outcome) {
            warn!(
                job_id = %id,
                current = %job.status,
                attempted = %status,
                "Ignoring second terminal update"
            );
            return false;
        }
        true
    }

    /// Remove a record. Idempotent.
    pub async fn delete(&self, id: &JobId) -> bool {
        self.jobs.write().await.remove(id).is_some()
    }

    /// Look up the result of a job.
    ///
    /// With `purge` set, a `Done` record is removed in the same critical
    /// section, so a second fetch reports `NotFound`. Records without a
    /// result are never touched.
    pub async fn fetch_result(&self, id: &JobId, purge: bool) -> ResultFetch {
        if !purge {
            return match self.get(id).await {
                None => ResultFetch::NotFound,
                Some(job) => match job.result.clone() {
                    Some(result) if job.status == JobStatus::Done => ResultFetch::Ready(result),
                    _ => ResultFetch::NotReady(job),
                },
            };
        }

        let mut jobs = self.jobs.write().await;
        let result = match jobs.get(id) {
            None => return ResultFetch::NotFound,
            Some(job) => match (job.status, &job.result) {
                (JobStatus::Done, Some(result)) => Arc::clone(result),
                _ => return ResultFetch::NotReady(job.clone()),
            },
        };
        jobs.remove(id);
        debug!(job_id = %id, "Purged job after result fetch");
        ResultFetch::Ready(result)
    }

    /// Delete every record created strictly before `cutoff`, whatever its
    /// status. Returns the number of records removed.
    pub async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> usize {
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, job| job.created_at >= cutoff);
        before - jobs.len()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }

    pub async fn stats(&self) -> StoreStats {
        let jobs = self.jobs.read().await;
        let mut stats = StoreStats {
            total: jobs.len(),
            ..StoreStats::default()
        };
        for job in jobs.values() {
            match job.status {
                JobStatus::Processing => stats.processing += 1,
                JobStatus::Done => stats.done += 1,
                _ => stats.failed += 1,
            }
        }
        stats
    }
}
