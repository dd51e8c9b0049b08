//! Structured job logging utilities.

use tracing::{info, warn, Span};

use lingoclip_models::{JobId, JobOutcome};

/// Job logger carrying the job ID and operation on every event.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
    operation: &'static str,
}

impl JobLogger {
    pub fn new(job_id: &JobId, operation: &'static str) -> Self {
        Self {
            job_id: job_id.to_string(),
            operation,
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            operation = self.operation,
            "Job started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            operation = self.operation,
            "Job progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            job_id = %self.job_id,
            operation = self.operation,
            "Job warning: {}", message
        );
    }

    /// Log the terminal outcome.
    ///
    /// Validation and tooling failures are expected results, so they log
    /// at `info` like successes.
    pub fn log_outcome(&self, outcome: &JobOutcome) {
        info!(
            job_id = %self.job_id,
            operation = self.operation,
            status = %outcome.status(),
            message = outcome.message(),
            "Job finished"
        );
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn operation(&self) -> &str {
        self.operation
    }

    /// Create a tracing span for this job.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "job",
            job_id = %self.job_id,
            operation = self.operation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_logger_creation() {
        let job_id = JobId::new();
        let logger = JobLogger::new(&job_id, "clip_analysis");

        assert_eq!(logger.job_id(), job_id.to_string());
        assert_eq!(logger.operation(), "clip_analysis");
    }

    #[test]
    fn test_span_named_job() {
        let logger = JobLogger::new(&JobId::new(), "clip_analysis");
        let span = logger.create_span();
        if let Some(meta) = span.metadata() {
            assert_eq!(meta.name(), "job");
            assert!(meta.fields().field("job_id").is_some());
            assert!(meta.fields().field("operation").is_some());
        }
    }
}
