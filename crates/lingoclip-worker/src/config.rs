//! Worker configuration.

use std::time::Duration;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Number of concurrent pipeline workers
    pub worker_count: usize,
    /// Maximum items waiting for a worker
    pub queue_capacity: usize,
    /// Age after which a job record is purged, whatever its status
    pub job_ttl: Duration,
    /// How often the purge sweep runs
    pub purge_interval: Duration,
    /// Longest accepted clip, in seconds
    pub max_clip_seconds: f64,
    /// Upper bound on one ffprobe invocation
    pub probe_timeout: Duration,
    /// FFprobe binary name or path
    pub ffprobe_path: String,
    /// Delete a `Done` job as soon as its result is fetched
    pub purge_on_fetch: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            worker_count: 2,
            queue_capacity: 8,
            job_ttl: Duration::from_secs(600), // 10 minutes
            purge_interval: Duration::from_secs(60),
            max_clip_seconds: 45.0,
            probe_timeout: Duration::from_secs(30),
            ffprobe_path: "ffprobe".to_string(),
            purge_on_fetch: true,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            worker_count: env_parse("WORKER_COUNT").unwrap_or(defaults.worker_count),
            queue_capacity: env_parse("QUEUE_CAPACITY").unwrap_or(defaults.queue_capacity),
            job_ttl: env_parse("JOB_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.job_ttl),
            purge_interval: env_parse("PURGE_INTERVAL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.purge_interval),
            max_clip_seconds: env_parse("MAX_CLIP_SECONDS").unwrap_or(defaults.max_clip_seconds),
            probe_timeout: env_parse("PROBE_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.probe_timeout),
            ffprobe_path: std::env::var("FFPROBE_PATH").unwrap_or(defaults.ffprobe_path),
            purge_on_fetch: std::env::var("PURGE_ON_FETCH")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.purge_on_fetch),
        }
        .normalized()
    }

    /// Clamp values that would stall the pool or the sweep.
    pub fn normalized(mut self) -> Self {
        self.worker_count = self.worker_count.max(1);
        if self.queue_capacity < 1 {
            self.queue_capacity = 4;
        }
        if self.purge_interval.is_zero() {
            self.purge_interval = Duration::from_secs(1);
        }
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}
