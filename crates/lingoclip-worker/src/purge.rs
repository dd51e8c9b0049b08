//! Background TTL sweep over the job store.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use lingoclip_queue::JobStore;

use crate::metrics;

/// Deletes job records older than the TTL on a fixed interval.
pub struct PurgeSweep {
    store: Arc<JobStore>,
    ttl: Duration,
    interval: Duration,
}

impl PurgeSweep {
    pub fn new(store: Arc<JobStore>, ttl: Duration, interval: Duration) -> Self {
        Self {
            store,
            ttl,
            interval,
        }
    }

    /// Run until `cancel` fires.
    ///
    /// The first sweep happens one interval after start.
    pub async fn run(self, cancel: CancellationToken) {
        info!(
            "Starting purge sweep (ttl: {:?}, interval: {:?})",
            self.ttl, self.interval
        );

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.sweep_at(Utc::now()).await;
                }
            }
        }

        info!("Purge sweep stopped");
    }

    /// Remove every record created before `now - ttl`.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        let Some(cutoff) = chrono::Duration::from_std(self.ttl)
            .ok()
            .and_then(|ttl| now.checked_sub_signed(ttl))
        else {
            warn!(ttl = ?self.ttl, "Job TTL out of range, skipping sweep");
            return 0;
        };

        let removed = self.store.purge_older_than(cutoff).await;
        if removed > 0 {
            info!(removed, cutoff = %cutoff, "Purged expired jobs");
            metrics::record_jobs_purged("sweep", removed);
        } else {
            debug!(cutoff = %cutoff, "No expired jobs");
        }
        removed
    }
}
