//! Application state.

use std::sync::Arc;

use lingoclip_worker::JobManager;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub jobs: Arc<JobManager>,
}

impl AppState {
    pub fn new(config: ApiConfig, jobs: Arc<JobManager>) -> Self {
        Self { config, jobs }
    }
}
