//! Axum HTTP ingress for clip analysis.
//!
//! This crate provides:
//! - Multipart clip upload feeding the job manager
//! - Job status and result polling with early purge
//! - Health, readiness and Prometheus metrics endpoints

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
