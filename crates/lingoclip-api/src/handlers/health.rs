//! Health check handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness check response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub queue: QueueCheck,
    pub jobs: JobCounts,
}

#[derive(Serialize)]
pub struct QueueCheck {
    pub depth: usize,
    pub capacity: usize,
    pub workers: usize,
}

#[derive(Serialize)]
pub struct JobCounts {
    pub total: usize,
    pub processing: usize,
    pub done: usize,
    pub failed: usize,
}

/// Readiness check endpoint (readiness probe).
///
/// Reports 503 while the queue is saturated, since new uploads would be
/// rejected anyway.
pub async fn ready(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let depth = state.jobs.queue_depth();
    let capacity = state.jobs.queue_capacity();
    let stats = state.jobs.stats().await;
    let saturated = depth >= capacity;

    let response = ReadinessResponse {
        status: if saturated { "saturated" } else { "ready" }.to_string(),
        queue: QueueCheck {
            depth,
            capacity,
            workers: state.jobs.worker_count(),
        },
        jobs: JobCounts {
            total: stats.total,
            processing: stats.processing,
            done: stats.done,
            failed: stats.failed,
        },
    };

    if saturated {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    } else {
        Ok(Json(response))
    }
}
