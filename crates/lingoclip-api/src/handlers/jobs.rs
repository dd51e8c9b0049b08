//! Job submission and polling handlers.

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use lingoclip_media::StagedMedia;
use lingoclip_models::{ClipResult, JobCreatedResponse, JobId, JobStatusResponse};
use lingoclip_worker::ResultFetch;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const UPLOAD_FIELD: &str = "file";
const UPLOAD_EXTENSION: &str = "mp4";

/// Accept a clip upload and queue it for analysis.
///
/// POST /jobs (multipart, field `file`)
pub async fn create_job(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<JobCreatedResponse>)> {
    let media = loop {
        let field = multipart.next_field().await.map_err(form_error)?;
        let Some(field) = field else {
            return Err(ApiError::bad_request("missing file field"));
        };
        if field.name() == Some(UPLOAD_FIELD) {
            break stage_upload(&state, field).await?;
        }
    };

    let job_id = state.jobs.submit(media).await?;
    info!(job_id = %job_id, "Accepted clip upload");

    Ok((
        StatusCode::ACCEPTED,
        Json(JobCreatedResponse {
            job_id: job_id.to_string(),
        }),
    ))
}

/// Stream one multipart field into a fresh file under the upload dir.
async fn stage_upload(state: &AppState, mut field: Field<'_>) -> ApiResult<StagedMedia> {
    let media = StagedMedia::allocate(&state.config.upload_dir, UPLOAD_EXTENSION);

    let mut file = match tokio::fs::File::create(media.path()).await {
        Ok(file) => file,
        Err(e) => {
            warn!("Could not create upload file: {}", e);
            return Err(ApiError::internal("could not create temp file"));
        }
    };

    let mut written = 0usize;
    loop {
        let chunk = match field.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(e) => {
                drop(file);
                release_quietly(media).await;
                return Err(form_error(e));
            }
        };
        written += chunk.len();
        if let Err(e) = file.write_all(&chunk).await {
            warn!("Could not persist upload: {}", e);
            drop(file);
            release_quietly(media).await;
            return Err(ApiError::internal("could not persist upload"));
        }
    }

    if let Err(e) = file.flush().await {
        warn!("Could not persist upload: {}", e);
        drop(file);
        release_quietly(media).await;
        return Err(ApiError::internal("could not persist upload"));
    }

    info!(bytes = written, path = %media.path().display(), "Stored upload");
    Ok(media)
}

async fn release_quietly(media: StagedMedia) {
    if let Err(e) = media.release().await {
        warn!("Failed to delete partial upload: {}", e);
    }
}

fn form_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::bad_request("invalid multipart form")
    }
}

/// Poll a job.
///
/// GET /jobs/:job_id
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<JobStatusResponse>> {
    let job = state
        .jobs
        .get(&JobId::from_string(job_id))
        .await
        .ok_or_else(|| ApiError::not_found("job not found"))?;

    Ok(Json(JobStatusResponse::from(&job)))
}

/// Fetch the analysis of a finished job.
///
/// GET /jobs/:job_id/result
///
/// A `DONE` job is deleted once its result has been read.
pub async fn get_job_result(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<ClipResult>> {
    match state.jobs.fetch_result(&JobId::from_string(job_id)).await {
        ResultFetch::Ready(result) => Ok(Json(ClipResult::clone(&result))),
        ResultFetch::NotReady(_) => Err(ApiError::conflict("result not ready")),
        ResultFetch::NotFound => Err(ApiError::not_found("job not found")),
    }
}
