//! API integration tests.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::Semaphore;
use tower::ServiceExt;

use lingoclip_api::{create_router, ApiConfig, AppState};
use lingoclip_media::{MediaInfo, MediaInspector, MediaResult};
use lingoclip_worker::{FixedTranscript, JobManager, WorkerConfig};

const BOUNDARY: &str = "lingoclip-test-boundary";

/// Reports a short clip with audio once a permit is available.
struct GatedInspector {
    permits: Arc<Semaphore>,
}

#[async_trait]
impl MediaInspector for GatedInspector {
    async fn inspect(&self, _path: &Path) -> MediaResult<MediaInfo> {
        if let Ok(permit) = self.permits.acquire().await {
            permit.forget();
        }
        Ok(MediaInfo {
            duration_secs: 12.0,
            has_audio: true,
        })
    }
}

struct TestApp {
    router: Router,
    jobs: Arc<JobManager>,
    permits: Arc<Semaphore>,
    upload_dir: TempDir,
}

impl TestApp {
    fn new(workers: usize, capacity: usize, permits: usize) -> Self {
        let upload_dir = TempDir::new().unwrap();
        let permits = Arc::new(Semaphore::new(permits));
        let jobs = Arc::new(
            JobManager::start(
                WorkerConfig {
                    worker_count: workers,
                    queue_capacity: capacity,
                    ..WorkerConfig::default()
                },
                Arc::new(GatedInspector {
                    permits: Arc::clone(&permits),
                }),
                Arc::new(FixedTranscript::new()),
            )
            .unwrap(),
        );
        let config = ApiConfig {
            upload_dir: upload_dir.path().to_path_buf(),
            ..ApiConfig::default()
        };
        let router = create_router(AppState::new(config, Arc::clone(&jobs)), None);

        Self {
            router,
            jobs,
            permits,
            upload_dir,
        }
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn get(&self, uri: &str) -> Response {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn upload(&self, field: &str) -> Response {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"{field}\"; filename=\"clip.mp4\"\r\n\
                 Content-Type: video/mp4\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(&[0u8; 1024]);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        self.send(
            Request::builder()
                .method("POST")
                .uri("/jobs")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    async fn wait_for_idle_queue(&self) {
        for _ in 0..200 {
            if self.jobs.queue_depth() == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("queue never drained");
    }

    async fn wait_for_status(&self, job_id: &str, status: &str) -> Value {
        for _ in 0..200 {
            let body = json_body(self.get(&format!("/jobs/{job_id}")).await).await;
            if body["status"] == status {
                return body;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {job_id} never reached {status}");
    }

    fn uploads_left(&self) -> usize {
        std::fs::read_dir(self.upload_dir.path()).unwrap().count()
    }
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Test health endpoint.
#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new(1, 4, 0);

    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "healthy");
}

#[tokio::test]
async fn test_ready_reports_queue() {
    let app = TestApp::new(2, 4, 0);

    let response = app.get("/ready").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["queue"]["capacity"], 4);
    assert_eq!(body["queue"]["workers"], 2);
    assert_eq!(body["jobs"]["total"], 0);
}

#[tokio::test]
async fn test_metrics_disabled_is_not_routed() {
    let app = TestApp::new(1, 4, 0);
    assert_eq!(app.get("/metrics").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_job_is_not_found() {
    let app = TestApp::new(1, 4, 0);

    let response = app.get("/jobs/does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], "job not found");

    let response = app.get("/jobs/does-not-exist/result").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_without_file_field_is_rejected() {
    let app = TestApp::new(1, 4, 0);

    let response = app.upload("video").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "missing file field");
    assert_eq!(app.jobs.stats().await.total, 0);
}

#[tokio::test]
async fn test_non_multipart_upload_is_rejected() {
    let app = TestApp::new(1, 4, 0);

    let response = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/jobs")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_submit_poll_and_fetch_result() {
    let app = TestApp::new(2, 4, 100);

    let response = app.upload("file").await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let job_id = json_body(response).await["jobId"]
        .as_str()
        .unwrap()
        .to_string();

    let status = app.wait_for_status(&job_id, "DONE").await;
    assert_eq!(status["jobId"], job_id.as_str());
    assert!(status["createdAt"].as_i64().unwrap() > 0);
    assert_eq!(app.uploads_left(), 0);

    let response = app.get(&format!("/jobs/{job_id}/result")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let result = json_body(response).await;
    assert_eq!(result["id"], job_id.as_str());
    assert_eq!(result["sourceLanguage"], "pt");
    assert_eq!(result["targetLanguage"], "en");
    assert_eq!(result["segments"].as_array().unwrap().len(), 3);
    assert_eq!(result["segments"][0]["startMs"], 0);

    // Fetching a finished result purges the job.
    let response = app.get(&format!("/jobs/{job_id}/result")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        app.get(&format!("/jobs/{job_id}")).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_result_of_pending_job_is_conflict() {
    let app = TestApp::new(1, 4, 0);

    let response = app.upload("file").await;
    let job_id = json_body(response).await["jobId"]
        .as_str()
        .unwrap()
        .to_string();

    for _ in 0..2 {
        let response = app.get(&format!("/jobs/{job_id}/result")).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(json_body(response).await["error"], "result not ready");
    }

    let status = json_body(app.get(&format!("/jobs/{job_id}")).await).await;
    assert_eq!(status["status"], "PROCESSING");
    assert_eq!(status["message"], "");

    app.permits.add_permits(1);
}

#[tokio::test]
async fn test_full_queue_returns_retry_later() {
    let app = TestApp::new(1, 1, 0);

    // First upload occupies the only worker, second fills the queue.
    assert_eq!(app.upload("file").await.status(), StatusCode::ACCEPTED);
    app.wait_for_idle_queue().await;
    assert_eq!(app.upload("file").await.status(), StatusCode::ACCEPTED);

    let response = app.upload("file").await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()[header::RETRY_AFTER], "1");
    assert_eq!(json_body(response).await["error"], "Try again in a moment");

    // The rejected upload leaves neither a record nor a file behind.
    assert_eq!(app.jobs.stats().await.total, 2);
    assert_eq!(app.uploads_left(), 2);

    let response = app.get("/ready").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    app.permits.add_permits(2);
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = TestApp::new(1, 4, 0);

    let response = app
        .send(
            Request::builder()
                .method("OPTIONS")
                .uri("/jobs")
                .header(header::ORIGIN, "http://localhost:8081")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert!(response.status().is_success());
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = TestApp::new(1, 4, 0);

    let response = app
        .send(
            Request::builder()
                .uri("/health")
                .header("X-Request-ID", "req-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.headers()["X-Request-ID"], "req-123");
}
