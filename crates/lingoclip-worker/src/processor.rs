//! Clip processing pipeline.
//!
//! Every run ends in exactly one terminal [`JobOutcome`]; validation and
//! tooling failures are outcomes, not errors. The uploaded media is
//! released on every exit path.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tracing::Instrument;

use lingoclip_media::MediaInspector;
use lingoclip_models::{ClipResult, JobId, JobOutcome, JobStatus};
use lingoclip_queue::QueuedItem;

use crate::logging::JobLogger;
use crate::transcript::TranscriptProducer;

pub const MEDIA_INVALID_MESSAGE: &str = "ffprobe failed, media could not be validated";
pub const NO_AUDIO_MESSAGE: &str = "no usable audio stream detected";

/// Runs queued clips through inspection, validation and transcription.
pub struct ClipProcessor {
    inspector: Arc<dyn MediaInspector>,
    transcriber: Arc<dyn TranscriptProducer>,
    max_clip_seconds: f64,
}

impl ClipProcessor {
    pub fn new(
        inspector: Arc<dyn MediaInspector>,
        transcriber: Arc<dyn TranscriptProducer>,
        max_clip_seconds: f64,
    ) -> Self {
        Self {
            inspector,
            transcriber,
            max_clip_seconds,
        }
    }

    /// Process one item to a terminal outcome and release its media.
    pub async fn process(&self, item: QueuedItem) -> JobOutcome {
        let QueuedItem { job_id, media } = item;
        let logger = JobLogger::new(&job_id, "clip_analysis");
        let span = logger.create_span();

        async move {
            logger.log_start(&format!("analyzing {}", media.path().display()));

            let outcome = self.evaluate(&job_id, media.path(), &logger).await;

            if let Err(e) = media.release().await {
                logger.log_warning(&format!("failed to delete media: {}", e));
            }
            logger.log_outcome(&outcome);
            outcome
        }
        .instrument(span)
        .await
    }

    async fn evaluate(&self, job_id: &JobId, path: &Path, logger: &JobLogger) -> JobOutcome {
        let info = match self.inspector.inspect(path).await {
            Ok(info) => info,
            Err(e) => {
                logger.log_warning(&format!("media inspection failed: {}", e));
                return JobOutcome::failed(JobStatus::FailedTranscode, MEDIA_INVALID_MESSAGE);
            }
        };
        logger.log_progress(&format!(
            "inspected: {:.2}s, audio={}",
            info.duration_secs, info.has_audio
        ));

        if info.duration_secs > self.max_clip_seconds {
            return JobOutcome::failed(
                JobStatus::FailedTooLong,
                format!("clip exceeds {} second limit", self.max_clip_seconds),
            );
        }
        if !info.has_audio {
            return JobOutcome::failed(JobStatus::FailedNoAudio, NO_AUDIO_MESSAGE);
        }

        let transcript = match self.transcriber.produce(path).await {
            Ok(transcript) => transcript,
            Err(e) => {
                return JobOutcome::failed(
                    JobStatus::FailedTranscribe,
                    format!("transcript production failed for job {}: {}", job_id, e),
                );
            }
        };

        let original = transcript.original.trim();
        let translated = transcript.translated.trim();
        if original.is_empty() || translated.is_empty() {
            return JobOutcome::failed(
                JobStatus::FailedTranscribe,
                format!("empty transcript for job {}", job_id),
            );
        }
        if let Some(invalid) = transcript.segments.iter().find_map(|s| s.validate().err()) {
            return JobOutcome::failed(
                JobStatus::FailedTranscribe,
                format!("invalid transcript for job {}: {}", job_id, invalid),
            );
        }

        JobOutcome::Done(ClipResult {
            id: job_id.to_string(),
            source_language: self.transcriber.source_language().to_string(),
            target_language: self.transcriber.target_language().to_string(),
            transcript_original: original.to_string(),
            transcript_translated: translated.to_string(),
            segments: transcript.segments,
            created_at: Utc::now().timestamp_millis(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use async_trait::async_trait;
    use lingoclip_media::{MediaError, MediaInfo, MediaResult, StagedMedia};
    use lingoclip_models::Segment;
    use tempfile::TempDir;

    use crate::error::{WorkerError, WorkerResult};
    use crate::transcript::{FixedTranscript, Transcript};

    struct FakeInspector(Option<MediaInfo>);

    #[async_trait]
    impl MediaInspector for FakeInspector {
        async fn inspect(&self, _path: &Path) -> MediaResult<MediaInfo> {
            self.0
                .ok_or_else(|| MediaError::ffprobe_failed("Invalid data found", None))
        }
    }

    enum FakeTranscript {
        Text(&'static str, &'static str),
        BadSegment,
        Error,
    }

    #[async_trait]
    impl TranscriptProducer for FakeTranscript {
        fn source_language(&self) -> &str {
            "pt"
        }

        fn target_language(&self) -> &str {
            "en"
        }

        async fn produce(&self, _media: &Path) -> WorkerResult<Transcript> {
            match self {
                FakeTranscript::Text(original, translated) => Ok(Transcript {
                    original: original.to_string(),
                    translated: translated.to_string(),
                    segments: Vec::new(),
                }),
                FakeTranscript::BadSegment => Ok(Transcript {
                    original: "Oi".into(),
                    translated: "Hi".into(),
                    segments: vec![Segment {
                        id: "seg-1".into(),
                        start_ms: 5000,
                        end_ms: 1000,
                        text_original: "Oi".into(),
                        text_translated: "Hi".into(),
                        tokens: Vec::new(),
                    }],
                }),
                FakeTranscript::Error => Err(WorkerError::transcript_failed("backend offline")),
            }
        }
    }

    fn media_info(duration_secs: f64, has_audio: bool) -> Option<MediaInfo> {
        Some(MediaInfo {
            duration_secs,
            has_audio,
        })
    }

    fn staged(dir: &TempDir) -> (QueuedItem, PathBuf) {
        let media = StagedMedia::allocate(dir.path(), "mp4");
        std::fs::write(media.path(), b"fake video bytes").unwrap();
        let path = media.path().to_path_buf();
        (QueuedItem::new(JobId::new(), media), path)
    }

    async fn run(
        info: Option<MediaInfo>,
        transcriber: Arc<dyn TranscriptProducer>,
    ) -> (JobId, JobOutcome) {
        let dir = TempDir::new().unwrap();
        let processor = ClipProcessor::new(Arc::new(FakeInspector(info)), transcriber, 45.0);
        let (item, path) = staged(&dir);
        let job_id = item.job_id.clone();

        let outcome = processor.process(item).await;
        assert!(!path.exists(), "media must be deleted after every run");
        (job_id, outcome)
    }

    #[tokio::test]
    async fn test_too_long() {
        let (_, outcome) = run(media_info(46.0, true), Arc::new(FixedTranscript)).await;
        assert_eq!(outcome.status(), JobStatus::FailedTooLong);
        assert_eq!(outcome.message(), "clip exceeds 45 second limit");
    }

    #[tokio::test]
    async fn test_exact_limit_is_accepted() {
        let (_, outcome) = run(media_info(45.0, true), Arc::new(FixedTranscript)).await;
        assert_eq!(outcome.status(), JobStatus::Done);
    }

    #[tokio::test]
    async fn test_no_audio() {
        let (_, outcome) = run(media_info(10.0, false), Arc::new(FixedTranscript)).await;
        assert_eq!(outcome.status(), JobStatus::FailedNoAudio);
        assert_eq!(outcome.message(), NO_AUDIO_MESSAGE);
    }

    #[tokio::test]
    async fn test_duration_checked_before_audio() {
        let (_, outcome) = run(media_info(46.0, false), Arc::new(FixedTranscript)).await;
        assert_eq!(outcome.status(), JobStatus::FailedTooLong);
    }

    #[tokio::test]
    async fn test_inspection_failure() {
        let (_, outcome) = run(None, Arc::new(FixedTranscript)).await;
        assert_eq!(outcome.status(), JobStatus::FailedTranscode);
        assert_eq!(outcome.message(), MEDIA_INVALID_MESSAGE);
    }

    #[tokio::test]
    async fn test_empty_transcript_mentions_job() {
        let (job_id, outcome) = run(
            media_info(10.0, true),
            Arc::new(FakeTranscript::Text("   ", "Hi")),
        )
        .await;
        assert_eq!(outcome.status(), JobStatus::FailedTranscribe);
        assert!(outcome.message().contains(job_id.as_str()));
    }

    #[tokio::test]
    async fn test_transcript_error() {
        let (job_id, outcome) = run(media_info(10.0, true), Arc::new(FakeTranscript::Error)).await;
        assert_eq!(outcome.status(), JobStatus::FailedTranscribe);
        assert!(outcome.message().contains(job_id.as_str()));
        assert!(outcome.message().contains("backend offline"));
    }

    #[tokio::test]
    async fn test_invalid_segment_timing() {
        let (_, outcome) = run(media_info(10.0, true), Arc::new(FakeTranscript::BadSegment)).await;
        assert_eq!(outcome.status(), JobStatus::FailedTranscribe);
    }

    #[tokio::test]
    async fn test_transcripts_are_trimmed() {
        let (_, outcome) = run(
            media_info(10.0, true),
            Arc::new(FakeTranscript::Text("  Oi, tudo bem?\n", "\tHi, how are you? ")),
        )
        .await;
        let JobOutcome::Done(result) = outcome else {
            panic!("expected Done");
        };
        assert_eq!(result.transcript_original, "Oi, tudo bem?");
        assert_eq!(result.transcript_translated, "Hi, how are you?");
    }

    #[tokio::test]
    async fn test_success_builds_result() {
        let (job_id, outcome) = run(media_info(12.5, true), Arc::new(FixedTranscript)).await;
        let JobOutcome::Done(result) = outcome else {
            panic!("expected Done");
        };
        assert_eq!(result.id, job_id.to_string());
        assert_eq!(result.source_language, "pt");
        assert_eq!(result.target_language, "en");
        assert_eq!(result.segments.len(), 3);
        assert!(result.created_at > 0);
    }
}
