//! Bilingual transcript models produced by a successful pipeline run.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single annotated word inside a segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    /// Word as spoken
    pub text: String,

    /// Part of speech (verb, noun, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_type: Option<String>,

    /// Translation into the target language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
}

impl Token {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            word_type: None,
            translation: None,
        }
    }

    pub fn with_word_type(mut self, word_type: impl Into<String>) -> Self {
        self.word_type = Some(word_type.into());
        self
    }

    pub fn with_translation(mut self, translation: impl Into<String>) -> Self {
        self.translation = Some(translation.into());
        self
    }
}

/// A timed slice of the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub id: String,
    pub start_ms: i64,
    pub end_ms: i64,
    pub text_original: String,
    pub text_translated: String,
    #[serde(default)]
    pub tokens: Vec<Token>,
}

impl Segment {
    /// Segment duration in milliseconds.
    pub fn duration_ms(&self) -> i64 {
        self.end_ms - self.start_ms
    }

    /// Check the timing invariant `0 <= start_ms < end_ms`.
    pub fn validate(&self) -> Result<(), InvalidSegment> {
        if self.start_ms < 0 || self.end_ms <= self.start_ms {
            return Err(InvalidSegment {
                id: self.id.clone(),
                start_ms: self.start_ms,
                end_ms: self.end_ms,
            });
        }
        Ok(())
    }
}

/// Segment timing violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("segment {id} has invalid timing {start_ms}..{end_ms}")]
pub struct InvalidSegment {
    pub id: String,
    pub start_ms: i64,
    pub end_ms: i64,
}

/// Structured output of a successful job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClipResult {
    /// Same as the job ID
    pub id: String,
    pub source_language: String,
    pub target_language: String,
    pub transcript_original: String,
    pub transcript_translated: String,
    pub segments: Vec<Segment>,
    /// Production time in milliseconds since the Unix epoch
    pub created_at: i64,
}
