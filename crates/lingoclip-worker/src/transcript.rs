//! Transcript production capability.
//!
//! The pipeline only depends on [`TranscriptProducer`]; a speech-to-text
//! and translation backend can replace [`FixedTranscript`] without
//! touching the state machine.

use std::path::Path;

use async_trait::async_trait;

use lingoclip_models::{Segment, Token};

use crate::error::WorkerResult;

/// Bilingual transcript of one clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub original: String,
    pub translated: String,
    pub segments: Vec<Segment>,
}

#[async_trait]
pub trait TranscriptProducer: Send + Sync {
    /// Language spoken in the clip.
    fn source_language(&self) -> &str;

    /// Language of the translation.
    fn target_language(&self) -> &str;

    async fn produce(&self, media: &Path) -> WorkerResult<Transcript>;
}

/// Returns the same Portuguese to English transcript for every clip.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedTranscript;

impl FixedTranscript {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TranscriptProducer for FixedTranscript {
    fn source_language(&self) -> &str {
        "pt"
    }

    fn target_language(&self) -> &str {
        "en"
    }

    async fn produce(&self, _media: &Path) -> WorkerResult<Transcript> {
        Ok(Transcript {
            original: "Oi, tudo bem? Eu estou aprendendo portugues. Vamos praticar agora."
                .to_string(),
            translated: "Hi, how are you? I am learning Portuguese. Let's practice now."
                .to_string(),
            segments: vec![
                segment(
                    "seg-1",
                    0,
                    3000,
                    "Oi, tudo bem?",
                    "Hi, how are you?",
                    vec![
                        Token::new("Oi").with_translation("Hi"),
                        Token::new("tudo").with_translation("all"),
                        Token::new("bem").with_translation("well"),
                    ],
                ),
                segment(
                    "seg-2",
                    3000,
                    7000,
                    "Eu estou aprendendo portugues.",
                    "I am learning Portuguese.",
                    vec![
                        Token::new("aprendendo")
                            .with_word_type("verb")
                            .with_translation("learning"),
                        Token::new("portugues")
                            .with_word_type("noun")
                            .with_translation("Portuguese"),
                    ],
                ),
                segment(
                    "seg-3",
                    7000,
                    10000,
                    "Vamos praticar agora.",
                    "Let's practice now.",
                    vec![
                        Token::new("Vamos")
                            .with_word_type("verb")
                            .with_translation("let's go"),
                        Token::new("praticar")
                            .with_word_type("verb")
                            .with_translation("practice"),
                        Token::new("agora")
                            .with_word_type("adverb")
                            .with_translation("now"),
                    ],
                ),
            ],
        })
    }
}

fn segment(
    id: &str,
    start_ms: i64,
    end_ms: i64,
    text_original: &str,
    text_translated: &str,
    tokens: Vec<Token>,
) -> Segment {
    Segment {
        id: id.to_string(),
        start_ms,
        end_ms,
        text_original: text_original.to_string(),
        text_translated: text_translated.to_string(),
        tokens,
    }
}
