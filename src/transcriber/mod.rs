use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::openai::OpenAiApi;

/// Converts audio files to plain text
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe the audio file at `audio_path`
    async fn transcribe_audio(&self, audio_path: &Path) -> Option<String>;
}

/// Transcriber backed by an OpenAI-compatible speech-to-text endpoint
pub struct WhisperTranscriber {
    api: Arc<OpenAiApi>,
    model: String,
}

impl WhisperTranscriber {
    pub fn new(api: Arc<OpenAiApi>, model: impl Into<String>) -> Self {
        Self {
            api,
            model: model.into(),
        }
    }
}

#[async_trait]
impl SpeechToText for WhisperTranscriber {
    async fn transcribe_audio(&self, audio_path: &Path) -> Option<String> {
        tracing::info!("Transcribing: {}", audio_path.display());

        match self.api.create_transcription(&self.model, audio_path).await {
            Ok(text) => {
                tracing::info!("Transcription successful");
                Some(text.trim().to_string())
            }
            Err(e) => {
                tracing::error!(
                    "Transcription failed for {}: {:#}",
                    audio_path.display(),
                    e
                );
                None
            }
        }
    }
}
