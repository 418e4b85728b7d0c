use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::OpenAiConfig;
use crate::ReelscriptError;

/// Handle for an OpenAI-compatible HTTP API.
///
/// One instance is constructed at pipeline startup and shared by every
/// component that talks to the service.
pub struct OpenAiApi {
    client: Client,
    api_base: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl OpenAiApi {
    /// Create a client for the given endpoint
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        let api_base = api_base.into();

        Self {
            client: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Create a client from configuration, reading the key from the environment
    pub fn from_env(config: &OpenAiConfig) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            ReelscriptError::OpenAiConfigError(
                "OPENAI_API_KEY is not set (export it or add it to .env)".to_string(),
            )
        })?;

        Ok(Self::new(&config.api_base, api_key))
    }

    /// Send a single-message chat completion and return the reply text
    pub async fn chat_completion(
        &self,
        model: &str,
        prompt: &str,
        temperature: f32,
    ) -> Result<String> {
        let request = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to reach chat completions endpoint")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(
                ReelscriptError::ChatCompletionFailed(format!("HTTP {}: {}", status, body)).into(),
            );
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .context("Failed to parse chat completion response")?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                ReelscriptError::ChatCompletionFailed("response contained no choices".to_string())
                    .into()
            })
    }

    /// Upload an audio file for transcription and return the plain-text result
    pub async fn create_transcription(&self, model: &str, audio_path: &Path) -> Result<String> {
        let file_bytes = tokio::fs::read(audio_path)
            .await
            .with_context(|| format!("Failed to read audio file {}", audio_path.display()))?;

        let file_name = audio_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.mp3".to_string());

        let form = Form::new()
            .part("file", Part::bytes(file_bytes).file_name(file_name))
            .text("model", model.to_string())
            .text("response_format", "text");

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.api_base))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .context("Failed to reach transcriptions endpoint")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(
                ReelscriptError::TranscriptionFailed(format!("HTTP {}: {}", status, body)).into(),
            );
        }

        response
            .text()
            .await
            .context("Failed to read transcription response")
    }
}
