//! Reelscript - A Rust CLI tool for turning videos into short-form scripts
//!
//! This library chains yt-dlp, ffmpeg, and OpenAI-compatible speech-to-text
//! and chat services to produce a short social-media script from a video URL:
//! download, extract audio, transcribe, sort the transcript into facts and
//! opinions, and draft a script from them.

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod downloader;
pub mod generator;
pub mod openai;
pub mod pipeline;
pub mod transcriber;
pub mod utils;

pub use analyzer::{Classification, TranscriptAnalysis};
pub use cli::{Cli, Commands};
pub use config::Config;
pub use pipeline::ScriptPipeline;

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to the script pipeline
#[derive(thiserror::Error, Debug)]
pub enum ReelscriptError {
    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Audio extraction failed: {0}")]
    AudioExtractionFailed(String),

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Chat completion failed: {0}")]
    ChatCompletionFailed(String),

    #[error("OpenAI configuration error: {0}")]
    OpenAiConfigError(String),
}
