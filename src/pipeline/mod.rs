use anyhow::Context;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::analyzer::{self, ChatClassifier, SegmentClassifier};
use crate::config::Config;
use crate::downloader::{MediaProvider, YtDlpDownloader};
use crate::generator::{ChatScriptGenerator, ScriptGenerator};
use crate::openai::OpenAiApi;
use crate::transcriber::{SpeechToText, WhisperTranscriber};
use crate::Result;

/// Main script pipeline: download, extract audio, transcribe, analyze,
/// generate.
///
/// All clients are built once at construction and shared; there is no
/// global state.
pub struct ScriptPipeline {
    media: Box<dyn MediaProvider>,
    speech_to_text: Box<dyn SpeechToText>,
    classifier: Box<dyn SegmentClassifier>,
    generator: Box<dyn ScriptGenerator>,
}

impl ScriptPipeline {
    /// Create a new pipeline with clients built from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let api = Arc::new(OpenAiApi::from_env(&config.openai)?);

        Ok(Self {
            media: Box::new(YtDlpDownloader::new(
                &config.storage,
                config.app.max_video_height,
            )),
            speech_to_text: Box::new(WhisperTranscriber::new(
                Arc::clone(&api),
                &config.openai.transcription_model,
            )),
            classifier: Box::new(ChatClassifier::new(
                Arc::clone(&api),
                &config.openai.classifier_model,
            )),
            generator: Box::new(ChatScriptGenerator::new(
                api,
                &config.openai.script_model,
                config.storage.scripts_dir.clone(),
            )),
        })
    }

    /// Run the full pipeline for one URL.
    ///
    /// Returns the generated script path, or `None` if any step failed.
    /// A failure aborts this URL only; partial artifacts are left on disk.
    pub async fn process_video(&self, url: &str) -> Option<PathBuf> {
        let video_path = self.media.download_video(url).await?;
        let audio_path = self.media.extract_audio(&video_path).await?;
        let transcript = self.speech_to_text.transcribe_audio(&audio_path).await?;

        let analysis = analyzer::analyze_transcript(self.classifier.as_ref(), &transcript).await;
        tracing::info!(
            "Classified {} facts and {} opinions",
            analysis.facts.len(),
            analysis.opinions.len()
        );

        let title = video_title(&video_path);
        self.generator.generate_script(&analysis, &title).await
    }

    /// Process every URL in `urls_file`, continuing past per-URL failures.
    ///
    /// An unreadable URL list is the only fatal error.
    pub async fn run_batch(&self, urls_file: &Path) -> Result<()> {
        let content = fs_err::read_to_string(urls_file)
            .with_context(|| format!("Failed to read URL list {}", urls_file.display()))?;

        let urls: Vec<&str> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        if urls.is_empty() {
            println!("{}", style("No URLs to process").yellow());
            return Ok(());
        }

        let progress = ProgressBar::new(urls.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap(),
        );
        progress.set_message("Processing videos");

        for url in urls {
            println!("\n{}", style("=".repeat(40)).dim());
            println!("Processing URL: {}", style(url).cyan());

            match self.process_video(url).await {
                Some(script_path) => {
                    println!(
                        "{} Script generated: {}",
                        style("✓").green(),
                        script_path.display()
                    );
                }
                None => {
                    println!("{} Skipped (see log for details)", style("✗").red());
                }
            }

            progress.inc(1);
        }

        progress.finish_with_message("Done");
        Ok(())
    }
}

/// Derive the artifact title from a downloaded video's file name
pub fn video_title(video_path: &Path) -> String {
    video_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{Classification, MockSegmentClassifier, TranscriptAnalysis};
    use crate::downloader::MockMediaProvider;
    use crate::generator::MockScriptGenerator;
    use crate::transcriber::MockSpeechToText;

    fn pipeline_with(
        media: MockMediaProvider,
        speech_to_text: MockSpeechToText,
        classifier: MockSegmentClassifier,
        generator: MockScriptGenerator,
    ) -> ScriptPipeline {
        ScriptPipeline {
            media: Box::new(media),
            speech_to_text: Box::new(speech_to_text),
            classifier: Box::new(classifier),
            generator: Box::new(generator),
        }
    }

    #[tokio::test]
    async fn failed_download_short_circuits_the_pipeline() {
        let mut media = MockMediaProvider::new();
        media
            .expect_download_video()
            .times(1)
            .returning(|_| None);
        media.expect_extract_audio().never();

        let mut speech_to_text = MockSpeechToText::new();
        speech_to_text.expect_transcribe_audio().never();

        let mut classifier = MockSegmentClassifier::new();
        classifier.expect_classify_segment().never();

        let mut generator = MockScriptGenerator::new();
        generator.expect_generate_script().never();

        let pipeline = pipeline_with(media, speech_to_text, classifier, generator);

        assert!(pipeline.process_video("https://example.com/watch?v=1").await.is_none());
    }

    #[tokio::test]
    async fn failed_extraction_stops_before_transcription() {
        let mut media = MockMediaProvider::new();
        media
            .expect_download_video()
            .returning(|_| Some(PathBuf::from("inputs/videos/Clip.mp4")));
        media.expect_extract_audio().times(1).returning(|_| None);

        let mut speech_to_text = MockSpeechToText::new();
        speech_to_text.expect_transcribe_audio().never();

        let mut classifier = MockSegmentClassifier::new();
        classifier.expect_classify_segment().never();

        let mut generator = MockScriptGenerator::new();
        generator.expect_generate_script().never();

        let pipeline = pipeline_with(media, speech_to_text, classifier, generator);

        assert!(pipeline.process_video("https://example.com/watch?v=1").await.is_none());
    }

    #[tokio::test]
    async fn successful_run_generates_a_script_named_after_the_video() {
        let mut media = MockMediaProvider::new();
        media
            .expect_download_video()
            .returning(|_| Some(PathBuf::from("inputs/videos/My Clip.mp4")));
        media
            .expect_extract_audio()
            .returning(|_| Some(PathBuf::from("inputs/audio/My Clip.mp3")));

        let mut speech_to_text = MockSpeechToText::new();
        speech_to_text
            .expect_transcribe_audio()
            .returning(|_| Some("The sky is blue. I think cats are better than dogs.".to_string()));

        let mut classifier = MockSegmentClassifier::new();
        classifier.expect_classify_segment().returning(|segment| {
            if segment.starts_with("The sky") {
                Classification::Fact
            } else {
                Classification::Opinion
            }
        });

        let mut generator = MockScriptGenerator::new();
        generator
            .expect_generate_script()
            .withf(|analysis: &TranscriptAnalysis, title: &str| {
                title == "My Clip"
                    && analysis.facts == vec!["The sky is blue.".to_string()]
                    && analysis.opinions
                        == vec!["I think cats are better than dogs.".to_string()]
            })
            .returning(|_, _| Some(PathBuf::from("outputs/scripts/My Clip_20240101_000000.txt")));

        let pipeline = pipeline_with(media, speech_to_text, classifier, generator);

        let script = pipeline.process_video("https://example.com/watch?v=1").await;
        assert_eq!(
            script,
            Some(PathBuf::from("outputs/scripts/My Clip_20240101_000000.txt"))
        );
    }

    #[test]
    fn video_title_is_the_file_stem() {
        assert_eq!(video_title(Path::new("inputs/videos/My Clip.mp4")), "My Clip");
        assert_eq!(video_title(Path::new("Ep. 2 finale.mp4")), "Ep. 2 finale");
    }
}
