use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::config::StorageConfig;
use crate::{ReelscriptError, Result};

/// Browser User-Agent passed to yt-dlp; some platforms reject the default
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fetches videos and derives audio tracks for the pipeline
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaProvider: Send + Sync {
    /// Download the video behind `url`, returning its local path on success
    async fn download_video(&self, url: &str) -> Option<PathBuf>;

    /// Transcode the audio track of `video_path` to a compressed audio file
    async fn extract_audio(&self, video_path: &Path) -> Option<PathBuf>;
}

/// Downloader backed by the yt-dlp and ffmpeg command line tools
pub struct YtDlpDownloader {
    yt_dlp_path: String,
    ffmpeg_path: String,
    videos_dir: PathBuf,
    audio_dir: PathBuf,
    max_height: u32,
}

impl YtDlpDownloader {
    pub fn new(storage: &StorageConfig, max_height: u32) -> Self {
        Self {
            yt_dlp_path: "yt-dlp".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
            videos_dir: storage.videos_dir.clone(),
            audio_dir: storage.audio_dir.clone(),
            max_height,
        }
    }

    /// Format selector preferring a modest mp4 rendition
    fn format_selector(&self) -> String {
        format!(
            "bestvideo[height<={h}][ext=mp4]+bestaudio[ext=m4a]/best[height<={h}][ext=mp4]/best[height<={h}]",
            h = self.max_height
        )
    }

    async fn try_download(&self, url: &str) -> Result<PathBuf> {
        fs_err::create_dir_all(&self.videos_dir)?;

        let output_template = self.videos_dir.join("%(title)s.%(ext)s");

        tracing::debug!("Invoking yt-dlp for: {}", url);

        let output = Command::new(&self.yt_dlp_path)
            .args([
                "--output",
                &output_template.to_string_lossy(),
                "--format",
                &self.format_selector(),
                "--no-playlist",
                "--user-agent",
                USER_AGENT,
                // --print implies simulate unless told otherwise
                "--print",
                "after_move:filepath",
                "--no-simulate",
                url,
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(ReelscriptError::DownloadFailed(error.trim().to_string()).into());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let filepath = stdout
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or_else(|| {
                ReelscriptError::DownloadFailed("yt-dlp reported no output file".to_string())
            })?;

        Ok(PathBuf::from(filepath))
    }

    async fn try_extract(&self, video_path: &Path) -> Result<PathBuf> {
        fs_err::create_dir_all(&self.audio_dir)?;

        let stem = video_path.file_stem().ok_or_else(|| {
            ReelscriptError::AudioExtractionFailed(format!(
                "No file name in {}",
                video_path.display()
            ))
        })?;
        let audio_path = self
            .audio_dir
            .join(format!("{}.mp3", stem.to_string_lossy()));

        tracing::debug!("Invoking ffmpeg for: {}", video_path.display());

        let output = Command::new(&self.ffmpeg_path)
            .args(["-y", "-i"])
            .arg(video_path)
            .args(["-vn", "-codec:a", "libmp3lame", "-q:a", "2"])
            .arg(&audio_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(ReelscriptError::AudioExtractionFailed(error.trim().to_string()).into());
        }

        Ok(audio_path)
    }
}

#[async_trait]
impl MediaProvider for YtDlpDownloader {
    async fn download_video(&self, url: &str) -> Option<PathBuf> {
        match self.try_download(url).await {
            Ok(path) => {
                tracing::info!("Downloaded video to: {}", path.display());
                Some(path)
            }
            Err(e) => {
                tracing::error!("Download failed for {}: {:#}", url, e);
                None
            }
        }
    }

    async fn extract_audio(&self, video_path: &Path) -> Option<PathBuf> {
        match self.try_extract(video_path).await {
            Ok(path) => {
                tracing::info!("Extracted audio to: {}", path.display());
                Some(path)
            }
            Err(e) => {
                tracing::error!(
                    "Audio extraction failed for {}: {:#}",
                    video_path.display(),
                    e
                );
                None
            }
        }
    }
}
