use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OpenAI service configuration
    pub openai: OpenAiConfig,

    /// On-disk locations for pipeline artifacts
    pub storage: StorageConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Base URL of the OpenAI-compatible API
    pub api_base: String,

    /// Model used for script generation
    pub script_model: String,

    /// Model used for one-word segment classification
    pub classifier_model: String,

    /// Model used for audio transcription
    pub transcription_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for downloaded videos
    pub videos_dir: PathBuf,

    /// Directory for extracted audio
    pub audio_dir: PathBuf,

    /// Directory for generated scripts
    pub scripts_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// URL list consumed by `run` when no file is given on the command line
    pub urls_file: PathBuf,

    /// Maximum video resolution requested from the downloader
    pub max_video_height: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai: OpenAiConfig {
                api_base: "https://api.openai.com/v1".to_string(),
                script_model: "gpt-4".to_string(),
                classifier_model: "gpt-3.5-turbo".to_string(),
                transcription_model: "whisper-1".to_string(),
            },
            storage: StorageConfig {
                videos_dir: PathBuf::from("inputs/videos"),
                audio_dir: PathBuf::from("inputs/audio"),
                scripts_dir: PathBuf::from("outputs/scripts"),
            },
            app: AppConfig {
                urls_file: PathBuf::from("urls.txt"),
                max_video_height: 360,
            },
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            let config: Config = serde_yaml::from_str(&content)
                .context("Failed to parse config file")?;

            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save().await?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(&config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("reelscript").join("config.yaml"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        Url::parse(&self.openai.api_base)
            .with_context(|| format!("Invalid OpenAI API base URL: {}", self.openai.api_base))?;

        if self.openai.script_model.is_empty() || self.openai.classifier_model.is_empty() {
            anyhow::bail!("Chat model names must not be empty");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  API Base: {}", self.openai.api_base);
        println!("  Script Model: {}", self.openai.script_model);
        println!("  Classifier Model: {}", self.openai.classifier_model);
        println!("  Transcription Model: {}", self.openai.transcription_model);
        println!("  Videos Dir: {}", self.storage.videos_dir.display());
        println!("  Audio Dir: {}", self.storage.audio_dir.display());
        println!("  Scripts Dir: {}", self.storage.scripts_dir.display());
        println!("  URL List: {}", self.app.urls_file.display());
        println!("  Max Video Height: {}", self.app.max_video_height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn bad_api_base_is_rejected() {
        let mut config = Config::default();
        config.openai.api_base = "not-a-url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_round_trips_through_yaml() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.openai.script_model, config.openai.script_model);
        assert_eq!(parsed.storage.scripts_dir, config.storage.scripts_dir);
    }
}
