use async_trait::async_trait;
use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::analyzer::TranscriptAnalysis;
use crate::openai::OpenAiApi;
use crate::utils::sanitize_filename;
use crate::Result;

/// Maximum number of facts embedded in the script prompt
const MAX_FACTS: usize = 3;

/// Maximum number of opinions embedded in the script prompt
const MAX_OPINIONS: usize = 2;

/// Produces and persists short-form scripts
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScriptGenerator: Send + Sync {
    /// Generate a script from `analysis` and persist it under the video's title
    async fn generate_script(
        &self,
        analysis: &TranscriptAnalysis,
        title: &str,
    ) -> Option<PathBuf>;
}

/// Script generator backed by a chat completion model
pub struct ChatScriptGenerator {
    api: Arc<OpenAiApi>,
    model: String,
    scripts_dir: PathBuf,
}

impl ChatScriptGenerator {
    pub fn new(api: Arc<OpenAiApi>, model: impl Into<String>, scripts_dir: PathBuf) -> Self {
        Self {
            api,
            model: model.into(),
            scripts_dir,
        }
    }
}

/// Build the fixed reel-script prompt, embedding at most the first few
/// facts and opinions
pub fn build_prompt(analysis: &TranscriptAnalysis) -> String {
    let facts = analysis
        .facts
        .iter()
        .take(MAX_FACTS)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n");
    let opinions = analysis
        .opinions
        .iter()
        .take(MAX_OPINIONS)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Create a 30-second Instagram reel script using these elements. \
         Be descriptive and creative in visuals. Use real life scenarios of a person in visuals:\n\
         - Engaging hook in first 3 seconds\n\
         - 3 quick facts with visual suggestions\n\
         - 1-2 opinions with contrasting visuals\n\
         - Closing call-to-action\n\
         - Text overlays and emoji suggestions\n\
         \n\
         Facts:\n{facts}\n\
         \n\
         Opinions:\n{opinions}\n\
         \n\
         Format:\n[Visual]: Description | [Text]: \"Caption\" | [Voiceover]: Script"
    )
}

/// Write script content to `<scripts_dir>/<title>_<timestamp>.txt`,
/// creating the directory if needed
pub fn write_script(scripts_dir: &Path, title: &str, content: &str) -> Result<PathBuf> {
    fs_err::create_dir_all(scripts_dir)?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let filename = format!("{}_{}.txt", sanitize_filename(title), timestamp);
    let path = scripts_dir.join(filename);

    fs_err::write(&path, content)?;

    Ok(path)
}

#[async_trait]
impl ScriptGenerator for ChatScriptGenerator {
    async fn generate_script(
        &self,
        analysis: &TranscriptAnalysis,
        title: &str,
    ) -> Option<PathBuf> {
        let prompt = build_prompt(analysis);

        let script = match self.api.chat_completion(&self.model, &prompt, 0.7).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!("Script generation failed for '{}': {:#}", title, e);
                return None;
            }
        };

        match write_script(&self.scripts_dir, title, &script) {
            Ok(path) => {
                tracing::info!("Script written to: {}", path.display());
                Some(path)
            }
            Err(e) => {
                tracing::error!("Failed to write script for '{}': {:#}", title, e);
                None
            }
        }
    }
}
