use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::openai::OpenAiApi;

/// Minimum trimmed length for a segment to be worth classifying
const MIN_SEGMENT_CHARS: usize = 5;

/// Verdict for a single transcript segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Fact,
    Opinion,
    Neither,
}

impl Classification {
    /// Parse a model reply, tolerating case and trailing punctuation.
    /// Anything that is not recognizably "fact" or "opinion" counts as neither.
    pub fn from_reply(reply: &str) -> Self {
        match reply.trim().trim_end_matches('.').to_lowercase().as_str() {
            "fact" => Classification::Fact,
            "opinion" => Classification::Opinion,
            _ => Classification::Neither,
        }
    }
}

/// Facts and opinions collected from a transcript, in transcript order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptAnalysis {
    pub facts: Vec<String>,
    pub opinions: Vec<String>,
}

/// Classifies individual transcript segments
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SegmentClassifier: Send + Sync {
    /// Classify one segment; implementations never fail
    async fn classify_segment(&self, segment: &str) -> Classification;
}

/// Classifier backed by a one-word chat completion
pub struct ChatClassifier {
    api: Arc<OpenAiApi>,
    model: String,
}

impl ChatClassifier {
    pub fn new(api: Arc<OpenAiApi>, model: impl Into<String>) -> Self {
        Self {
            api,
            model: model.into(),
        }
    }
}

#[async_trait]
impl SegmentClassifier for ChatClassifier {
    async fn classify_segment(&self, segment: &str) -> Classification {
        let prompt = format!(
            "Classify this statement as 'fact', 'opinion', or 'neither'. Reply with only one word.\n\n{}",
            segment
        );

        // Service errors fall back to Neither so one bad segment never
        // aborts a transcript
        match self.api.chat_completion(&self.model, &prompt, 0.0).await {
            Ok(reply) => Classification::from_reply(&reply),
            Err(e) => {
                tracing::warn!("Classification error, defaulting to neither: {:#}", e);
                Classification::Neither
            }
        }
    }
}

/// Split text into sentence-like segments.
///
/// A segment ends after `.`, `!`, or `?` followed by whitespace; the
/// whitespace run between segments is consumed. Abbreviations, decimal
/// numbers, and quoted punctuation are not special-cased.
pub fn split_segments(text: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);

        if matches!(c, '.' | '!' | '?') && chars.peek().is_some_and(|next| next.is_whitespace()) {
            while chars.peek().is_some_and(|next| next.is_whitespace()) {
                chars.next();
            }
            segments.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        segments.push(current);
    }

    segments
}

/// Sort a transcript's segments into facts and opinions.
///
/// Segments are classified one at a time, in order, with no batching or
/// caching; short fragments are dropped as noise and `Neither` verdicts are
/// discarded.
pub async fn analyze_transcript(
    classifier: &dyn SegmentClassifier,
    transcript: &str,
) -> TranscriptAnalysis {
    let mut analysis = TranscriptAnalysis::default();

    for segment in split_segments(transcript) {
        if segment.trim().chars().count() < MIN_SEGMENT_CHARS {
            continue;
        }

        match classifier.classify_segment(&segment).await {
            Classification::Fact => analysis.facts.push(segment),
            Classification::Opinion => analysis.opinions.push(segment),
            Classification::Neither => {}
        }
    }

    analysis
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_sentence_punctuation_followed_by_whitespace() {
        let segments = split_segments("The sky is blue. I think cats are better than dogs.");
        assert_eq!(
            segments,
            vec![
                "The sky is blue.".to_string(),
                "I think cats are better than dogs.".to_string(),
            ]
        );
    }

    #[test]
    fn splitting_an_already_split_segment_is_idempotent() {
        let segment = "The sky is blue.";
        assert_eq!(split_segments(segment), vec![segment.to_string()]);

        let exclaim = "What a day!";
        assert_eq!(split_segments(exclaim), vec![exclaim.to_string()]);
    }

    #[test]
    fn mid_sentence_punctuation_without_whitespace_does_not_split() {
        let segments = split_segments("Version 2.0 shipped today! More soon.");
        assert_eq!(
            segments,
            vec!["Version 2.0 shipped today!".to_string(), "More soon.".to_string()]
        );
    }

    #[test]
    fn reply_parsing_tolerates_case_and_trailing_period() {
        assert_eq!(Classification::from_reply("Fact"), Classification::Fact);
        assert_eq!(Classification::from_reply("OPINION."), Classification::Opinion);
        assert_eq!(Classification::from_reply(" fact \n"), Classification::Fact);
        assert_eq!(
            Classification::from_reply("That would be a fact"),
            Classification::Neither
        );
        assert_eq!(Classification::from_reply(""), Classification::Neither);
    }

    #[tokio::test]
    async fn analyze_sorts_segments_into_facts_and_opinions() {
        let mut classifier = MockSegmentClassifier::new();
        classifier
            .expect_classify_segment()
            .times(2)
            .returning(|segment| {
                if segment.starts_with("The sky") {
                    Classification::Fact
                } else {
                    Classification::Opinion
                }
            });

        let analysis = analyze_transcript(
            &classifier,
            "The sky is blue. I think cats are better than dogs.",
        )
        .await;

        assert_eq!(analysis.facts, vec!["The sky is blue.".to_string()]);
        assert_eq!(
            analysis.opinions,
            vec!["I think cats are better than dogs.".to_string()]
        );
    }

    #[tokio::test]
    async fn short_segments_are_never_classified_or_kept() {
        let mut classifier = MockSegmentClassifier::new();
        // "Hi." is noise; only the long segment reaches the classifier
        classifier
            .expect_classify_segment()
            .times(1)
            .returning(|_| Classification::Fact);

        let analysis = analyze_transcript(&classifier, "Hi. Water boils at 100 degrees.").await;

        assert_eq!(analysis.facts, vec!["Water boils at 100 degrees.".to_string()]);
        assert!(analysis.opinions.is_empty());
    }

    #[tokio::test]
    async fn neither_verdicts_are_dropped() {
        let mut classifier = MockSegmentClassifier::new();
        classifier
            .expect_classify_segment()
            .returning(|_| Classification::Neither);

        let analysis = analyze_transcript(&classifier, "Umm, well, you know. So anyway.").await;

        assert!(analysis.facts.is_empty());
        assert!(analysis.opinions.is_empty());
    }

    #[tokio::test]
    async fn classifier_defaults_to_neither_when_the_service_is_unreachable() {
        // Nothing listens on this port, so every request errors out
        let api = Arc::new(OpenAiApi::new("http://127.0.0.1:9/v1", "test-key"));
        let classifier = ChatClassifier::new(api, "gpt-3.5-turbo");

        let verdict = classifier.classify_segment("The sky is blue.").await;
        assert_eq!(verdict, Classification::Neither);
    }
}
