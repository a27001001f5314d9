//! Capability interface for the upstream sentiment/aspect classifier.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::comment::{AspectSentiment, NewAspect, NewComment, Sentiment};

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("language '{0}' is not supported by this classifier")]
    UnsupportedLanguage(String),

    #[error("classifier failed: {0}")]
    Failed(String),
}

/// Output of one classification call.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentResult {
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub highlights: Vec<String>,
    pub aspects: Vec<AspectSentiment>,
}

impl SentimentResult {
    /// Combine the classification with its source text into an ingestion payload.
    ///
    /// The payload still goes through [`NewComment::validate`] on append.
    #[must_use]
    pub fn into_new_comment(
        self,
        text: String,
        language: String,
        created_at: Option<DateTime<Utc>>,
    ) -> NewComment {
        NewComment {
            text: Some(text),
            language: Some(language),
            created_at,
            sentiment: Some(self.sentiment.as_str().to_string()),
            confidence: Some(self.confidence),
            highlights: Some(self.highlights),
            aspects: Some(
                self.aspects
                    .into_iter()
                    .map(|a| NewAspect {
                        aspect_name: Some(a.aspect_name),
                        sentiment: Some(a.sentiment.as_str().to_string()),
                        confidence: Some(a.confidence),
                    })
                    .collect(),
            ),
        }
    }
}

/// Anything that can label a comment. Implementations must be deterministic for
/// a given input so engine tests can rely on fakes.
pub trait Classifier: Send + Sync {
    /// Classify `text` written in `language`.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError`] when the text cannot be classified.
    fn classify(&self, text: &str, language: &str) -> Result<SentimentResult, ClassifierError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysPositive;

    impl Classifier for AlwaysPositive {
        fn classify(&self, text: &str, _language: &str) -> Result<SentimentResult, ClassifierError> {
            let first = text.split_whitespace().next().unwrap_or_default().to_string();
            Ok(SentimentResult {
                sentiment: Sentiment::Positive,
                confidence: 0.9,
                highlights: vec![first],
                aspects: vec![AspectSentiment {
                    aspect_name: "General".to_string(),
                    sentiment: Sentiment::Positive,
                    confidence: 0.9,
                }],
            })
        }
    }

    #[test]
    fn classifier_output_round_trips_through_validation() {
        let classifier = AlwaysPositive;
        let result = classifier.classify("Welcome change", "en").unwrap();
        let payload = result.into_new_comment("Welcome change".to_string(), "en".to_string(), None);
        let validated = payload.validate(Utc::now()).expect("classifier output is valid");
        assert_eq!(validated.sentiment, Sentiment::Positive);
        assert_eq!(validated.highlights, vec!["Welcome".to_string()]);
        assert_eq!(validated.aspects[0].aspect_name, "General");
    }
}
