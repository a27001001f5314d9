//! Sentiment-weighted word clouds.

use std::collections::HashMap;

use econsult_core::{Comment, Sentiment};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::tokenizer::{StopWords, Tokenizer};

/// Polarity scores are accumulated in millionths of a confidence unit so that
/// equal positive and negative contributions cancel to exactly zero.
const SCORE_SCALE: f64 = 1_000_000.0;

/// One text in the population being summarized.
#[derive(Debug, Clone, Copy)]
pub struct WordCloudSample<'a> {
    pub text: &'a str,
    pub language: &'a str,
    pub sentiment: Sentiment,
    pub confidence: f64,
}

impl<'a> From<&'a Comment> for WordCloudSample<'a> {
    fn from(comment: &'a Comment) -> Self {
        Self {
            text: &comment.text,
            language: &comment.language,
            sentiment: comment.sentiment,
            confidence: comment.confidence,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordCloudOptions {
    pub max_words: usize,
    /// Tokens with fewer characters than this are dropped.
    pub min_token_len: usize,
}

impl Default for WordCloudOptions {
    fn default() -> Self {
        Self {
            max_words: 100,
            min_token_len: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordCloudEntry {
    pub word: String,
    pub count: u64,
    pub sentiment: Sentiment,
}

/// Ranked word-cloud entries: count descending, then word ascending.
///
/// Serializes as a JSON object `{word: {count, sentiment}}` in rank order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordCloud {
    pub entries: Vec<WordCloudEntry>,
}

impl WordCloud {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn get(&self, word: &str) -> Option<&WordCloudEntry> {
        self.entries.iter().find(|e| e.word == word)
    }
}

struct EntryInfo<'a>(&'a WordCloudEntry);

impl Serialize for EntryInfo<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut info = serializer.serialize_struct("WordInfo", 2)?;
        info.serialize_field("count", &self.0.count)?;
        info.serialize_field("sentiment", &self.0.sentiment)?;
        info.end()
    }
}

impl Serialize for WordCloud {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.word, &EntryInfo(entry))?;
        }
        map.end()
    }
}

#[derive(Debug, Default)]
struct TermStats {
    count: u64,
    score: i64,
}

#[derive(Debug, Clone, Default)]
pub struct WordCloudGenerator {
    tokenizer: Tokenizer,
    stopwords: StopWords,
}

impl WordCloudGenerator {
    #[must_use]
    pub fn new(stopwords: StopWords) -> Self {
        Self {
            tokenizer: Tokenizer::new(),
            stopwords,
        }
    }

    /// Summarize `samples` into at most `options.max_words` ranked terms.
    ///
    /// Each surviving token occurrence adds `+confidence` for a positive
    /// sample, `-confidence` for a negative one and nothing for a neutral one.
    /// The sign of the accumulated score gives the term's sentiment; an exact
    /// zero is neutral. An empty population yields an empty cloud.
    pub fn generate<'a, I>(&self, samples: I, options: WordCloudOptions) -> WordCloud
    where
        I: IntoIterator<Item = WordCloudSample<'a>>,
    {
        let mut terms: HashMap<String, TermStats> = HashMap::new();
        let mut sample_count = 0_usize;

        for sample in samples {
            sample_count += 1;
            let weight = signed_weight(sample.sentiment, sample.confidence);
            for token in self.tokenizer.tokens(sample.text) {
                if token.chars().count() < options.min_token_len
                    || self.stopwords.contains(sample.language, &token)
                {
                    continue;
                }
                let stats = terms.entry(token).or_default();
                stats.count += 1;
                stats.score += weight;
            }
        }

        let mut entries: Vec<WordCloudEntry> = terms
            .into_iter()
            .map(|(word, stats)| WordCloudEntry {
                word,
                count: stats.count,
                sentiment: match stats.score.signum() {
                    1 => Sentiment::Positive,
                    -1 => Sentiment::Negative,
                    _ => Sentiment::Neutral,
                },
            })
            .collect();
        let distinct = entries.len();

        entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
        entries.truncate(options.max_words);

        tracing::debug!(
            samples = sample_count,
            distinct_terms = distinct,
            returned = entries.len(),
            "generated word cloud"
        );

        WordCloud { entries }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn signed_weight(sentiment: Sentiment, confidence: f64) -> i64 {
    let magnitude = (confidence.clamp(0.0, 1.0) * SCORE_SCALE).round() as i64;
    match sentiment {
        Sentiment::Positive => magnitude,
        Sentiment::Negative => -magnitude,
        Sentiment::Neutral => 0,
    }
}

#[cfg(test)]
#[path = "wordcloud_test.rs"]
mod tests;
