//! Lexicon-based reference classifier for consultation comments.
//!
//! Deterministic stand-in for the production model: good enough for demos,
//! fixtures and the `analyze` endpoint, not a replacement for real
//! classification.

use econsult_core::{
    AspectSentiment, Classifier, ClassifierError, Sentiment, SentimentResult,
};

/// Word weights. Values in `(0.0, 1.0]` are positive, `[-1.0, 0.0)` negative.
/// English and Hindi share the table; keys are lowercase single words.
pub(crate) const LEXICON: &[(&str, f64)] = &[
    // Positive signals
    ("good", 0.3),
    ("great", 0.4),
    ("excellent", 0.5),
    ("welcome", 0.4),
    ("welcomed", 0.4),
    ("support", 0.4),
    ("supports", 0.4),
    ("appreciate", 0.4),
    ("helpful", 0.4),
    ("benefit", 0.3),
    ("beneficial", 0.4),
    ("relief", 0.3),
    ("clear", 0.3),
    ("simple", 0.3),
    ("simplified", 0.4),
    ("transparent", 0.4),
    ("fair", 0.3),
    ("improve", 0.3),
    ("improved", 0.4),
    ("progressive", 0.4),
    ("agree", 0.4),
    ("अच्छा", 0.4),
    ("अच्छी", 0.4),
    ("समर्थन", 0.4),
    ("स्वागत", 0.4),
    ("लाभ", 0.3),
    ("राहत", 0.3),
    // Negative signals
    ("bad", -0.4),
    ("poor", -0.4),
    ("burden", -0.5),
    ("burdensome", -0.5),
    ("confusing", -0.4),
    ("complex", -0.3),
    ("unclear", -0.4),
    ("unfair", -0.5),
    ("oppose", -0.5),
    ("against", -0.3),
    ("reject", -0.5),
    ("concern", -0.3),
    ("concerns", -0.3),
    ("problem", -0.3),
    ("harmful", -0.6),
    ("penalty", -0.4),
    ("delay", -0.3),
    ("delayed", -0.3),
    ("costly", -0.4),
    ("disagree", -0.4),
    ("बुरा", -0.4),
    ("विरोध", -0.5),
    ("समस्या", -0.3),
    ("बोझ", -0.5),
    ("जटिल", -0.4),
];

/// Negators flip the weight of the next lexicon word.
const NEGATORS: &[&str] = &["not", "no", "never", "nahi", "नहीं", "न"];

/// Aspect names and the keywords that signal them.
const ASPECT_KEYWORDS: &[(&str, &[&str])] = &[
    ("Tax Relief", &["tax", "taxes", "relief", "rebate", "exemption", "कर", "राहत"]),
    (
        "Compliance Burden",
        &["compliance", "burden", "paperwork", "audit", "penalty", "अनुपालन"],
    ),
    ("Digital Filing", &["digital", "online", "portal", "e-filing", "filing", "website"]),
    ("Small Business", &["msme", "msmes", "startup", "startups", "small", "व्यापार"]),
];

/// Scores whose magnitude is below this are neutral.
const NEUTRAL_BAND: f64 = 0.1;

const SUPPORTED_LANGUAGES: &[&str] = &["en", "hi"];

/// Score a text string using the lexicon.
///
/// Splits text into lowercase words, sums matching weights (negated after a
/// negator), and clamps the result to `[-1.0, 1.0]`. Returns `0.0` for empty or
/// unknown text.
#[must_use]
pub fn lexicon_score(text: &str) -> f64 {
    scored_words(text)
        .iter()
        .map(|(_, weight)| weight)
        .sum::<f64>()
        .clamp(-1.0, 1.0)
}

/// Words of `text` that hit the lexicon, as they appear in the text, with their
/// effective (negation-adjusted) weight.
fn scored_words(text: &str) -> Vec<(&str, f64)> {
    let mut hits = Vec::new();
    let mut negate = false;
    for raw in text.split_whitespace() {
        let word = raw.trim_matches(|c: char| !c.is_alphanumeric() && !is_mark(c));
        let lower = word.to_lowercase();
        if NEGATORS.contains(&lower.as_str()) {
            negate = true;
            continue;
        }
        if let Some(&(_, weight)) = LEXICON.iter().find(|(w, _)| *w == lower) {
            hits.push((word, if negate { -weight } else { weight }));
        }
        negate = false;
    }
    hits
}

/// Devanagari vowel signs are combining marks, not alphanumerics.
fn is_mark(c: char) -> bool {
    matches!(c, '\u{0900}'..='\u{0903}' | '\u{093A}'..='\u{094F}' | '\u{0951}'..='\u{0957}' | '\u{0962}'..='\u{0963}')
}

fn label(score: f64) -> (Sentiment, f64) {
    if score >= NEUTRAL_BAND {
        (Sentiment::Positive, 0.5 + score / 2.0)
    } else if score <= -NEUTRAL_BAND {
        (Sentiment::Negative, 0.5 - score / 2.0)
    } else {
        (Sentiment::Neutral, 1.0 - score.abs() * 5.0)
    }
}

fn sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split(['.', '!', '?', '।', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn mentions(sentence: &str, keywords: &[&str]) -> bool {
    sentence.split_whitespace().any(|raw| {
        let word = raw
            .trim_matches(|c: char| !c.is_alphanumeric() && !is_mark(c) && c != '-')
            .to_lowercase();
        keywords.contains(&word.as_str())
    })
}

/// Reference [`Classifier`] backed by [`LEXICON`] and [`ASPECT_KEYWORDS`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconClassifier;

impl Classifier for LexiconClassifier {
    fn classify(&self, text: &str, language: &str) -> Result<SentimentResult, ClassifierError> {
        let primary = language.split(['-', '_']).next().unwrap_or_default().to_ascii_lowercase();
        if !SUPPORTED_LANGUAGES.contains(&primary.as_str()) {
            return Err(ClassifierError::UnsupportedLanguage(language.to_string()));
        }
        if text.trim().is_empty() {
            return Err(ClassifierError::Failed("empty text".to_string()));
        }

        let hits = scored_words(text);
        let score = hits.iter().map(|(_, w)| w).sum::<f64>().clamp(-1.0, 1.0);
        let (sentiment, confidence) = label(score);

        let mut highlights: Vec<String> = Vec::new();
        for (word, weight) in &hits {
            let polar_match = match sentiment {
                Sentiment::Positive => *weight > 0.0,
                Sentiment::Negative => *weight < 0.0,
                Sentiment::Neutral => false,
            };
            if polar_match && !highlights.iter().any(|h| h == word) {
                highlights.push((*word).to_string());
            }
        }

        let aspects = ASPECT_KEYWORDS
            .iter()
            .filter_map(|(name, keywords)| {
                let relevant: Vec<&str> = sentences(text)
                    .filter(|s| mentions(s, keywords))
                    .collect();
                if relevant.is_empty() {
                    return None;
                }
                let (sentiment, confidence) = label(lexicon_score(&relevant.join(" ")));
                Some(AspectSentiment {
                    aspect_name: (*name).to_string(),
                    sentiment,
                    confidence,
                })
            })
            .collect();

        tracing::trace!(%sentiment, score, "lexicon classification");

        Ok(SentimentResult {
            sentiment,
            confidence,
            highlights,
            aspects,
        })
    }
}
