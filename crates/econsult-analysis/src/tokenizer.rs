//! Language-aware text segmentation and stop-word filtering for word clouds.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use econsult_core::ConfigError;
use regex::Regex;
use serde::Deserialize;

const ENGLISH_STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "cannot", "could", "did", "do", "does", "doing", "down", "during", "each",
    "few", "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
    "him", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just", "may",
    "me", "might", "more", "most", "must", "my", "no", "nor", "not", "now", "of", "off", "on",
    "once", "only", "or", "other", "our", "ours", "out", "over", "own", "same", "shall", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them", "then",
    "there", "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
    "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom", "why",
    "will", "with", "would", "you", "your", "yours",
];

const HINDI_STOPWORDS: &[&str] = &[
    "और", "का", "की", "के", "को", "है", "हैं", "था", "थी", "थे", "में", "से", "पर", "यह", "वह",
    "ये", "वे", "भी", "नहीं", "एक", "लिए", "तो", "ही", "जो", "कि", "कर", "किया", "करने", "गया",
    "हो", "होता", "होती", "होने", "रहा", "रही", "रहे", "इस", "उस", "इसे", "उसे", "साथ", "तक",
    "अपने", "अपनी", "या", "लेकिन", "अब", "जब", "तब", "कुछ", "सभी", "बहुत", "द्वारा", "हम",
    "आप", "मैं",
];

/// Per-language stop-word sets keyed by primary language subtag.
#[derive(Debug, Clone)]
pub struct StopWords {
    by_language: HashMap<String, HashSet<String>>,
}

#[derive(Debug, Deserialize)]
struct StopWordsFile {
    #[serde(default)]
    stopwords: HashMap<String, Vec<String>>,
}

impl Default for StopWords {
    fn default() -> Self {
        Self::builtin()
    }
}

impl StopWords {
    /// Built-in English and Hindi lists.
    #[must_use]
    pub fn builtin() -> Self {
        let mut by_language = HashMap::new();
        by_language.insert("en".to_string(), to_set(ENGLISH_STOPWORDS));
        by_language.insert("hi".to_string(), to_set(HINDI_STOPWORDS));
        Self { by_language }
    }

    /// Built-in lists extended with a YAML file of the form
    /// `stopwords: { en: [word, ...], ta: [...] }`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn builtin_with_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::StopwordsFileIo {
                path: path.display().to_string(),
                source: e,
            })?;
        let mut stopwords = Self::builtin();
        stopwords.extend_from_yaml(&content)?;
        Ok(stopwords)
    }

    /// Merge extra stop words from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::StopwordsFileParse`] on malformed YAML.
    pub fn extend_from_yaml(&mut self, yaml: &str) -> Result<(), ConfigError> {
        let file: StopWordsFile = serde_yaml::from_str(yaml)
            .map_err(|e| ConfigError::StopwordsFileParse(e.to_string()))?;

        for (language, words) in file.stopwords {
            let key = primary_subtag(&language);
            let added = words.len();
            self.by_language
                .entry(key.clone())
                .or_default()
                .extend(words.into_iter().map(|w| w.trim().to_lowercase()));
            tracing::debug!(language = %key, added, "loaded extra stop words");
        }
        Ok(())
    }

    /// Whether `token` (already lowercased) is a stop word for `language`.
    #[must_use]
    pub fn contains(&self, language: &str, token: &str) -> bool {
        self.by_language
            .get(&primary_subtag(language))
            .is_some_and(|set| set.contains(token))
    }
}

fn to_set(words: &[&str]) -> HashSet<String> {
    words.iter().map(|w| (*w).to_string()).collect()
}

/// `en-IN` → `en`.
fn primary_subtag(language: &str) -> String {
    language
        .trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Splits text into lowercase word tokens.
///
/// A token is a run of Unicode letters, combining marks and digits, so
/// Devanagari vowel signs stay attached to their consonants. Apostrophes
/// between letters are kept (`don't`).
#[derive(Debug, Clone)]
pub struct Tokenizer {
    word: Regex,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    #[must_use]
    pub fn new() -> Self {
        let word = Regex::new(r"[\p{L}\p{M}\p{N}]+(?:['’][\p{L}\p{M}\p{N}]+)*").expect("valid regex");
        Self { word }
    }

    pub fn tokens<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        self.word.find_iter(text).map(|m| m.as_str().to_lowercase())
    }
}
