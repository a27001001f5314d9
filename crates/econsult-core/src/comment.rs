use std::collections::HashSet;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Store-assigned, monotonically increasing comment identifier (first comment is 1).
pub type CommentId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "neutral" => Ok(Sentiment::Neutral),
            "negative" => Ok(Sentiment::Negative),
            other => Err(ValidationError::InvalidField {
                field: "sentiment",
                reason: format!("'{other}' is not one of positive, neutral, negative"),
            }),
        }
    }
}

/// Polarity of one named aspect within a comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectSentiment {
    pub aspect_name: String,
    pub sentiment: Sentiment,
    pub confidence: f64,
}

/// A classified comment. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub text: String,
    pub language: String,
    pub created_at: DateTime<Utc>,
    pub sentiment: Sentiment,
    pub confidence: f64,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub aspects: Vec<AspectSentiment>,
}

impl Comment {
    /// Calendar day (UTC) the comment was created on.
    #[must_use]
    pub fn created_date(&self) -> NaiveDate {
        self.created_at.date_naive()
    }

    /// Re-check a comment that did not come through [`NewComment::validate`],
    /// such as one read back from a journal.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found. A language that is valid
    /// but not in normalized form is also rejected.
    pub fn check(&self) -> Result<(), ValidationError> {
        check_text(&self.text)?;
        if normalize_language(&self.language)? != self.language {
            return Err(ValidationError::InvalidField {
                field: "language",
                reason: format!("'{}' is not normalized", self.language),
            });
        }
        check_confidence("confidence", self.confidence)?;
        check_highlights(&self.text, &self.highlights)?;

        let mut seen = HashSet::new();
        for aspect in &self.aspects {
            if aspect.aspect_name.trim() != aspect.aspect_name {
                return Err(ValidationError::InvalidField {
                    field: "aspects.aspect_name",
                    reason: format!("'{}' is not trimmed", aspect.aspect_name),
                });
            }
            check_aspect_name(&mut seen, &aspect.aspect_name)?;
            check_confidence("aspects.confidence", aspect.confidence)?;
        }
        Ok(())
    }
}

/// A comment that passed validation and is waiting for an id.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedComment {
    pub text: String,
    pub language: String,
    pub created_at: DateTime<Utc>,
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub highlights: Vec<String>,
    pub aspects: Vec<AspectSentiment>,
}

impl ValidatedComment {
    #[must_use]
    pub fn into_comment(self, id: CommentId) -> Comment {
        Comment {
            id,
            text: self.text,
            language: self.language,
            created_at: self.created_at,
            sentiment: self.sentiment,
            confidence: self.confidence,
            highlights: self.highlights,
            aspects: self.aspects,
        }
    }
}

/// Aspect entry as it arrives on the wire. `aspect` is accepted as an alias
/// for `aspect_name`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewAspect {
    #[serde(alias = "aspect")]
    pub aspect_name: Option<String>,
    pub sentiment: Option<String>,
    pub confidence: Option<f64>,
}

/// Ingestion payload for one classified comment.
///
/// Every field is optional on the wire so that a missing field is reported as a
/// [`ValidationError`] naming it, rather than as an opaque parse failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewComment {
    pub text: Option<String>,
    pub language: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub sentiment: Option<String>,
    pub confidence: Option<f64>,
    pub highlights: Option<Vec<String>>,
    pub aspects: Option<Vec<NewAspect>>,
}

impl NewComment {
    /// Check every field and normalize the language code.
    ///
    /// `now` is used when `created_at` is absent.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(self, now: DateTime<Utc>) -> Result<ValidatedComment, ValidationError> {
        let text = self.text.ok_or(ValidationError::MissingField("text"))?;
        check_text(&text)?;

        let language = normalize_language(
            self.language
                .as_deref()
                .ok_or(ValidationError::MissingField("language"))?,
        )?;

        let sentiment: Sentiment = self
            .sentiment
            .as_deref()
            .ok_or(ValidationError::MissingField("sentiment"))?
            .parse()?;

        let confidence = check_confidence(
            "confidence",
            self.confidence
                .ok_or(ValidationError::MissingField("confidence"))?,
        )?;

        let highlights = self.highlights.unwrap_or_default();
        check_highlights(&text, &highlights)?;

        let aspects = validate_aspects(self.aspects.unwrap_or_default())?;

        Ok(ValidatedComment {
            text,
            language,
            created_at: self.created_at.unwrap_or(now),
            sentiment,
            confidence,
            highlights,
            aspects,
        })
    }
}

fn validate_aspects(raw: Vec<NewAspect>) -> Result<Vec<AspectSentiment>, ValidationError> {
    let mut seen = HashSet::new();
    let mut aspects = Vec::with_capacity(raw.len());

    for aspect in raw {
        let name = aspect
            .aspect_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(ValidationError::MissingField("aspects.aspect_name"))?
            .to_string();

        check_aspect_name(&mut seen, &name)?;

        let sentiment: Sentiment = aspect
            .sentiment
            .as_deref()
            .ok_or(ValidationError::MissingField("aspects.sentiment"))?
            .parse()
            .map_err(|_| ValidationError::InvalidField {
                field: "aspects.sentiment",
                reason: format!("aspect '{name}' has an unknown sentiment"),
            })?;

        let confidence = check_confidence(
            "aspects.confidence",
            aspect
                .confidence
                .ok_or(ValidationError::MissingField("aspects.confidence"))?,
        )?;

        aspects.push(AspectSentiment {
            aspect_name: name,
            sentiment,
            confidence,
        });
    }

    Ok(aspects)
}

fn check_text(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "text",
            reason: "must not be blank".to_string(),
        });
    }
    Ok(())
}

/// Every highlight must be a non-blank, case-insensitive substring of `text`.
fn check_highlights(text: &str, highlights: &[String]) -> Result<(), ValidationError> {
    let haystack = text.to_lowercase();
    for highlight in highlights {
        if highlight.trim().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "highlights",
                reason: "highlights must not be blank".to_string(),
            });
        }
        if !haystack.contains(&highlight.to_lowercase()) {
            return Err(ValidationError::InvalidField {
                field: "highlights",
                reason: format!("'{highlight}' does not occur in the comment text"),
            });
        }
    }
    Ok(())
}

fn check_aspect_name(seen: &mut HashSet<String>, name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::MissingField("aspects.aspect_name"));
    }
    if !seen.insert(name.to_string()) {
        return Err(ValidationError::InvalidField {
            field: "aspects",
            reason: format!("duplicate aspect '{name}'"),
        });
    }
    Ok(())
}

fn check_confidence(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::InvalidField {
            field,
            reason: format!("{value} is outside [0, 1]"),
        })
    }
}

/// Normalize a language tag: trim, lowercase, `_` → `-`.
///
/// Accepts a 2–3 letter primary subtag optionally followed by alphanumeric
/// subtags of up to 8 characters (`en`, `hi`, `en-in`, `zh-hant`).
///
/// # Errors
///
/// Returns [`ValidationError`] if the tag is blank or malformed.
pub fn normalize_language(raw: &str) -> Result<String, ValidationError> {
    let tag = raw.trim().to_ascii_lowercase().replace('_', "-");
    if tag.is_empty() {
        return Err(ValidationError::MissingField("language"));
    }

    let mut parts = tag.split('-');
    let primary_ok = parts
        .next()
        .is_some_and(|p| (2..=3).contains(&p.len()) && p.chars().all(|c| c.is_ascii_lowercase()));
    let rest_ok =
        parts.all(|p| (1..=8).contains(&p.len()) && p.chars().all(|c| c.is_ascii_alphanumeric()));

    if primary_ok && rest_ok {
        Ok(tag)
    } else {
        Err(ValidationError::InvalidField {
            field: "language",
            reason: format!("'{}' is not a language code", raw.trim()),
        })
    }
}

#[cfg(test)]
#[path = "comment_test.rs"]
mod tests;
