//! Bulk loading of comments from files into the journal-backed store.

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use econsult_core::{Classifier, ClassifierError, NewComment};
use econsult_store::CommentStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Rejection {
    pub line: usize,
    pub reason: String,
}

/// Outcome of loading one file. Rejected lines are reported, not fatal.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct IngestReport {
    pub accepted: usize,
    pub rejected: Vec<Rejection>,
}

impl IngestReport {
    fn reject(&mut self, line: usize, reason: impl Into<String>) {
        self.rejected.push(Rejection {
            line,
            reason: reason.into(),
        });
    }

    pub(crate) fn write(&self, out: &mut impl Write, dry_run: bool) -> std::io::Result<()> {
        if dry_run {
            writeln!(
                out,
                "dry-run: {} comments valid, {} rejected; nothing appended",
                self.accepted,
                self.rejected.len()
            )?;
        } else {
            writeln!(
                out,
                "ingested {} comments, rejected {}",
                self.accepted,
                self.rejected.len()
            )?;
        }
        for rejection in &self.rejected {
            writeln!(out, "  line {}: {}", rejection.line, rejection.reason)?;
        }
        Ok(())
    }
}

/// Validate and append every non-blank line of a JSON-lines file.
///
/// Lines that are not valid JSON or fail validation are recorded in the report
/// and skipped. With `dry_run`, lines are only validated.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the store fails for a
/// reason other than bad input.
pub(crate) fn ingest_file(
    store: &CommentStore,
    path: &Path,
    dry_run: bool,
) -> anyhow::Result<IngestReport> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let now = Utc::now();
    let mut report = IngestReport::default();

    for (index, raw) in content.lines().enumerate() {
        let line = index + 1;
        if raw.trim().is_empty() {
            continue;
        }

        let new_comment: NewComment = match serde_json::from_str(raw) {
            Ok(comment) => comment,
            Err(e) => {
                report.reject(line, format!("invalid JSON: {e}"));
                continue;
            }
        };

        if dry_run {
            match new_comment.validate(now) {
                Ok(_) => report.accepted += 1,
                Err(e) => report.reject(line, e.to_string()),
            }
            continue;
        }

        match store.append(new_comment) {
            Ok(_) => report.accepted += 1,
            Err(e) if e.is_validation() => report.reject(line, e.to_string()),
            Err(e) => return Err(e).with_context(|| format!("failed to append line {line}")),
        }
    }

    tracing::info!(
        path = %path.display(),
        accepted = report.accepted,
        rejected = report.rejected.len(),
        dry_run,
        "ingest finished"
    );
    Ok(report)
}

/// Classify each non-blank line of a plain-text file and append the result.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the classifier does not
/// support `language`, or the store fails for a reason other than bad input.
pub(crate) fn analyze_file(
    store: &CommentStore,
    classifier: &dyn Classifier,
    path: &Path,
    language: &str,
) -> anyhow::Result<IngestReport> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mut report = IngestReport::default();

    for (index, raw) in content.lines().enumerate() {
        let line = index + 1;
        let text = raw.trim();
        if text.is_empty() {
            continue;
        }

        let result = match classifier.classify(text, language) {
            Ok(result) => result,
            Err(e @ ClassifierError::UnsupportedLanguage(_)) => return Err(e.into()),
            Err(e) => {
                report.reject(line, e.to_string());
                continue;
            }
        };

        let payload = result.into_new_comment(text.to_string(), language.to_string(), None);
        match store.append(payload) {
            Ok(_) => report.accepted += 1,
            Err(e) if e.is_validation() => report.reject(line, e.to_string()),
            Err(e) => return Err(e).with_context(|| format!("failed to append line {line}")),
        }
    }

    tracing::info!(
        path = %path.display(),
        language,
        accepted = report.accepted,
        rejected = report.rejected.len(),
        "analyze finished"
    );
    Ok(report)
}
