use std::sync::Arc;

use chrono::NaiveDate;
use econsult_core::{Comment, Sentiment};

/// Optional constraints for [`CommentStore::query`](crate::CommentStore::query).
/// `from`/`to` are inclusive calendar days (UTC).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentFilter {
    pub language: Option<String>,
    pub sentiment: Option<Sentiment>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl CommentFilter {
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    #[must_use]
    pub fn sentiment(mut self, sentiment: Sentiment) -> Self {
        self.sentiment = Some(sentiment);
        self
    }

    #[must_use]
    pub fn between(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    #[must_use]
    pub fn matches(&self, comment: &Comment) -> bool {
        let day = comment.created_date();
        self.language
            .as_deref()
            .is_none_or(|language| comment.language == language)
            && self.sentiment.is_none_or(|s| comment.sentiment == s)
            && self.from.is_none_or(|from| day >= from)
            && self.to.is_none_or(|to| day <= to)
    }
}

/// A consistent, restartable view of the comments present when the snapshot
/// was taken. Later appends never show up in it.
#[derive(Debug, Clone)]
pub struct CommentSnapshot {
    comments: Vec<Arc<Comment>>,
    filter: CommentFilter,
}

impl CommentSnapshot {
    pub(crate) fn new(comments: Vec<Arc<Comment>>, filter: CommentFilter) -> Self {
        Self { comments, filter }
    }

    /// Matching comments in insertion order. Can be called any number of times.
    #[must_use]
    pub fn iter(&self) -> SnapshotIter<'_> {
        SnapshotIter {
            inner: self.comments.iter(),
            filter: &self.filter,
        }
    }

    #[must_use]
    pub fn filter(&self) -> &CommentFilter {
        &self.filter
    }
}

impl<'a> IntoIterator for &'a CommentSnapshot {
    type Item = &'a Comment;
    type IntoIter = SnapshotIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct SnapshotIter<'a> {
    inner: std::slice::Iter<'a, Arc<Comment>>,
    filter: &'a CommentFilter,
}

impl<'a> Iterator for SnapshotIter<'a> {
    type Item = &'a Comment;

    fn next(&mut self) -> Option<Self::Item> {
        let filter = self.filter;
        self.inner
            .by_ref()
            .map(AsRef::as_ref)
            .find(|comment| filter.matches(comment))
    }
}
