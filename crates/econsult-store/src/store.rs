use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use econsult_analysis::{
    AspectBucket, LanguageStats, Summary, Tally, TimelineBucket, TimelineOptions, WordCloud,
    WordCloudGenerator, WordCloudOptions, WordCloudSample,
};
use econsult_core::{Comment, NewComment};

use crate::filter::{CommentFilter, CommentSnapshot};
use crate::journal::Journal;
use crate::StoreError;

// ---------------------------------------------------------------------------
// Store state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Inner {
    log: Vec<Arc<Comment>>,
    tally: Tally,
    journal: Option<Journal>,
}

/// Append-only comment log with a derived aggregate cache.
///
/// Readers share a `RwLock`; `append` is the only writer. A comment becomes
/// visible to queries together with its counter updates, never partially.
#[derive(Debug, Default)]
pub struct CommentStore {
    inner: RwLock<Inner>,
}

impl CommentStore {
    /// A store that keeps comments in memory only.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a journal-backed store, replaying every stored comment.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the journal cannot be read or holds a corrupt
    /// or out-of-order entry.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let (journal, comments) = Journal::open(path)?;
        let tally = Tally::from_comments(&comments);
        let log = comments.into_iter().map(Arc::new).collect();

        Ok(Self {
            inner: RwLock::new(Inner {
                log,
                tally,
                journal: Some(journal),
            }),
        })
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Validate and append one classified comment.
    ///
    /// Validation happens before the lock is taken; a rejected comment never
    /// touches the journal or the log. If the journal write fails the comment
    /// is not stored either.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] for malformed input,
    /// [`StoreError::Unavailable`] if the store lock is poisoned, or a journal
    /// error.
    pub fn append(&self, new_comment: NewComment) -> Result<Arc<Comment>, StoreError> {
        let validated = new_comment.validate(Utc::now())?;

        let mut inner = self.write()?;
        let id = inner.log.len() as u64 + 1;
        let comment = Arc::new(validated.into_comment(id));

        if let Some(journal) = inner.journal.as_mut() {
            journal.append(&comment)?;
        }
        inner.tally.record(&comment);
        inner.log.push(Arc::clone(&comment));
        drop(inner);

        tracing::debug!(
            id,
            language = %comment.language,
            sentiment = %comment.sentiment,
            "appended comment"
        );
        Ok(comment)
    }

    /// Recompute the aggregate cache from the log.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the store lock is poisoned.
    pub fn rebuild_cache(&self) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        let rebuilt = Tally::from_comments(inner.log.iter().map(AsRef::as_ref));
        if rebuilt != inner.tally {
            tracing::warn!("aggregate cache diverged from the comment log; replaced");
        }
        inner.tally = rebuilt;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Total number of stored comments.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the store lock is poisoned.
    pub fn count(&self) -> Result<u64, StoreError> {
        Ok(self.read()?.log.len() as u64)
    }

    /// Snapshot of the comments matching `filter`, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the store lock is poisoned.
    pub fn query(&self, filter: CommentFilter) -> Result<CommentSnapshot, StoreError> {
        let comments = self.read()?.log.clone();
        Ok(CommentSnapshot::new(comments, filter))
    }

    /// One page of matching comments.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the store lock is poisoned.
    pub fn page(
        &self,
        filter: CommentFilter,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Comment>, StoreError> {
        let snapshot = self.query(filter)?;
        Ok(snapshot.iter().skip(offset).take(limit).cloned().collect())
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the store lock is poisoned.
    pub fn summary(&self) -> Result<Summary, StoreError> {
        Ok(self.read()?.tally.summary())
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the store lock is poisoned.
    pub fn timeline(&self, options: &TimelineOptions) -> Result<Vec<TimelineBucket>, StoreError> {
        Ok(self.read()?.tally.timeline(options))
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the store lock is poisoned.
    pub fn aspects(&self) -> Result<Vec<AspectBucket>, StoreError> {
        Ok(self.read()?.tally.aspects())
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the store lock is poisoned.
    pub fn language_stats(&self, threshold: u64) -> Result<LanguageStats, StoreError> {
        Ok(self.read()?.tally.language_stats(threshold))
    }

    /// Word cloud over the comments matching `filter`. Computed outside the lock.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the store lock is poisoned.
    pub fn word_cloud(
        &self,
        generator: &WordCloudGenerator,
        filter: CommentFilter,
        options: WordCloudOptions,
    ) -> Result<WordCloud, StoreError> {
        let snapshot = self.query(filter)?;
        Ok(generator.generate(snapshot.iter().map(WordCloudSample::from), options))
    }

    /// Copy of the current aggregate cache.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the store lock is poisoned.
    pub fn tally(&self) -> Result<Tally, StoreError> {
        Ok(self.read()?.tally.clone())
    }

    /// Path of the journal backing this store, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the store lock is poisoned.
    pub fn journal_path(&self) -> Result<Option<std::path::PathBuf>, StoreError> {
        Ok(self
            .read()?
            .journal
            .as_ref()
            .map(|j| j.path().to_path_buf()))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner.read().map_err(|_| StoreError::Unavailable)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner.write().map_err(|_| StoreError::Unavailable)
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
