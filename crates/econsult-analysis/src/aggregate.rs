//! Summary, timeline and aspect aggregation.
//!
//! [`Tally`] is the incrementally maintained form: one `record` per appended
//! comment, O(1) amortized. [`rescan`] recomputes the same views from scratch.
//! A `Tally` is a cache; [`Tally::from_comments`] rebuilds it by replay.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use econsult_core::Comment;

use crate::language::language_stats;
use crate::types::{
    AspectBucket, LanguageStats, PolarityCounts, Summary, TimelineBucket, TimelineOptions,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    overall: PolarityCounts,
    by_day: BTreeMap<NaiveDate, PolarityCounts>,
    by_aspect: HashMap<String, PolarityCounts>,
    by_language: BTreeMap<String, u64>,
}

impl Tally {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replay `comments` into a fresh tally.
    pub fn from_comments<'a, I>(comments: I) -> Self
    where
        I: IntoIterator<Item = &'a Comment>,
    {
        let mut tally = Self::new();
        for comment in comments {
            tally.record(comment);
        }
        tally
    }

    /// Fold one comment into every counter.
    pub fn record(&mut self, comment: &Comment) {
        self.overall.record(comment.sentiment);
        self.by_day
            .entry(comment.created_date())
            .or_default()
            .record(comment.sentiment);
        for aspect in &comment.aspects {
            self.by_aspect
                .entry(aspect.aspect_name.clone())
                .or_default()
                .record(aspect.sentiment);
        }
        *self
            .by_language
            .entry(comment.language.clone())
            .or_default() += 1;
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.overall.total()
    }

    #[must_use]
    pub fn summary(&self) -> Summary {
        Summary::from(self.overall)
    }

    #[must_use]
    pub fn timeline(&self, options: &TimelineOptions) -> Vec<TimelineBucket> {
        let mut buckets: BTreeMap<NaiveDate, PolarityCounts> = BTreeMap::new();
        for (day, counts) in &self.by_day {
            if options.contains(*day) {
                buckets
                    .entry(options.granularity.truncate(*day))
                    .or_default()
                    .merge(*counts);
            }
        }
        fill_timeline(&buckets, options)
    }

    #[must_use]
    pub fn aspects(&self) -> Vec<AspectBucket> {
        rank_aspects(
            self.by_aspect
                .iter()
                .map(|(name, counts)| (name.clone(), *counts)),
        )
    }

    #[must_use]
    pub fn language_counts(&self) -> &BTreeMap<String, u64> {
        &self.by_language
    }

    #[must_use]
    pub fn language_stats(&self, threshold: u64) -> LanguageStats {
        language_stats(&self.by_language, threshold)
    }
}

/// Full-rescan forms of every aggregate. O(n) per call.
pub mod rescan {
    use super::{
        fill_timeline, language_stats, rank_aspects, AspectBucket, BTreeMap, Comment, HashMap,
        LanguageStats, NaiveDate, PolarityCounts, Summary, TimelineBucket, TimelineOptions,
    };

    pub fn summary<'a, I>(comments: I) -> Summary
    where
        I: IntoIterator<Item = &'a Comment>,
    {
        let mut counts = PolarityCounts::default();
        for comment in comments {
            counts.record(comment.sentiment);
        }
        Summary::from(counts)
    }

    pub fn timeline<'a, I>(comments: I, options: &TimelineOptions) -> Vec<TimelineBucket>
    where
        I: IntoIterator<Item = &'a Comment>,
    {
        let mut buckets: BTreeMap<NaiveDate, PolarityCounts> = BTreeMap::new();
        for comment in comments {
            let day = comment.created_date();
            if options.contains(day) {
                buckets
                    .entry(options.granularity.truncate(day))
                    .or_default()
                    .record(comment.sentiment);
            }
        }
        fill_timeline(&buckets, options)
    }

    pub fn aspects<'a, I>(comments: I) -> Vec<AspectBucket>
    where
        I: IntoIterator<Item = &'a Comment>,
    {
        let mut by_aspect: HashMap<&str, PolarityCounts> = HashMap::new();
        for comment in comments {
            for aspect in &comment.aspects {
                by_aspect
                    .entry(aspect.aspect_name.as_str())
                    .or_default()
                    .record(aspect.sentiment);
            }
        }
        rank_aspects(
            by_aspect
                .into_iter()
                .map(|(name, counts)| (name.to_string(), counts)),
        )
    }

    pub fn language_stats_of<'a, I>(comments: I, threshold: u64) -> LanguageStats
    where
        I: IntoIterator<Item = &'a Comment>,
    {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for comment in comments {
            *counts.entry(comment.language.clone()).or_default() += 1;
        }
        language_stats(&counts, threshold)
    }
}

/// Turn sparse buckets into the output axis: zero-filled from the first to the
/// last populated bucket unless `skip_empty` is set.
fn fill_timeline(
    buckets: &BTreeMap<NaiveDate, PolarityCounts>,
    options: &TimelineOptions,
) -> Vec<TimelineBucket> {
    if options.skip_empty {
        return buckets
            .iter()
            .filter(|(_, counts)| counts.total() > 0)
            .map(|(date, counts)| TimelineBucket {
                date: *date,
                counts: *counts,
            })
            .collect();
    }

    let (Some((&first, _)), Some((&last, _))) =
        (buckets.first_key_value(), buckets.last_key_value())
    else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let mut cursor = Some(first);
    while let Some(date) = cursor.filter(|d| *d <= last) {
        out.push(TimelineBucket {
            date,
            counts: buckets.get(&date).copied().unwrap_or_default(),
        });
        cursor = options.granularity.next(date);
    }
    out
}

/// Sort by total mentions descending, then aspect name ascending.
fn rank_aspects<I>(aspects: I) -> Vec<AspectBucket>
where
    I: Iterator<Item = (String, PolarityCounts)>,
{
    let mut ranked: Vec<AspectBucket> = aspects
        .map(|(aspect, counts)| AspectBucket { aspect, counts })
        .collect();
    ranked.sort_by(|a, b| {
        b.counts
            .total()
            .cmp(&a.counts.total())
            .then_with(|| a.aspect.cmp(&b.aspect))
    });
    ranked
}

#[cfg(test)]
#[path = "aggregate_test.rs"]
mod tests;
