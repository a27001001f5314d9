use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};
use econsult_core::Sentiment;
use serde::{Deserialize, Serialize};

/// Per-polarity counters shared by every bucketed view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PolarityCounts {
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
}

impl PolarityCounts {
    pub fn record(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Neutral => self.neutral += 1,
            Sentiment::Negative => self.negative += 1,
        }
    }

    pub fn merge(&mut self, other: PolarityCounts) {
        self.positive += other.positive;
        self.neutral += other.neutral;
        self.negative += other.negative;
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.positive + self.neutral + self.negative
    }
}

/// Overall sentiment partition of the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: u64,
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
}

impl From<PolarityCounts> for Summary {
    fn from(counts: PolarityCounts) -> Self {
        Self {
            total: counts.total(),
            positive: counts.positive,
            neutral: counts.neutral,
            negative: counts.negative,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineBucket {
    /// First day of the bucket.
    pub date: NaiveDate,
    #[serde(flatten)]
    pub counts: PolarityCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AspectBucket {
    pub aspect: String,
    #[serde(flatten)]
    pub counts: PolarityCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LanguageStats {
    pub language_counts: BTreeMap<String, u64>,
    /// Languages below the threshold, ascending by count then code.
    pub underrepresented: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Day,
    Week,
    Month,
}

impl Granularity {
    /// Start of the bucket containing `date`. Weeks start on Monday.
    #[must_use]
    pub fn truncate(self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Day => date,
            Granularity::Week => date - Days::new(u64::from(date.weekday().num_days_from_monday())),
            Granularity::Month => date.with_day(1).unwrap_or(date),
        }
    }

    /// Start of the bucket following the one starting at `bucket_start`.
    #[must_use]
    pub fn next(self, bucket_start: NaiveDate) -> Option<NaiveDate> {
        match self {
            Granularity::Day => bucket_start.succ_opt(),
            Granularity::Week => bucket_start.checked_add_days(Days::new(7)),
            Granularity::Month => bucket_start.checked_add_months(Months::new(1)),
        }
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Granularity::Day),
            "week" => Ok(Granularity::Week),
            "month" => Ok(Granularity::Month),
            other => Err(format!("unknown granularity '{other}'; expected day, week or month")),
        }
    }
}

/// Timeline query shape. `from`/`to` are inclusive calendar days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimelineOptions {
    pub granularity: Granularity,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Drop zero-count buckets instead of filling the axis.
    pub skip_empty: bool,
}

impl TimelineOptions {
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}
