//! Aggregation and visualization-data engine for eConsult comments.
//!
//! Rolls classified comments up into summary counts, time buckets, aspect
//! breakdowns, language-representation statistics and sentiment-weighted word
//! clouds. Every view is available both as a full rescan over a comment slice
//! and from the incrementally maintained [`Tally`]; the two always agree.

pub mod aggregate;
pub mod language;
pub mod scorer;
pub mod tokenizer;
pub mod types;
pub mod wordcloud;

pub use aggregate::{rescan, Tally};
pub use language::language_stats;
pub use scorer::{lexicon_score, LexiconClassifier};
pub use tokenizer::{StopWords, Tokenizer};
pub use types::{
    AspectBucket, Granularity, LanguageStats, PolarityCounts, Summary, TimelineBucket,
    TimelineOptions,
};
pub use wordcloud::{
    WordCloud, WordCloudEntry, WordCloudGenerator, WordCloudOptions, WordCloudSample,
};
