//! Domain types, ingestion validation and configuration shared by every
//! eConsult crate.

pub mod app_config;
pub mod classifier;
pub mod comment;
pub mod config;

pub use app_config::{AppConfig, Environment};
pub use classifier::{Classifier, ClassifierError, SentimentResult};
pub use comment::{
    normalize_language, AspectSentiment, Comment, CommentId, NewAspect, NewComment, Sentiment,
    ValidatedComment,
};
pub use config::{load_app_config, load_app_config_from_env};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read stop-word file {path}: {source}")]
    StopwordsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse stop-word file: {0}")]
    StopwordsFileParse(String),
}

/// A classified comment failed ingestion checks; nothing was stored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid value for {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}
