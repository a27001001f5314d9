use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// JSON-lines journal backing the comment store. `None` keeps comments in memory only.
    pub journal_path: Option<PathBuf>,
    /// Languages with fewer comments than this are flagged as underrepresented.
    pub underrepresented_threshold: u64,
    pub wordcloud_max_words: usize,
    pub wordcloud_min_token_len: usize,
    /// Optional YAML file with extra stop words per language.
    pub stopwords_path: Option<PathBuf>,
    /// Language assumed for word-cloud texts that arrive without one.
    pub default_language: String,
    pub rate_limit_max_requests: usize,
    pub rate_limit_window_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            env: Environment::Development,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            log_level: "info".to_string(),
            journal_path: None,
            underrepresented_threshold: 10,
            wordcloud_max_words: 100,
            wordcloud_min_token_len: 3,
            stopwords_path: None,
            default_language: "en".to_string(),
            rate_limit_max_requests: 600,
            rate_limit_window_secs: 60,
        }
    }
}
