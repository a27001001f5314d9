use crate::app_config::{AppConfig, Environment};
use crate::comment::normalize_language;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable is optional; defaults match [`AppConfig::default`].
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let defaults = AppConfig::default();

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional_path = |var: &str| -> Option<PathBuf> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: u64| -> Result<u64, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|e| invalid(var, e.to_string())),
            Err(_) => Ok(default),
        }
    };

    let parse_usize = |var: &str, default: usize| -> Result<usize, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|e| invalid(var, e.to_string())),
            Err(_) => Ok(default),
        }
    };

    let env = parse_environment(&or_default("ECONSULT_ENV", "development"))?;

    let bind_addr = or_default("ECONSULT_BIND_ADDR", &defaults.bind_addr.to_string())
        .parse::<SocketAddr>()
        .map_err(|e| invalid("ECONSULT_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("ECONSULT_LOG_LEVEL", &defaults.log_level);
    let journal_path = optional_path("ECONSULT_JOURNAL_PATH");
    let stopwords_path = optional_path("ECONSULT_STOPWORDS_PATH");

    let underrepresented_threshold = parse_u64(
        "ECONSULT_UNDERREPRESENTED_THRESHOLD",
        defaults.underrepresented_threshold,
    )?;
    let wordcloud_max_words =
        parse_usize("ECONSULT_WORDCLOUD_MAX_WORDS", defaults.wordcloud_max_words)?;
    let wordcloud_min_token_len = parse_usize(
        "ECONSULT_WORDCLOUD_MIN_TOKEN_LEN",
        defaults.wordcloud_min_token_len,
    )?;
    if wordcloud_min_token_len == 0 {
        return Err(invalid(
            "ECONSULT_WORDCLOUD_MIN_TOKEN_LEN",
            "must be at least 1".to_string(),
        ));
    }

    let default_language = normalize_language(&or_default(
        "ECONSULT_DEFAULT_LANGUAGE",
        &defaults.default_language,
    ))
    .map_err(|e| invalid("ECONSULT_DEFAULT_LANGUAGE", e.to_string()))?;

    let rate_limit_max_requests = parse_usize(
        "ECONSULT_RATE_LIMIT_MAX_REQUESTS",
        defaults.rate_limit_max_requests,
    )?;
    let rate_limit_window_secs = parse_u64(
        "ECONSULT_RATE_LIMIT_WINDOW_SECS",
        defaults.rate_limit_window_secs,
    )?;
    if rate_limit_window_secs == 0 {
        return Err(invalid(
            "ECONSULT_RATE_LIMIT_WINDOW_SECS",
            "must be at least 1".to_string(),
        ));
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        journal_path,
        underrepresented_threshold,
        wordcloud_max_words,
        wordcloud_min_token_len,
        stopwords_path,
        default_language,
        rate_limit_max_requests,
        rate_limit_window_secs,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "ECONSULT_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
