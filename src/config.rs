use crate::types::FetchConfig;
use std::env;
use std::str::FromStr;

/// Application settings, read from the environment with sensible defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_articles_per_feed: usize,
    pub summary_batch_limit: i64,
    pub summary_max_tokens: u32,
    pub digest_max_tokens: u32,
    pub pacing_ms: u64,
    pub fetch: FetchConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://news_aggregator.db?mode=rwc".to_string(),
            max_articles_per_feed: 10,
            summary_batch_limit: 50,
            summary_max_tokens: 500,
            digest_max_tokens: 4000,
            pacing_ms: 500,
            fetch: FetchConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            max_articles_per_feed: env_parse("MAX_ARTICLES_PER_FEED", defaults.max_articles_per_feed),
            summary_batch_limit: env_parse("SUMMARY_BATCH_LIMIT", defaults.summary_batch_limit),
            summary_max_tokens: env_parse("SUMMARY_MAX_TOKENS", defaults.summary_max_tokens),
            digest_max_tokens: env_parse("DIGEST_MAX_TOKENS", defaults.digest_max_tokens),
            pacing_ms: env_parse("SUMMARY_PACING_MS", defaults.pacing_ms),
            fetch: defaults.fetch,
        }
    }
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}
