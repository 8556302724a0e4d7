use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One stored news article. `link` is the identity: the store enforces a
/// unique index on it, so there is exactly one row per distinct link no
/// matter how many fetch cycles observe it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub link: String,
    pub source: String,
    pub published_date: Option<DateTime<Utc>>,
    pub content: String,
    pub summary: Option<String>,
    pub embedding: Option<Vec<f32>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A parsed, not-yet-deduplicated candidate article from a feed.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleDraft {
    pub title: String,
    pub link: String,
    pub source: String,
    pub published_date: Option<DateTime<Utc>>,
    pub content: String,
}

/// One daily synthesis document, keyed by calendar date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestEntry {
    pub id: i64,
    pub digest_date: NaiveDate,
    pub content: String,
    pub article_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Long-form piece derived from the latest digest. Not persisted; the length
/// metrics are computed over the returned text.
#[derive(Debug, Clone, Serialize)]
pub struct EditorialPiece {
    pub text: String,
    pub char_count: usize,
    pub word_count: usize,
}

/// Aggregate result of one ingestion run. `parsed` counts drafts before
/// deduplication; failures are collected per source rather than aborting
/// the run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    pub inserted: usize,
    pub parsed: usize,
    pub errors: Vec<SourceError>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceError {
    pub source: String,
    pub message: String,
}

/// Result of one summarization batch.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SummarizeReport {
    pub attempted: usize,
    pub succeeded: usize,
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "news-aggregator/0.1".to_string(),
            timeout_seconds: 30,
            max_retries: 2,
            retry_delay_ms: 500,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Generation rate limited")]
    RateLimited,

    #[error("Generation call timed out")]
    Timeout,

    #[error("Invalid generation response: {0}")]
    InvalidResponse(String),

    #[error("No articles in digest window for {0}")]
    EmptyDigestWindow(NaiveDate),

    #[error("No digest available yet")]
    NoDigestAvailable,

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
