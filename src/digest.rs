use crate::llm::TextGenerator;
use crate::store::Store;
use crate::types::{Article, DigestEntry, PipelineError, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_DIGEST_MAX_TOKENS: u32 = 4000;

/// Builds the daily synthesis: one generation call over every article first
/// seen on the target date, persisted keyed by that date. Rebuilding a date
/// replaces the existing entry outright.
pub struct DigestBuilder {
    store: Arc<Store>,
    generator: Arc<dyn TextGenerator>,
    max_tokens: u32,
}

impl DigestBuilder {
    pub fn new(store: Arc<Store>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            store,
            generator,
            max_tokens: DEFAULT_DIGEST_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Build and persist the digest for a date. Fails with
    /// `EmptyDigestWindow` — and writes nothing — when the date's window
    /// holds no articles.
    pub async fn build(&self, date: NaiveDate) -> Result<DigestEntry> {
        let (start, end) = day_bounds(date);
        let articles = self.store.find_created_between(start, end).await?;

        if articles.is_empty() {
            return Err(PipelineError::EmptyDigestWindow(date));
        }

        info!("Creating digest for {} from {} articles", date, articles.len());

        let prompt = digest_prompt(&articles);
        let content = self.generator.generate(&prompt, self.max_tokens).await?;

        let entry = self
            .store
            .upsert_digest(date, &content, articles.len() as i64)
            .await?;

        info!("Digest for {} saved ({} articles)", date, entry.article_count);
        Ok(entry)
    }
}

/// UTC day window for a digest date.
fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

fn digest_prompt(articles: &[Article]) -> String {
    let mut listing = String::new();
    for (index, article) in articles.iter().enumerate() {
        listing.push_str(&format!(
            "{}. **{}** (Source: {})\n",
            index + 1,
            article.title,
            article.source
        ));
        if let Some(summary) = &article.summary {
            listing.push_str(&format!("   Summary: {}\n", summary));
        } else if !article.content.is_empty() {
            let excerpt: String = article.content.chars().take(500).collect();
            listing.push_str(&format!("   Content: {}...\n", excerpt));
        }
    }

    format!(
        "You are an iGaming industry analyst. Create a professional daily digest from these \
         news articles. Group by topics (regulations, mergers and acquisitions, product \
         launches, market moves). Highlight the most important developments. Keep it concise \
         but informative.\n\nArticles:\n{}",
        listing
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_bounds_cover_exactly_one_utc_day() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 3).expect("valid date");
        let (start, end) = day_bounds(date);

        assert_eq!(start.to_rfc3339(), "2026-08-03T00:00:00+00:00");
        assert_eq!(end - start, Duration::days(1));
    }

    #[test]
    fn digest_prompt_prefers_summary_over_content() {
        let base = Utc::now();
        let summarized = Article {
            id: 1,
            title: "Casino X fined".to_string(),
            link: "https://example.com/1".to_string(),
            source: "Test".to_string(),
            published_date: None,
            content: "raw content".to_string(),
            summary: Some("A crisp summary.".to_string()),
            embedding: None,
            created_at: base,
            updated_at: base,
        };
        let mut unsummarized = summarized.clone();
        unsummarized.id = 2;
        unsummarized.title = "Operator expands".to_string();
        unsummarized.summary = None;

        let prompt = digest_prompt(&[summarized, unsummarized]);

        assert!(prompt.contains("1. **Casino X fined** (Source: Test)"));
        assert!(prompt.contains("Summary: A crisp summary."));
        assert!(prompt.contains("2. **Operator expands**"));
        assert!(prompt.contains("Content: raw content..."));
    }
}
