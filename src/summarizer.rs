use crate::llm::TextGenerator;
use crate::store::Store;
use crate::types::{Article, Result, SummarizeReport};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_SUMMARY_MAX_TOKENS: u32 = 500;
pub const DEFAULT_PACING: Duration = Duration::from_millis(500);

/// Generates summaries for stored articles that have none. Calls are
/// strictly sequential with a fixed minimum delay between them to respect
/// the upstream API's request-rate constraints.
pub struct Summarizer {
    store: Arc<Store>,
    generator: Arc<dyn TextGenerator>,
    pacing: Duration,
    max_tokens: u32,
}

impl Summarizer {
    pub fn new(store: Arc<Store>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            store,
            generator,
            pacing: DEFAULT_PACING,
            max_tokens: DEFAULT_SUMMARY_MAX_TOKENS,
        }
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Process up to `limit` unsummarized articles. Each article is
    /// attempted exactly once; a failed generation call is logged and
    /// skipped so the article stays eligible for the next invocation.
    pub async fn run(&self, limit: i64) -> Result<SummarizeReport> {
        let batch = self.store.find_unsummarized(limit).await?;
        if batch.is_empty() {
            info!("No articles awaiting summarization");
            return Ok(SummarizeReport::default());
        }

        info!("Summarizing {} articles", batch.len());
        let mut report = SummarizeReport::default();

        for (index, article) in batch.iter().enumerate() {
            if index > 0 && !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }

            report.attempted += 1;

            let prompt = summary_prompt(&article.title, &article.content);
            let summary = match self.generator.generate(&prompt, self.max_tokens).await {
                Ok(summary) => summary,
                Err(e) => {
                    warn!("Summary generation failed for {}: {}", article.link, e);
                    continue;
                }
            };

            self.store.set_summary(article.id, &summary).await?;
            report.succeeded += 1;

            self.embed_article(article).await;
        }

        info!(
            "Summarization complete: {}/{} succeeded",
            report.succeeded, report.attempted
        );
        Ok(report)
    }

    // Best-effort: an embedding failure never un-sets the summary that was
    // just persisted.
    async fn embed_article(&self, article: &Article) {
        let text = format!("{}\n\n{}", article.title, article.content);
        match self.generator.embed(&text).await {
            Ok(embedding) => {
                if let Err(e) = self.store.set_embedding(article.id, &embedding).await {
                    warn!("Failed to store embedding for {}: {}", article.link, e);
                }
            }
            Err(e) => {
                warn!("Embedding generation failed for {}: {}", article.link, e);
            }
        }
    }
}

fn summary_prompt(title: &str, content: &str) -> String {
    format!(
        "Summarize this iGaming news article in 2-3 clear sentences. Focus on key facts.\n\n\
         Use simple formatting:\n\
         - Use **bold** for company names or important terms\n\
         - Keep it concise and readable\n\
         - No HTML tags\n\n\
         Article: {}\n\n\
         Content: {}",
        title, content
    )
}
