use crate::config::AppConfig;
use crate::digest::DigestBuilder;
use crate::editorial::EditorialBuilder;
use crate::fetcher::Fetcher;
use crate::ingest::Ingestor;
use crate::llm::TextGenerator;
use crate::search::{self, SearchHit};
use crate::sources::FeedSource;
use crate::store::Store;
use crate::summarizer::Summarizer;
use crate::types::{DigestEntry, EditorialPiece, IngestReport, Result, SummarizeReport};
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;

/// Wires the pipeline stages together around one store and one generator.
/// This is the surface the API layer calls; each method is an independent
/// short-lived batch operation.
pub struct NewsPipeline {
    store: Arc<Store>,
    generator: Arc<dyn TextGenerator>,
    sources: Vec<FeedSource>,
    ingestor: Ingestor,
    summarizer: Summarizer,
    digest: DigestBuilder,
    editorial: EditorialBuilder,
}

impl NewsPipeline {
    pub fn new(
        store: Arc<Store>,
        generator: Arc<dyn TextGenerator>,
        sources: Vec<FeedSource>,
        config: &AppConfig,
    ) -> Self {
        let fetcher = Arc::new(Fetcher::new(config.fetch.clone()));
        let ingestor = Ingestor::new(fetcher, store.clone())
            .with_max_per_feed(config.max_articles_per_feed);
        let summarizer = Summarizer::new(store.clone(), generator.clone())
            .with_pacing(Duration::from_millis(config.pacing_ms))
            .with_max_tokens(config.summary_max_tokens);
        let digest = DigestBuilder::new(store.clone(), generator.clone())
            .with_max_tokens(config.digest_max_tokens);
        let editorial = EditorialBuilder::new(store.clone(), generator.clone());

        Self {
            store,
            generator,
            sources,
            ingestor,
            summarizer,
            digest,
            editorial,
        }
    }

    /// Fetch every registered feed, dedup and persist new articles.
    pub async fn run_ingestion(&self) -> IngestReport {
        self.ingestor.run(&self.sources).await
    }

    /// Summarize up to `limit` articles that have no summary yet.
    pub async fn run_summarization(&self, limit: i64) -> Result<SummarizeReport> {
        self.summarizer.run(limit).await
    }

    /// Build (or rebuild) the digest for a date.
    pub async fn build_digest(&self, date: NaiveDate) -> Result<DigestEntry> {
        self.digest.build(date).await
    }

    /// Write a long-form piece from the latest digest.
    pub async fn build_editorial(&self) -> Result<EditorialPiece> {
        self.editorial.build().await
    }

    /// Semantic search over articles that carry embeddings.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        search::semantic_search(&self.store, self.generator.as_ref(), query, limit).await
    }
}
