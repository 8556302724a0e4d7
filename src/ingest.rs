use crate::fetcher::Fetcher;
use crate::parser;
use crate::sources::FeedSource;
use crate::store::Store;
use crate::types::{ArticleDraft, IngestReport, Result, SourceError};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_PER_FEED: usize = 10;
const DEFAULT_FETCH_CONCURRENCY: usize = 4;

/// Drives the fetcher across every registered source, deduplicates drafts
/// and persists the new ones. Running it twice against unchanged feeds is a
/// no-op: in-batch dedup catches repeats within one run, the store's unique
/// link index catches everything across runs.
pub struct Ingestor {
    fetcher: Arc<Fetcher>,
    store: Arc<Store>,
    max_per_feed: usize,
    concurrency: usize,
}

impl Ingestor {
    pub fn new(fetcher: Arc<Fetcher>, store: Arc<Store>) -> Self {
        Self {
            fetcher,
            store,
            max_per_feed: DEFAULT_MAX_PER_FEED,
            concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }

    pub fn with_max_per_feed(mut self, max_per_feed: usize) -> Self {
        self.max_per_feed = max_per_feed;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Run one ingestion pass. Never fails as a whole: a source that can't
    /// be fetched or parsed contributes zero drafts and one entry in the
    /// report's error list, and the remaining sources proceed normally.
    pub async fn run(&self, sources: &[FeedSource]) -> IngestReport {
        info!("Starting ingestion across {} sources", sources.len());

        // Fetch and parse concurrently, but keep registry order so in-batch
        // dedup is deterministic (first sighting of a link wins).
        let outcomes: Vec<(String, Result<Vec<ArticleDraft>>)> =
            stream::iter(sources.iter().cloned())
                .map(|source| {
                    let fetcher = self.fetcher.clone();
                    let max_per_feed = self.max_per_feed;
                    async move {
                        let drafts = match fetcher.fetch(&source.url).await {
                            Ok(body) => parser::parse_feed(&source.name, &body, max_per_feed),
                            Err(e) => Err(e),
                        };
                        (source.name, drafts)
                    }
                })
                .buffered(self.concurrency)
                .collect()
                .await;

        let mut report = IngestReport::default();
        let mut seen_links: HashSet<String> = HashSet::new();

        for (source, outcome) in outcomes {
            let drafts = match outcome {
                Ok(drafts) => drafts,
                Err(e) => {
                    warn!("Source {} failed: {}", source, e);
                    report.errors.push(SourceError {
                        source,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            report.parsed += drafts.len();

            for draft in drafts {
                if !seen_links.insert(draft.link.clone()) {
                    debug!("Skipping duplicate link within batch: {}", draft.link);
                    continue;
                }

                match self.store.insert_if_absent(&draft).await {
                    Ok(true) => report.inserted += 1,
                    Ok(false) => debug!("Article already stored: {}", draft.link),
                    Err(e) => {
                        warn!("Failed to store article {}: {}", draft.link, e);
                        report.errors.push(SourceError {
                            source: source.clone(),
                            message: e.to_string(),
                        });
                    }
                }
            }
        }

        info!(
            "Ingestion complete: {} new articles out of {} parsed ({} errors)",
            report.inserted,
            report.parsed,
            report.errors.len()
        );
        report
    }
}
