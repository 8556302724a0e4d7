use async_trait::async_trait;
use news_aggregator::llm::TextGenerator;
use news_aggregator::search::{semantic_search, MIN_SIMILARITY};
use news_aggregator::store::Store;
use news_aggregator::types::{ArticleDraft, PipelineError, Result};
use std::sync::Arc;

/// Embeds every query as a fixed unit vector; generation is unused here.
struct FixedEmbedder {
    vector: Vec<f32>,
}

#[async_trait]
impl TextGenerator for FixedEmbedder {
    async fn generate(&self, _prompt: &str, _max_tokens: u32) -> Result<String> {
        Err(PipelineError::General("not used in this test".to_string()))
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(self.vector.clone())
    }
}

/// A generator that must never be reached.
struct UnreachableGenerator;

#[async_trait]
impl TextGenerator for UnreachableGenerator {
    async fn generate(&self, _prompt: &str, _max_tokens: u32) -> Result<String> {
        panic!("generate should not be called");
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        panic!("embed should not be called for blank queries");
    }
}

async fn seeded_store() -> Arc<Store> {
    let store = Arc::new(
        Store::connect("sqlite::memory:")
            .await
            .expect("in-memory store should connect"),
    );

    for (link, title) in [
        ("https://example.com/fine", "Casino X fined"),
        ("https://example.com/slot", "New slot launched"),
        ("https://example.com/plain", "No embedding yet"),
    ] {
        let draft = ArticleDraft {
            title: title.to_string(),
            link: link.to_string(),
            source: "Test Feed".to_string(),
            published_date: None,
            content: String::new(),
        };
        assert!(store.insert_if_absent(&draft).await.expect("insert"));
    }

    let fined = store
        .article_by_link("https://example.com/fine")
        .await
        .expect("lookup")
        .expect("exists");
    let slot = store
        .article_by_link("https://example.com/slot")
        .await
        .expect("lookup")
        .expect("exists");

    // Orthogonal embeddings: the first aligns with the query, the second
    // lands exactly on the 0.5 normalized score, below the threshold.
    store
        .set_embedding(fined.id, &[1.0, 0.0, 0.0])
        .await
        .expect("update");
    store
        .set_embedding(slot.id, &[0.0, 1.0, 0.0])
        .await
        .expect("update");

    store
}

#[tokio::test]
async fn search_returns_only_hits_above_threshold() {
    let store = seeded_store().await;
    let generator = FixedEmbedder {
        vector: vec![1.0, 0.0, 0.0],
    };

    let hits = semantic_search(&store, &generator, "casino fine", 10)
        .await
        .expect("search");

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].article.link, "https://example.com/fine");
    assert!(hits[0].score >= MIN_SIMILARITY);
    assert!((hits[0].score - 1.0).abs() < 1e-6);
}

#[tokio::test]
async fn blank_query_short_circuits_without_embedding() {
    let store = seeded_store().await;

    let hits = semantic_search(&store, &UnreachableGenerator, "   ", 10)
        .await
        .expect("search");

    assert!(hits.is_empty());
}

#[tokio::test]
async fn limit_truncates_ranked_hits() {
    let store = Arc::new(
        Store::connect("sqlite::memory:")
            .await
            .expect("in-memory store should connect"),
    );

    for i in 0..4 {
        let draft = ArticleDraft {
            title: format!("Story {i}"),
            link: format!("https://example.com/story/{i}"),
            source: "Test Feed".to_string(),
            published_date: None,
            content: String::new(),
        };
        assert!(store.insert_if_absent(&draft).await.expect("insert"));
        let article = store
            .article_by_link(&format!("https://example.com/story/{i}"))
            .await
            .expect("lookup")
            .expect("exists");
        // Progressively less aligned with the query vector.
        store
            .set_embedding(article.id, &[1.0, i as f32 * 0.2, 0.0])
            .await
            .expect("update");
    }

    let generator = FixedEmbedder {
        vector: vec![1.0, 0.0, 0.0],
    };
    let hits = semantic_search(&store, &generator, "stories", 2)
        .await
        .expect("search");

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].article.title, "Story 0");
    assert!(hits[0].score >= hits[1].score);
}
