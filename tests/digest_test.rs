use chrono::Utc;
use news_aggregator::digest::DigestBuilder;
use news_aggregator::editorial::EditorialBuilder;
use news_aggregator::llm::MockGenerator;
use news_aggregator::store::Store;
use news_aggregator::types::{ArticleDraft, PipelineError};
use std::sync::Arc;

async fn memory_store() -> Arc<Store> {
    Arc::new(
        Store::connect("sqlite::memory:")
            .await
            .expect("in-memory store should connect"),
    )
}

async fn seed_article(store: &Store, link: &str, title: &str) {
    let draft = ArticleDraft {
        title: title.to_string(),
        link: link.to_string(),
        source: "Test Feed".to_string(),
        published_date: Some(Utc::now()),
        content: format!("{title} content."),
    };
    assert!(store.insert_if_absent(&draft).await.expect("insert"));
}

#[tokio::test]
async fn empty_window_fails_and_writes_nothing() {
    let store = memory_store().await;
    let generator = Arc::new(MockGenerator::new());
    let builder = DigestBuilder::new(store.clone(), generator);

    let today = Utc::now().date_naive();
    let result = builder.build(today).await;

    assert!(matches!(
        result,
        Err(PipelineError::EmptyDigestWindow(date)) if date == today
    ));
    assert_eq!(store.digest_count().await.expect("count"), 0);
}

#[tokio::test]
async fn rebuilding_a_date_replaces_the_digest() {
    let store = memory_store().await;
    let today = Utc::now().date_naive();

    seed_article(&store, "https://example.com/1", "Casino X fined").await;
    seed_article(&store, "https://example.com/2", "Operator expands").await;

    let first_builder = DigestBuilder::new(
        store.clone(),
        Arc::new(MockGenerator::new().with_reply("First digest text.")),
    );
    let first = first_builder.build(today).await.expect("first build");
    assert_eq!(first.content, "First digest text.");
    assert_eq!(first.article_count, 2);

    // The window grows, and a rebuild reflects the new article set.
    seed_article(&store, "https://example.com/3", "New slot launched").await;

    let second_builder = DigestBuilder::new(
        store.clone(),
        Arc::new(MockGenerator::new().with_reply("Second digest text.")),
    );
    let second = second_builder.build(today).await.expect("second build");

    assert_eq!(second.digest_date, today);
    assert_eq!(second.content, "Second digest text.");
    assert_eq!(second.article_count, 3);
    assert_eq!(store.digest_count().await.expect("count"), 1);

    let stored = store
        .digest_by_date(today)
        .await
        .expect("select")
        .expect("digest exists");
    assert_eq!(stored.content, "Second digest text.");
}

#[tokio::test]
async fn editorial_requires_a_prior_digest() {
    let store = memory_store().await;
    let builder = EditorialBuilder::new(store, Arc::new(MockGenerator::new()));

    let result = builder.build().await;
    assert!(matches!(result, Err(PipelineError::NoDigestAvailable)));
}

#[tokio::test]
async fn editorial_reports_exact_length_metrics() {
    let store = memory_store().await;
    let today = Utc::now().date_naive();

    seed_article(&store, "https://example.com/1", "Casino X fined").await;
    DigestBuilder::new(
        store.clone(),
        Arc::new(MockGenerator::new().with_reply("Digest body.")),
    )
    .build(today)
    .await
    .expect("digest build");

    let reply = "A longer piece about the day.";
    let builder = EditorialBuilder::new(
        store.clone(),
        Arc::new(MockGenerator::new().with_reply(reply)),
    );
    let piece = builder.build().await.expect("editorial build");

    assert_eq!(piece.text, reply);
    assert_eq!(piece.char_count, reply.chars().count());
    assert_eq!(piece.word_count, 6);
}
