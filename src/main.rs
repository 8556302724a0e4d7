use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use news_aggregator::config::AppConfig;
use news_aggregator::llm::OpenAiGenerator;
use news_aggregator::sources;
use news_aggregator::store::Store;
use news_aggregator::NewsPipeline;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "news-aggregator", about = "RSS ingestion, summarization and digest pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch all configured feeds and store new articles
    Fetch,
    /// Generate summaries for stored articles that have none
    Summarize {
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Build the daily digest (defaults to today, UTC)
    Digest {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Write a long-form piece from the latest digest
    Editorial,
    /// Semantic search over summarized articles
    Search {
        query: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = AppConfig::from_env();

    info!("Connecting to database: {}", config.database_url);
    let store = Arc::new(Store::connect(&config.database_url).await?);

    let api_key = std::env::var("OPENAI_API_KEY")
        .context("OPENAI_API_KEY environment variable must be set")?;
    let generator = Arc::new(OpenAiGenerator::new(api_key));

    let pipeline = NewsPipeline::new(store, generator, sources::default_sources(), &config);

    match cli.command {
        Command::Fetch => {
            let report = pipeline.run_ingestion().await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Summarize { limit } => {
            let report = pipeline
                .run_summarization(limit.unwrap_or(config.summary_batch_limit))
                .await?;
            println!("Summarized {}/{} articles", report.succeeded, report.attempted);
        }
        Command::Digest { date } => {
            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            let entry = pipeline.build_digest(date).await?;
            println!(
                "Digest for {} ({} articles):\n\n{}",
                entry.digest_date, entry.article_count, entry.content
            );
        }
        Command::Editorial => {
            let piece = pipeline.build_editorial().await?;
            println!(
                "{}\n\n({} words, {} characters)",
                piece.text, piece.word_count, piece.char_count
            );
        }
        Command::Search { query, limit } => {
            let hits = pipeline.search(&query, limit).await?;
            if hits.is_empty() {
                println!("No matching articles.");
            }
            for hit in hits {
                println!(
                    "{:5.1}%  {}  [{}]\n        {}",
                    hit.score * 100.0,
                    hit.article.title,
                    hit.article.source,
                    hit.article.link
                );
            }
        }
    }

    Ok(())
}
