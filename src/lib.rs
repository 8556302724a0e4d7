pub mod types;
pub mod config;
pub mod sources;
pub mod fetcher;
pub mod parser;
pub mod store;
pub mod ingest;
pub mod llm;
pub mod summarizer;
pub mod digest;
pub mod editorial;
pub mod classify;
pub mod search;
pub mod pipeline;

pub use types::*;
pub use config::AppConfig;
pub use sources::FeedSource;
pub use fetcher::Fetcher;
pub use store::Store;
pub use ingest::Ingestor;
pub use llm::{MockGenerator, OpenAiGenerator, TextGenerator};
pub use summarizer::Summarizer;
pub use digest::DigestBuilder;
pub use editorial::EditorialBuilder;
pub use pipeline::NewsPipeline;
