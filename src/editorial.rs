use crate::llm::TextGenerator;
use crate::store::Store;
use crate::types::{DigestEntry, EditorialPiece, PipelineError, Result};
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_EDITORIAL_MAX_TOKENS: u32 = 4000;

/// Turns the most recent digest into a long-form narrative piece. Depends
/// on the digest builder having run at least once; fails with
/// `NoDigestAvailable` otherwise.
pub struct EditorialBuilder {
    store: Arc<Store>,
    generator: Arc<dyn TextGenerator>,
    max_tokens: u32,
}

impl EditorialBuilder {
    pub fn new(store: Arc<Store>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            store,
            generator,
            max_tokens: DEFAULT_EDITORIAL_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub async fn build(&self) -> Result<EditorialPiece> {
        let digest = self
            .store
            .latest_digest()
            .await?
            .ok_or(PipelineError::NoDigestAvailable)?;

        info!("Writing long-form piece from digest {}", digest.digest_date);

        let prompt = editorial_prompt(&digest);
        let text = self.generator.generate(&prompt, self.max_tokens).await?;

        let char_count = text.chars().count();
        let word_count = text.split_whitespace().count();

        info!("Long-form piece ready ({} words)", word_count);
        Ok(EditorialPiece {
            text,
            char_count,
            word_count,
        })
    }
}

fn editorial_prompt(digest: &DigestEntry) -> String {
    format!(
        "You are an iGaming industry columnist. Expand the following daily digest ({} on \
         {} articles) into a single long-form briefing: flowing prose across several \
         paragraphs that connects the day's developments, explains why they matter, and \
         closes with an outlook. No bullet lists, no headlines.\n\nDigest:\n{}",
        digest.digest_date, digest.article_count, digest.content
    )
}
