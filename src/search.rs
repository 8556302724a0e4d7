use crate::llm::TextGenerator;
use crate::store::Store;
use crate::types::{Article, Result};
use serde::Serialize;
use tracing::{debug, info};

/// Hits below this similarity are not worth showing.
pub const MIN_SIMILARITY: f32 = 0.65;

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub article: Article,
    pub score: f32,
}

/// Cosine similarity normalized from [-1, 1] into [0, 1] so thresholds read
/// as percentages. Mismatched or zero-norm vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|y| y * y).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b) + 1.0) / 2.0
}

/// Embed the query, score every stored article embedding against it and
/// return the best matches above the similarity threshold.
pub async fn semantic_search(
    store: &Store,
    generator: &dyn TextGenerator,
    query: &str,
    limit: usize,
) -> Result<Vec<SearchHit>> {
    if query.trim().is_empty() {
        return Ok(Vec::new());
    }

    let query_embedding = generator.embed(query).await?;
    let articles = store.find_with_embeddings().await?;
    debug!("Scoring {} articles against query", articles.len());

    let mut hits: Vec<SearchHit> = articles
        .into_iter()
        .filter_map(|article| {
            let score = match article.embedding.as_deref() {
                Some(embedding) => cosine_similarity(&query_embedding, embedding),
                None => return None,
            };
            Some(SearchHit { article, score })
        })
        .filter(|hit| hit.score >= MIN_SIMILARITY)
        .collect();

    hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    hits.truncate(limit);

    info!("Search returned {} hits", hits.len());
    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_score_one() {
        let v = [0.5, 0.5, 0.1];
        let score = cosine_similarity(&v, &v);
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn opposite_vectors_score_zero() {
        let score = cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]);
        assert!(score.abs() < 1e-6);
    }

    #[test]
    fn orthogonal_vectors_score_half() {
        let score = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]);
        assert!((score - 0.5).abs() < 1e-6);
    }

    #[test]
    fn degenerate_inputs_score_zero() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }
}
