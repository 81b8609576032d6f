use crate::embed::{embed_text, EmbeddingConfig};
use crate::{RawHit, RetrievalError, Retriever};

/// Exact flat similarity index over the base catalog.
///
/// Embeds every base description once at build time; each query is a
/// single embedding plus a linear cosine scan. Row indices in the hits
/// are positions in the `texts` slice handed to [`EmbeddingIndex::build`],
/// which the matcher uses as base-catalog row indices.
#[derive(Debug)]
pub struct EmbeddingIndex {
    cfg: EmbeddingConfig,
    vectors: Vec<Vec<f32>>,
}

impl EmbeddingIndex {
    /// Embeds the base catalog. An empty catalog is rejected up front:
    /// there is nothing a later query could ever match.
    pub fn build(cfg: EmbeddingConfig, texts: &[String]) -> Result<Self, RetrievalError> {
        cfg.validate()?;
        if texts.is_empty() {
            return Err(RetrievalError::EmptyIndex);
        }
        let vectors = texts.iter().map(|t| embed_text(t, &cfg)).collect();
        Ok(Self { cfg, vectors })
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    fn search(&self, query: &str, top_k: usize) -> Vec<RawHit> {
        let query_vec = embed_text(query, &self.cfg);
        let mut hits: Vec<RawHit> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(base_index, vec)| RawHit {
                score: cosine_similarity(&query_vec, vec),
                base_index,
            })
            .collect();
        // Stable sort: equal scores keep catalog order.
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(top_k);
        hits
    }
}

impl Retriever for EmbeddingIndex {
    fn retrieve(
        &self,
        queries: &[String],
        top_k: usize,
    ) -> Result<Vec<Vec<RawHit>>, RetrievalError> {
        Ok(queries.iter().map(|q| self.search(q, top_k)).collect())
    }
}

/// Cosine similarity, clamped to [-1, 1]. Zero-length vectors (empty
/// text) score 0.0 against everything.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}
