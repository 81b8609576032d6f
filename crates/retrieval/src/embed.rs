use fxhash::hash64;
use serde::{Deserialize, Serialize};

use crate::RetrievalError;

/// Configuration for the hashed bag-of-words embedder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Embedding dimensionality. Larger dimensions reduce hash
    /// collisions between unrelated tokens.
    #[serde(default = "EmbeddingConfig::default_dimension")]
    pub dimension: usize,
    /// L2-normalize vectors so dot products are cosine similarities.
    #[serde(default = "EmbeddingConfig::default_normalize")]
    pub normalize: bool,
}

impl EmbeddingConfig {
    pub(crate) fn default_dimension() -> usize {
        384
    }

    pub(crate) fn default_normalize() -> bool {
        true
    }

    pub fn validate(&self) -> Result<(), RetrievalError> {
        if self.dimension == 0 {
            return Err(RetrievalError::InvalidConfig(
                "dimension must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dimension: Self::default_dimension(),
            normalize: Self::default_normalize(),
        }
    }
}

/// Deterministic hashed bag-of-words embedding.
///
/// Each whitespace token hashes to a bucket and increments it, so texts
/// sharing tokens have overlapping mass and identical normalized texts
/// embed identically. No model assets, no randomness, reproducible on
/// any machine.
pub fn embed_text(text: &str, cfg: &EmbeddingConfig) -> Vec<f32> {
    let mut v = vec![0f32; cfg.dimension];
    for token in text.split_whitespace() {
        let bucket = (hash64(token.as_bytes()) % cfg.dimension as u64) as usize;
        v[bucket] += 1.0;
    }
    if cfg.normalize {
        l2_normalize_in_place(&mut v);
    }
    v
}

/// In-place L2 normalization. A zero vector (empty text) stays zero.
pub(crate) fn l2_normalize_in_place(v: &mut [f32]) {
    let norm_sq: f32 = v.iter().map(|x| x * x).sum();
    if norm_sq > 0.0 {
        let inv_norm = norm_sq.sqrt().recip();
        for x in v.iter_mut() {
            *x *= inv_norm;
        }
    }
}
