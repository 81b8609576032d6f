//! Costmatch similarity-search layer.
//!
//! The decision engine only depends on the [`Retriever`] contract: give
//! it normalized query texts and a `top_k`, get back the best-scoring
//! base-catalog indices per query, cosine-style scores in `[-1, 1]`,
//! ordered best-first.
//!
//! [`EmbeddingIndex`] is the built-in provider: a deterministic hashed
//! bag-of-words embedder plus an exact linear cosine scan over the whole
//! base table. Price bases are a few thousand rows at most, so exact
//! search is both simpler and strictly more accurate than an ANN graph.
//! Determinism matters more than semantic depth here: the same inputs
//! must price the same way on every machine and every run.

mod embed;
mod index;

pub use crate::embed::{embed_text, EmbeddingConfig};
pub use crate::index::EmbeddingIndex;

use thiserror::Error;

/// One retrieval hit: the raw similarity score and the index of the
/// matched entry in the base catalog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawHit {
    pub score: f32,
    pub base_index: usize,
}

/// Similarity-search provider contract.
///
/// Implementations return one hit list per query, each ordered
/// best-first and at most `top_k` long. Fewer than `top_k` hits is
/// acceptable when the catalog is smaller than `top_k`; an empty hit
/// list is the caller's problem to treat as fatal.
pub trait Retriever {
    fn retrieve(
        &self,
        queries: &[String],
        top_k: usize,
    ) -> Result<Vec<Vec<RawHit>>, RetrievalError>;
}

/// Errors produced by the retrieval layer.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("invalid embedding config: {0}")]
    InvalidConfig(String),
    #[error("cannot build an index over an empty base catalog")]
    EmptyIndex,
}
