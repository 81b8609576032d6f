//! # Costmatch decision engine (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` sits on top of the normalization, rules, scoring and
//! retrieval layers. For every project line item it ranks the retrieved
//! price-base candidates, picks the best match, classifies the result
//! into `auto` / `revision` / `sin_match`, and assembles the review
//! shortlist for human pricing.
//!
//! ## Core types
//!
//! - [`ProjectItem`] / [`BaseItem`]: typed rows with normalized fields
//!   populated at construction.
//! - [`Candidate`]: one scored (project item, base item) pairing.
//! - [`Decision`]: the three-way classification.
//! - [`MatchOutcome`] / [`ReviewCandidate`] / [`MatchReport`]: the full
//!   per-item outcome table plus the shortlist.
//! - [`MatchConfig`]: thresholds, `top_k`, shortlist cap and the scoring
//!   knobs, validated before a batch runs.
//!
//! ## Failure semantics
//!
//! The batch either completes with a full outcome table or fails as a
//! whole: an item with zero retrieved candidates is a hard error
//! ([`MatchError::NoCandidates`]), never a silent skip.

mod engine;
mod types;

pub use crate::engine::match_project_items;
pub use crate::types::{
    BaseItem, Candidate, Decision, MatchConfig, MatchError, MatchOutcome, MatchReport, ProjectItem,
    ReviewCandidate,
};
