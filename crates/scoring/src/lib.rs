//! Costmatch candidate scoring.
//!
//! Combines a raw similarity score with unit compatibility and the rule
//! engine into the final per-candidate score. The pipeline order is
//! fixed and matters:
//!
//! 1. raw similarity (from the retrieval provider)
//! 2. unit-mismatch penalty (multiplicative)
//! 3. keyword boosts (additive, clamped at 1.0)
//!
//! The penalty shrinks the score first, then boosts add on top, so a
//! unit-mismatched candidate with strong keyword evidence can climb back
//! toward the clamp ceiling.

use rules::RuleSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scoring knobs. The penalty default reproduces the historical 0.75
/// factor; deployments tune it through configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringConfig {
    /// Multiplier applied to the raw score when units are incompatible.
    #[serde(default = "ScoringConfig::default_unit_mismatch_penalty")]
    pub unit_mismatch_penalty: f32,
}

impl ScoringConfig {
    pub(crate) fn default_unit_mismatch_penalty() -> f32 {
        0.75
    }

    pub fn validate(&self) -> Result<(), ScoringError> {
        if !self.unit_mismatch_penalty.is_finite()
            || self.unit_mismatch_penalty <= 0.0
            || self.unit_mismatch_penalty > 1.0
        {
            return Err(ScoringError::InvalidConfig(format!(
                "unit_mismatch_penalty must be in (0, 1], got {}",
                self.unit_mismatch_penalty
            )));
        }
        Ok(())
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            unit_mismatch_penalty: Self::default_unit_mismatch_penalty(),
        }
    }
}

/// Errors produced by the scoring layer.
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("invalid scoring config: {0}")]
    InvalidConfig(String),
}

/// Unit compatibility over normalized unit tokens: an empty side means
/// the unit is unknown and is assumed compatible; otherwise the tokens
/// must be equal. Symmetric and reflexive.
pub fn units_compatible(project_unit_norm: &str, base_unit_norm: &str) -> bool {
    if project_unit_norm.is_empty() || base_unit_norm.is_empty() {
        return true;
    }
    project_unit_norm == base_unit_norm
}

/// Identity when units are compatible, otherwise multiply by the penalty.
pub fn penalize_unit_mismatch(score: f32, compatible: bool, penalty: f32) -> f32 {
    if compatible {
        score
    } else {
        score * penalty
    }
}

/// Full per-candidate pipeline: penalty first, boosts second.
pub fn score_candidate(
    raw_score: f32,
    compatible: bool,
    project_description: &str,
    base_description: &str,
    rules: &RuleSet,
    cfg: &ScoringConfig,
) -> f32 {
    let penalized = penalize_unit_mismatch(raw_score, compatible, cfg.unit_mismatch_penalty);
    rules.apply_keyword_boosts(project_description, base_description, penalized)
}
