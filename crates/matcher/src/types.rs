use normalize::{normalize_text, normalize_unit, UnitAliases};
use retrieval::RetrievalError;
use scoring::{ScoringConfig, ScoringError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One project row requested to be priced. Immutable after
/// construction; the normalized fields are populated exactly once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectItem {
    pub description: String,
    pub unit: String,
    pub quantity: f32,
    pub description_norm: String,
    pub unit_norm: String,
}

impl ProjectItem {
    /// Builds a row from raw cells. A missing, non-finite or negative
    /// quantity coerces to 1.0 so no invalid numeric ever reaches the
    /// scoring pipeline.
    pub fn new(
        description: impl Into<String>,
        unit: impl Into<String>,
        quantity: Option<f32>,
        aliases: &UnitAliases,
    ) -> Self {
        let description = description.into();
        let unit = unit.into();
        let quantity = match quantity {
            Some(q) if q.is_finite() && q >= 0.0 => q,
            _ => 1.0,
        };
        Self {
            description_norm: normalize_text(&description),
            unit_norm: normalize_unit(&unit, aliases),
            description,
            unit,
            quantity,
        }
    }
}

/// One price-base catalog entry. Loaded once per run, read-only during
/// matching. A missing unit price stays `None` until the outcome is
/// assembled, where it defaults to 0.0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BaseItem {
    pub description: String,
    pub unit: String,
    pub unit_price: Option<f32>,
    pub description_norm: String,
    pub unit_norm: String,
}

impl BaseItem {
    pub fn new(
        description: impl Into<String>,
        unit: impl Into<String>,
        unit_price: Option<f32>,
        aliases: &UnitAliases,
    ) -> Self {
        let description = description.into();
        let unit = unit.into();
        Self {
            description_norm: normalize_text(&description),
            unit_norm: normalize_unit(&unit, aliases),
            description,
            unit,
            unit_price,
        }
    }
}

/// One scored pairing of a project item with a base item. Transient:
/// candidates exist only while an item is being ranked.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Final score after penalty and boosts. Capped at 1.0 above,
    /// unbounded below.
    pub score: f32,
    pub base_index: usize,
    pub unit_compatible: bool,
}

/// Three-way match classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Confident enough to price without human review.
    Auto,
    /// Plausible match surfaced with alternatives for review.
    Revision,
    /// No sufficiently confident candidate, or explicitly excluded.
    SinMatch,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Auto => "auto",
            Decision::Revision => "revision",
            Decision::SinMatch => "sin_match",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-item outcome: the best candidate's fields, the decision, and the
/// extended amount (assigned price x quantity).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchOutcome {
    /// Input row index of the project item.
    pub row: usize,
    pub score: f32,
    pub base_description: String,
    pub base_unit: String,
    /// Assigned unit price; a missing base price is already coalesced
    /// to 0.0 here.
    pub unit_price: f32,
    pub unit_compatible: bool,
    pub decision: Decision,
    pub extended_amount: f32,
}

/// One shortlist row for the review sheet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewCandidate {
    pub project_row: usize,
    pub project_description: String,
    pub base_description: String,
    pub base_unit: String,
    pub unit_price: f32,
    pub score: f32,
    pub unit_compatible: bool,
}

/// Full result of a batch: one outcome per input row, in input order,
/// plus the review shortlist in item-processing order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchReport {
    pub outcomes: Vec<MatchOutcome>,
    pub shortlist: Vec<ReviewCandidate>,
}

/// Decision-engine knobs. The defaults reproduce the historical
/// constants; deployments tune them through configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchConfig {
    /// Candidates retrieved per project item.
    #[serde(default = "MatchConfig::default_top_k")]
    pub top_k: usize,
    /// Minimum score for an automatic accept (with compatible units).
    #[serde(default = "MatchConfig::default_auto_threshold")]
    pub auto_threshold: f32,
    /// Minimum score for the review range.
    #[serde(default = "MatchConfig::default_review_threshold")]
    pub review_threshold: f32,
    /// Maximum shortlist rows per revision item.
    #[serde(default = "MatchConfig::default_shortlist_cap")]
    pub shortlist_cap: usize,
    /// Candidate scoring knobs.
    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl MatchConfig {
    pub(crate) fn default_top_k() -> usize {
        5
    }

    pub(crate) fn default_auto_threshold() -> f32 {
        0.85
    }

    pub(crate) fn default_review_threshold() -> f32 {
        0.75
    }

    pub(crate) fn default_shortlist_cap() -> usize {
        3
    }

    /// Validate before a batch runs; configuration errors are fatal at
    /// startup, never mid-run.
    pub fn validate(&self) -> Result<(), MatchError> {
        if self.top_k == 0 {
            return Err(MatchError::InvalidConfig(
                "top_k must be greater than zero".into(),
            ));
        }
        if self.shortlist_cap == 0 {
            return Err(MatchError::InvalidConfig(
                "shortlist_cap must be greater than zero".into(),
            ));
        }
        if !self.auto_threshold.is_finite() || !self.review_threshold.is_finite() {
            return Err(MatchError::InvalidConfig(
                "thresholds must be finite".into(),
            ));
        }
        if self.review_threshold > self.auto_threshold {
            return Err(MatchError::InvalidConfig(format!(
                "review_threshold ({}) must not exceed auto_threshold ({})",
                self.review_threshold, self.auto_threshold
            )));
        }
        self.scoring.validate()?;
        Ok(())
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            top_k: Self::default_top_k(),
            auto_threshold: Self::default_auto_threshold(),
            review_threshold: Self::default_review_threshold(),
            shortlist_cap: Self::default_shortlist_cap(),
            scoring: ScoringConfig::default(),
        }
    }
}

/// Errors produced by the decision engine.
#[derive(Debug, Error)]
pub enum MatchError {
    /// Invalid engine configuration.
    #[error("invalid match config: {0}")]
    InvalidConfig(String),
    /// Retrieval returned no candidates for a project row; the batch
    /// aborts rather than degrade silently.
    #[error("no candidates retrieved for project row {row}")]
    NoCandidates { row: usize },
    /// Retrieval returned a different number of hit lists than queries.
    #[error("retrieval returned {got} hit lists for {expected} queries")]
    QueryCountMismatch { expected: usize, got: usize },
    /// A hit referenced a base-catalog row that does not exist.
    #[error("candidate for project row {row} references base index {base_index} out of range")]
    BaseIndexOutOfRange { row: usize, base_index: usize },
    /// Retrieval provider failure, propagated unmodified.
    #[error("retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),
}

impl From<ScoringError> for MatchError {
    fn from(err: ScoringError) -> Self {
        MatchError::InvalidConfig(err.to_string())
    }
}
