//! Workspace umbrella crate for costmatch.
//!
//! Stitches the pipeline stages (normalization, rules, scoring,
//! retrieval and the decision engine) together and adds the outer
//! surfaces: the YAML pipeline configuration, the CSV price-base and
//! project loaders, and the three-sheet report writer. The `costmatch`
//! binary wires all of it behind a small CLI.

pub mod config;
pub mod io;

pub use matcher::{
    match_project_items, BaseItem, Decision, MatchConfig, MatchError, MatchOutcome, MatchReport,
    ProjectItem, ReviewCandidate,
};
pub use normalize::{collapse_whitespace, normalize_text, normalize_unit, UnitAliases};
pub use retrieval::{EmbeddingConfig, EmbeddingIndex, RawHit, RetrievalError, Retriever};
pub use rules::{KeywordBoost, RuleError, RuleSet, RuleSetConfig};
pub use scoring::{penalize_unit_mismatch, units_compatible, ScoringConfig};

pub use crate::config::{ConfigError, PipelineConfig};
pub use crate::io::{read_price_base, read_project_file, write_report, IoError};
