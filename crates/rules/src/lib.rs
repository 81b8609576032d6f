//! Costmatch rule engine.
//!
//! Deterministic business rules applied on top of raw similarity scores:
//!
//! - **Exclusions**: regex patterns that force an item to `sin_match`
//!   regardless of how well it scored.
//! - **Keyword boosts**: domain keywords (concrete, demolition, paint...)
//!   that add confidence when both the project description and the
//!   candidate base description mention them.
//!
//! Patterns are declared in [`RuleSetConfig`] and compiled once into a
//! [`RuleSet`] at startup; a pattern that fails to compile is a fatal
//! configuration error. All matching runs over normalized text, so
//! patterns are written lowercase and accent-free.

mod config;
mod engine;

pub use crate::config::{KeywordBoost, RuleSetConfig};
pub use crate::engine::RuleSet;

use thiserror::Error;

/// Errors produced when compiling a rule set.
#[derive(Debug, Error)]
pub enum RuleError {
    /// A configured pattern is not a valid regular expression.
    #[error("invalid rule pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
