//! Costmatch text normalization layer.
//!
//! Canonicalizes free-text descriptions and measurement units into the
//! comparable forms every downstream stage (rules, scoring, retrieval)
//! operates on.
//!
//! ## What we do
//!
//! - Lowercasing and edge trimming
//! - Unicode NFKD decomposition with combining marks stripped, so
//!   accented and unaccented spellings compare equal
//! - Punctuation and symbol folding to spaces
//! - Whitespace collapsing to single spaces
//! - Unit alias canonicalization through a static table
//!
//! ## Pure function guarantee
//!
//! No I/O, no locale dependence, no failure modes. Same input, same
//! output, on any machine. `normalize_text` is idempotent: running it on
//! its own output is a no-op.

mod text;
mod units;

pub use crate::text::{collapse_whitespace, normalize_text};
pub use crate::units::{normalize_unit, UnitAliases};
