use normalize::normalize_text;
use regex::Regex;

use crate::config::RuleSetConfig;
use crate::RuleError;

/// Compiled rule tables. Built once at startup from a [`RuleSetConfig`]
/// and shared read-only across the whole batch.
#[derive(Debug)]
pub struct RuleSet {
    exclusions: Vec<Regex>,
    boosts: Vec<(Regex, f32)>,
}

impl RuleSet {
    /// Compiles every configured pattern. The first invalid pattern
    /// aborts compilation; rule tables are all-or-nothing.
    pub fn compile(cfg: &RuleSetConfig) -> Result<Self, RuleError> {
        let exclusions = cfg
            .exclusions
            .iter()
            .map(|pattern| compile_pattern(pattern))
            .collect::<Result<Vec<_>, _>>()?;
        let boosts = cfg
            .boosts
            .iter()
            .map(|kb| compile_pattern(&kb.pattern).map(|re| (re, kb.boost)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { exclusions, boosts })
    }

    /// True when any exclusion pattern matches the normalized description.
    pub fn has_exclusion(&self, description: &str) -> bool {
        let normalized = normalize_text(description);
        self.exclusions.iter().any(|re| re.is_match(&normalized))
    }

    /// Adds every boost whose pattern matches both normalized
    /// descriptions, then clamps the result at 1.0. There is no lower
    /// clamp; scores below zero pass through untouched.
    pub fn apply_keyword_boosts(
        &self,
        project_description: &str,
        base_description: &str,
        score: f32,
    ) -> f32 {
        let project_norm = normalize_text(project_description);
        let base_norm = normalize_text(base_description);
        let mut score = score;
        for (re, boost) in &self.boosts {
            if re.is_match(&project_norm) && re.is_match(&base_norm) {
                score += boost;
            }
        }
        score.min(1.0)
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex, RuleError> {
    Regex::new(pattern).map_err(|source| RuleError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}
