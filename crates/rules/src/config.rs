use serde::{Deserialize, Serialize};

/// A single keyword boost: when `pattern` matches both the project and
/// the base description, `boost` is added to the candidate score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeywordBoost {
    pub pattern: String,
    pub boost: f32,
}

impl KeywordBoost {
    pub fn new(pattern: impl Into<String>, boost: f32) -> Self {
        Self {
            pattern: pattern.into(),
            boost,
        }
    }
}

/// Declarative rule tables, serde-friendly so they can live in the
/// pipeline YAML. Defaults carry the built-in construction-domain rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleSetConfig {
    /// Patterns that force a no-match decision when found in the project
    /// description.
    #[serde(default = "RuleSetConfig::default_exclusions")]
    pub exclusions: Vec<String>,
    /// Keyword boosts applied when a pattern matches both sides.
    #[serde(default = "RuleSetConfig::default_boosts")]
    pub boosts: Vec<KeywordBoost>,
}

impl RuleSetConfig {
    fn default_exclusions() -> Vec<String> {
        vec!["sin match".to_string()]
    }

    fn default_boosts() -> Vec<KeywordBoost> {
        vec![
            KeywordBoost::new("hormigon", 0.03),
            KeywordBoost::new("demolic", 0.02),
            KeywordBoost::new("pintura", 0.02),
        ]
    }
}

impl Default for RuleSetConfig {
    fn default() -> Self {
        Self {
            exclusions: Self::default_exclusions(),
            boosts: Self::default_boosts(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_builtin_rules() {
        let cfg = RuleSetConfig::default();
        assert_eq!(cfg.exclusions, vec!["sin match"]);
        assert_eq!(cfg.boosts.len(), 3);
        assert_eq!(cfg.boosts[0].pattern, "hormigon");
        assert!((cfg.boosts[0].boost - 0.03).abs() < f32::EPSILON);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let cfg: RuleSetConfig = serde_yaml::from_str("exclusions: [\"no valorar\"]").expect("yaml");
        assert_eq!(cfg.exclusions, vec!["no valorar"]);
        // Boosts fall back to the built-in table.
        assert_eq!(cfg.boosts.len(), 3);
    }
}
