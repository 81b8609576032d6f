//! YAML pipeline configuration.
//!
//! One document holds every tunable of a run: decision thresholds,
//! scoring penalty, rule tables, unit aliases and embedding settings.
//! Every section is defaultable, so an empty file (or no file at all)
//! runs the built-in construction-domain configuration.
//!
//! ```yaml
//! log_level: info
//!
//! matcher:
//!   top_k: 5
//!   auto_threshold: 0.85
//!   review_threshold: 0.75
//!   shortlist_cap: 3
//!   scoring:
//!     unit_mismatch_penalty: 0.75
//!
//! rules:
//!   exclusions: ["sin match"]
//!   boosts:
//!     - { pattern: "hormigon", boost: 0.03 }
//!     - { pattern: "demolic", boost: 0.02 }
//!     - { pattern: "pintura", boost: 0.02 }
//!
//! units:
//!   m2: ["m²", "m^2", "m.2"]
//!   ml: ["m.l", "metro lineal"]
//!   ud: ["uds", "unidad", "unid", "u"]
//!
//! embedding:
//!   dimension: 384
//!   normalize: true
//! ```
//!
//! Configuration problems are fatal at startup: a malformed file, an
//! invalid regex or an out-of-range threshold aborts the run before any
//! matching happens.

use std::fs;
use std::path::Path;

use matcher::MatchConfig;
use normalize::UnitAliases;
use retrieval::EmbeddingConfig;
use rules::{RuleSet, RuleSetConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating the pipeline config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("invalid rule table: {0}")]
    Rules(#[from] rules::RuleError),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level configuration for a pricing run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    /// Log filter for the binary (tracing env-filter syntax).
    #[serde(default = "PipelineConfig::default_log_level")]
    pub log_level: String,

    /// Decision-engine thresholds and scoring knobs.
    #[serde(default)]
    pub matcher: MatchConfig,

    /// Exclusion and keyword-boost tables.
    #[serde(default)]
    pub rules: RuleSetConfig,

    /// Unit alias table (canonical token to variants).
    #[serde(default)]
    pub units: UnitAliases,

    /// Built-in embedding provider settings.
    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
            matcher: MatchConfig::default(),
            rules: RuleSetConfig::default(),
            units: UnitAliases::default(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

impl PipelineConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }

    /// Loads and validates a config file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: PipelineConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section. Also compiles the rule tables once so a
    /// bad pattern surfaces here, not mid-batch.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.matcher
            .validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;
        self.embedding
            .validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;
        RuleSet::compile(&self.rules)?;
        Ok(())
    }

    /// Compiles the configured rule tables.
    pub fn compile_rules(&self) -> Result<RuleSet, ConfigError> {
        Ok(RuleSet::compile(&self.rules)?)
    }
}
