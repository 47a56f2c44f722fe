// File: src/config.rs
//! Tunables for matching, learning and variant generation.
//!
//! Every confidence constant the cascade and the learning loop rely on lives
//! here as a named field, so a deployment can pin or adjust them from a TOML
//! file without touching code.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub matching: MatchConfig,
    pub learning: LearningConfig,
    pub generator: GeneratorConfig,
    /// Directory holding the corrections table, feedback log and learning log.
    pub data_dir: Option<PathBuf>,
}

impl Config {
    /// Loads a TOML config. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&raw)?;
        info!(path = %path.display(), "config loaded");
        Ok(config)
    }
}

/// Confidence arithmetic for the matching cascade and row validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub default_threshold: f64,
    pub exact_confidence: f64,
    pub code_confidence: f64,
    /// Digits in a canonical course code.
    pub code_length: usize,
    /// Context stage accepts at `threshold - context_slack`.
    pub context_slack: f64,
    pub context_bonus: f64,
    pub partial_slack: f64,
    pub partial_contained_weight: f64,
    pub partial_containing_weight: f64,
    pub pattern_slack: f64,
    pub pattern_penalty: f64,
    /// Reported when the pattern-corrected text is an exact hit.
    pub pattern_exact_confidence: f64,
    pub row_threshold: f64,
    pub row_fill_confidence: f64,
    pub row_overwrite_confidence: f64,
    /// Adds generated abbreviations to every record of a loaded catalog file.
    pub generate_aliases: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            default_threshold: 70.0,
            exact_confidence: 100.0,
            code_confidence: 95.0,
            code_length: 7,
            context_slack: 10.0,
            context_bonus: 5.0,
            partial_slack: 20.0,
            partial_contained_weight: 80.0,
            partial_containing_weight: 75.0,
            pattern_slack: 30.0,
            pattern_penalty: 5.0,
            pattern_exact_confidence: 85.0,
            row_threshold: 60.0,
            row_fill_confidence: 80.0,
            row_overwrite_confidence: 90.0,
            generate_aliases: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    pub edit_confidence_scale: f64,
    pub edit_confidence_cap: f64,
    pub min_frequency: u32,
    pub min_confidence: f64,
    pub report_days: i64,
    pub retention_days: i64,
    pub history_limit: usize,
    pub top_corrections: usize,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            edit_confidence_scale: 1.2,
            edit_confidence_cap: 0.9,
            min_frequency: 3,
            min_confidence: 0.8,
            report_days: 7,
            retention_days: 90,
            history_limit: 30,
            top_corrections: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub error_rate: f64,
    pub seed: u64,
    pub samples_per_subject: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self { error_rate: 0.3, seed: 0x5EED_C0DE, samples_per_subject: 10 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [matching]
            default_threshold = 65.0

            [learning]
            min_frequency = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.matching.default_threshold, 65.0);
        assert_eq!(config.matching.code_confidence, 95.0);
        assert_eq!(config.learning.min_frequency, 2);
        assert_eq!(config.learning.edit_confidence_cap, 0.9);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.learning.history_limit, 30);
    }
}
