//! Underwriting policy thresholds.
//!
//! Two tiers of limits share this struct. The *soft references*
//! (`min_score`, `max_dti`, `max_ltv`) steer the weighted rules vote; the
//! *hard limits* (`hard_max_dti`, `hard_max_ltv`, `score_floor`) back the
//! gate's veto. Limits load from YAML or from the environment variables
//! the upstream service already uses (`MIN_SCORE`, `MAX_DTI`, `MAX_LTV`).

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("failed to read policy file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse policy YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Policy thresholds for the rules and gate evaluators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyLimits {
    /// Soft target minimum credit score.
    pub min_score: f64,
    /// Soft reference debt-to-income ratio.
    pub max_dti: f64,
    /// Soft reference loan-to-value ratio.
    pub max_ltv: f64,

    /// Hard DTI ceiling; breaching it vetoes the application. Kept well
    /// above the soft reference so the soft signal, not the gate, carries
    /// ordinary high-DTI cases.
    pub hard_max_dti: f64,
    /// Hard LTV ceiling.
    pub hard_max_ltv: f64,
    /// Absolute score floor, 50 points under the soft target.
    pub score_floor: f64,
}

impl Default for PolicyLimits {
    fn default() -> Self {
        Self {
            min_score: 700.0,
            max_dti: 0.45,
            max_ltv: 0.90,
            hard_max_dti: 2.0,
            hard_max_ltv: 0.90,
            score_floor: 650.0,
        }
    }
}

impl PolicyLimits {
    /// Parse limits from a YAML document; absent keys keep their defaults.
    pub fn from_yaml(source: &str) -> Result<Self, PolicyError> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Load limits from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml(&source)
    }

    /// Apply `MIN_SCORE`, `MAX_DTI`, and `MAX_LTV` environment overrides.
    ///
    /// `score_floor` tracks an overridden `min_score` at the usual
    /// 50-point margin.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(v) = env_f64("MIN_SCORE") {
            self.min_score = v;
            self.score_floor = v - 50.0;
        }
        if let Some(v) = env_f64("MAX_DTI") {
            self.max_dti = v;
        }
        if let Some(v) = env_f64("MAX_LTV") {
            self.max_ltv = v;
            self.hard_max_ltv = v;
        }
        self
    }
}

fn env_f64(name: &str) -> Option<f64> {
    let raw = std::env::var(name).ok()?;
    let trimmed = raw.trim().trim_matches(|c| c == '\'' || c == '"');
    trimmed.parse().ok()
}
