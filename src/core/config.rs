/// Render configuration — the process-wide settings the renderer reads.
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::core::perception::BASELINE_EMISSION;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

fn default_base_language() -> String {
    "english".to_string()
}

fn default_baseline_emission() -> f64 {
    BASELINE_EMISSION
}

/// Global render settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "RenderConfig")]
pub struct RenderConfig {
    /// Language pack used when a phrase names none, or names one without
    /// rule tables.
    #[serde(default = "default_base_language")]
    pub base_language: String,
    /// Emission of every non-visual channel.
    #[serde(default = "default_baseline_emission")]
    pub baseline_emission: f64,
    /// Replace names with pronouns unless a call says otherwise.
    #[serde(default)]
    pub anonymize: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            base_language: default_base_language(),
            baseline_emission: default_baseline_emission(),
            anonymize: false,
        }
    }
}

impl RenderConfig {
    pub fn load_from_ron(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(input)?)
    }
}
