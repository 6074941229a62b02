//! Engine tuning parameters.
//!
//! Defaults match the values the rankers were calibrated with. A config file
//! only needs to name the fields it overrides.

use crate::error::{Result, SearchError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// BM25 term frequency saturation.
pub const DEFAULT_K1: f32 = 1.5;
/// BM25 document length normalization.
pub const DEFAULT_B: f32 = 0.75;
/// Vocabulary cap for the vector index.
pub const DEFAULT_MAX_FEATURES: usize = 5000;
/// Snippet window in characters.
pub const DEFAULT_SNIPPET_WINDOW: usize = 240;
pub const DEFAULT_TOP_K: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub k1: f32,
    pub b: f32,
    pub max_features: usize,
    pub snippet_window: usize,
    pub default_top_k: usize,
    pub highlight_open: String,
    pub highlight_close: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            k1: DEFAULT_K1,
            b: DEFAULT_B,
            max_features: DEFAULT_MAX_FEATURES,
            snippet_window: DEFAULT_SNIPPET_WINDOW,
            default_top_k: DEFAULT_TOP_K,
            highlight_open: "<mark>".into(),
            highlight_close: "</mark>".into(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| SearchError::Config {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| SearchError::Config {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;
        config.validate().map_err(|e| SearchError::Config {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;
        Ok(config)
    }

    /// Reject BM25 parameters the scoring formula is undefined or inverted for.
    pub fn validate(&self) -> Result<()> {
        if !self.k1.is_finite() || self.k1 < 0.0 {
            return Err(SearchError::InvalidParameter { name: "k1", value: self.k1, expected: "a finite value >= 0" });
        }
        if !(0.0..=1.0).contains(&self.b) {
            return Err(SearchError::InvalidParameter { name: "b", value: self.b, expected: "0 <= b <= 1" });
        }
        Ok(())
    }
}
