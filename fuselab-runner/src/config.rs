//! Serializable pipeline configuration.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Unique identifier for a pipeline run (content-addressable hash).
pub type RunId = String;

/// Errors loading or validating a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("rolling_window must be at least 2, got {0}")]
    WindowTooSmall(usize),

    #[error("edge_threshold must lie in [0, 1), got {0}")]
    ThresholdOutOfRange(f64),

    #[error("analysis window start {start} is after end {end}")]
    InvertedWindow { start: NaiveDate, end: NaiveDate },
}

/// Serializable configuration for a single pipeline run.
///
/// Captures everything needed to reproduce a run: the analysis window,
/// the volatility lookback, and the correlation reporting knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    /// Analysis window start (inclusive); open when absent.
    #[serde(default)]
    pub start: Option<NaiveDate>,

    /// Analysis window end (inclusive); open when absent.
    #[serde(default)]
    pub end: Option<NaiveDate>,

    /// Trailing window for rolling volatility, in rows.
    #[serde(default = "default_rolling_window")]
    pub rolling_window: usize,

    /// How many top correlation pairs to report.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Minimum |r| for a relationship-graph edge.
    #[serde(default = "default_edge_threshold")]
    pub edge_threshold: f64,
}

fn default_rolling_window() -> usize {
    7
}

fn default_top_k() -> usize {
    5
}

fn default_edge_threshold() -> f64 {
    0.3
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            rolling_window: default_rolling_window(),
            top_k: default_top_k(),
            edge_threshold: default_edge_threshold(),
        }
    }
}

impl PipelineConfig {
    /// Load and validate a TOML configuration file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rolling_window < 2 {
            return Err(ConfigError::WindowTooSmall(self.rolling_window));
        }
        if !(0.0..1.0).contains(&self.edge_threshold) {
            return Err(ConfigError::ThresholdOutOfRange(self.edge_threshold));
        }
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(ConfigError::InvertedWindow { start, end });
            }
        }
        Ok(())
    }

    /// Computes a deterministic hash ID for this configuration.
    ///
    /// Two runs with identical configs share a RunId, so outputs can be
    /// traced back to the exact parameters that produced them.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("PipelineConfig serialization failed");
        let hash = blake3::hash(json.as_bytes());
        format!("{}", hash.to_hex())
    }
}
