//! Enrichment pipeline configuration.
//!
//! This module provides configuration for the anomaly detector and the
//! pipeline facade. Defaults reproduce the dashboard's fixed model setup:
//! 5% contamination, 100 trees, seed 42, and no scoring below 5 records.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default expected fraction of anomalous readings
pub const DEFAULT_CONTAMINATION: f64 = 0.05;
/// Default seed for the isolation forest
pub const DEFAULT_SEED: u64 = 42;
/// Default number of isolation trees
pub const DEFAULT_TREES: usize = 100;
/// Default cap on the per-tree subsample size
pub const DEFAULT_MAX_SAMPLES: usize = 256;
/// Below this many records no model is trained
pub const DEFAULT_MIN_RECORDS: usize = 5;

/// Outlier-detection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Enable statistical scoring; when disabled every record is Normal
    pub enabled: bool,
    /// Expected fraction of outliers, in (0.0, 0.5]
    pub contamination: f64,
    /// Seed for tree construction
    pub seed: u64,
    /// Number of isolation trees
    pub n_trees: usize,
    /// Upper bound on the subsample drawn for each tree
    pub max_samples: usize,
    /// Minimum number of records required before scoring
    pub min_records: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            contamination: DEFAULT_CONTAMINATION,
            seed: DEFAULT_SEED,
            n_trees: DEFAULT_TREES,
            max_samples: DEFAULT_MAX_SAMPLES,
            min_records: DEFAULT_MIN_RECORDS,
        }
    }
}

/// Validation errors for enrichment configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("contamination must be in (0.0, 0.5], got {0}")]
    InvalidContamination(f64),
    #[error("n_trees must be at least 1")]
    NoTrees,
    #[error("max_samples must be at least 2, got {0}")]
    InvalidMaxSamples(usize),
    #[error("min_records must be at least 2, got {0}")]
    InvalidMinRecords(usize),
}

impl DetectorConfig {
    /// Creates a new detector config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to enable/disable scoring.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Builder method to set the contamination rate.
    pub fn with_contamination(mut self, contamination: f64) -> Self {
        if !(contamination > 0.0 && contamination <= 0.5) {
            tracing::warn!(
                "contamination {} clamped to valid range (0.0, 0.5]",
                contamination
            );
        }
        self.contamination = clamp_contamination(contamination);
        self
    }

    /// Builder method to set the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builder method to set the number of trees.
    pub fn with_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees.max(1);
        self
    }

    /// Builder method to set the per-tree subsample cap.
    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = max_samples.max(2);
        self
    }

    /// Builder method to set the minimum record count.
    pub fn with_min_records(mut self, min_records: usize) -> Self {
        self.min_records = min_records.max(2);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(self.contamination > 0.0 && self.contamination <= 0.5) {
            return Err(ConfigValidationError::InvalidContamination(
                self.contamination,
            ));
        }
        if self.n_trees == 0 {
            return Err(ConfigValidationError::NoTrees);
        }
        if self.max_samples < 2 {
            return Err(ConfigValidationError::InvalidMaxSamples(self.max_samples));
        }
        if self.min_records < 2 {
            return Err(ConfigValidationError::InvalidMinRecords(self.min_records));
        }
        Ok(())
    }
}

/// Smallest contamination the builder will accept after clamping
const MIN_CONTAMINATION: f64 = 0.001;

fn clamp_contamination(contamination: f64) -> f64 {
    if contamination.is_nan() {
        return DEFAULT_CONTAMINATION;
    }
    contamination.clamp(MIN_CONTAMINATION, 0.5)
}

/// Pipeline facade configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Anomaly detection settings
    pub detector: DetectorConfig,
}

impl PipelineConfig {
    /// Creates a new pipeline config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the detector config.
    pub fn with_detector(mut self, detector: DetectorConfig) -> Self {
        self.detector = detector;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.detector.validate()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_detector_config_default() {
        let config = DetectorConfig::default();
        assert!(config.enabled);
        assert_eq!(config.contamination, 0.05);
        assert_eq!(config.seed, 42);
        assert_eq!(config.n_trees, 100);
        assert_eq!(config.max_samples, 256);
        assert_eq!(config.min_records, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_detector_config_builder() {
        let config = DetectorConfig::new()
            .with_enabled(false)
            .with_contamination(0.1)
            .with_seed(7)
            .with_trees(50)
            .with_max_samples(64)
            .with_min_records(10);

        assert!(!config.enabled);
        assert_eq!(config.contamination, 0.1);
        assert_eq!(config.seed, 7);
        assert_eq!(config.n_trees, 50);
        assert_eq!(config.max_samples, 64);
        assert_eq!(config.min_records, 10);
    }

    #[test]
    fn test_contamination_clamping() {
        assert_eq!(DetectorConfig::new().with_contamination(0.9).contamination, 0.5);
        assert_eq!(
            DetectorConfig::new().with_contamination(0.0).contamination,
            MIN_CONTAMINATION
        );
        assert_eq!(
            DetectorConfig::new().with_contamination(f64::NAN).contamination,
            DEFAULT_CONTAMINATION
        );
    }

    #[test]
    fn test_builder_floors() {
        let config = DetectorConfig::new()
            .with_trees(0)
            .with_max_samples(0)
            .with_min_records(1);
        assert_eq!(config.n_trees, 1);
        assert_eq!(config.max_samples, 2);
        assert_eq!(config.min_records, 2);
    }

    #[test]
    fn test_validate_invalid_contamination() {
        // Set the field directly to bypass clamping
        let config = DetectorConfig {
            contamination: 0.0,
            ..DetectorConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::InvalidContamination(0.0))
        );
    }

    #[test]
    fn test_validate_no_trees() {
        let config = DetectorConfig {
            n_trees: 0,
            ..DetectorConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigValidationError::NoTrees));
    }

    #[test]
    fn test_validate_min_records() {
        let config = DetectorConfig {
            min_records: 1,
            ..DetectorConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::InvalidMinRecords(1))
        );
    }

    #[test]
    fn test_pipeline_config_serde_roundtrip() {
        let config =
            PipelineConfig::new().with_detector(DetectorConfig::new().with_contamination(0.2));

        let json = serde_json::to_string(&config).unwrap();
        let deserialized: PipelineConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config, deserialized);
        assert!(deserialized.validate().is_ok());
    }
}
