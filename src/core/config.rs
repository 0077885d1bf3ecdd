//! Configuration for the recognition pipeline.
//!
//! All thresholds of the quality heuristic, the decoder's ranking depth and
//! the sample provider's randomization knobs live here. Every field defaults
//! to the values the trained classifiers were built around, so an empty JSON
//! object is a valid configuration.

use crate::core::constants::DEFAULT_TOPK;
use crate::core::errors::{HcrError, HcrResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error indicating that a configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Error indicating that a configured path does not exist.
    #[error("path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    /// Error indicating that a value is outside its allowed range.
    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },
}

impl From<ConfigError> for HcrError {
    fn from(err: ConfigError) -> Self {
        HcrError::config_error(err.to_string())
    }
}

/// A trait for validating configuration parameters.
pub trait ConfigValidator {
    /// Validates the configuration.
    fn validate(&self) -> Result<(), ConfigError>;

    /// Returns the default configuration.
    fn get_defaults() -> Self
    where
        Self: Sized;

    /// Validates that a floating point value lies in `[min, max]`.
    fn validate_range(
        &self,
        value: f64,
        min: f64,
        max: f64,
        field: &str,
    ) -> Result<(), ConfigError> {
        if !value.is_finite() || value < min || value > max {
            return Err(ConfigError::OutOfRange {
                field: field.to_string(),
                min,
                max,
                value,
            });
        }
        Ok(())
    }

    /// Validates that a probability lies in `[0, 1]`.
    fn validate_probability(&self, value: f64, field: &str) -> Result<(), ConfigError> {
        self.validate_range(value, 0.0, 1.0, field)
    }

    /// Validates that a usize value is positive.
    fn validate_positive_usize(&self, value: usize, field_name: &str) -> Result<(), ConfigError> {
        if value == 0 {
            return Err(ConfigError::InvalidConfig {
                message: format!("{} must be greater than 0", field_name),
            });
        }
        Ok(())
    }
}

/// Thresholds for the four additive quality sub-checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Pixel standard deviation below which contrast is considered low.
    pub min_contrast_std: f64,
    /// Mean intensity below which the image is too dark.
    pub dark_mean: f64,
    /// Mean intensity above which the image is too bright.
    pub bright_mean: f64,
    /// Both dimensions must exceed this before the noise region is sampled.
    pub noise_check_min_dim: u32,
    /// Top-left corner of the square noise sampling region.
    pub noise_region_start: u32,
    /// Exclusive end (row and column) of the noise sampling region.
    pub noise_region_end: u32,
    /// Region standard deviation above which the image is considered noisy.
    pub max_noise_std: f64,
    /// Smaller dimension below which resolution is too low.
    pub min_resolution: u32,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_contrast_std: 30.0,
            dark_mean: 50.0,
            bright_mean: 200.0,
            noise_check_min_dim: 50,
            noise_region_start: 10,
            noise_region_end: 40,
            max_noise_std: 50.0,
            min_resolution: 100,
        }
    }
}

impl ConfigValidator for QualityConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_range(self.min_contrast_std, 0.0, 255.0, "min_contrast_std")?;
        self.validate_range(self.dark_mean, 0.0, 255.0, "dark_mean")?;
        self.validate_range(self.bright_mean, 0.0, 255.0, "bright_mean")?;
        self.validate_range(self.max_noise_std, 0.0, 255.0, "max_noise_std")?;
        if self.dark_mean > self.bright_mean {
            return Err(ConfigError::InvalidConfig {
                message: format!(
                    "dark_mean ({}) must not exceed bright_mean ({})",
                    self.dark_mean, self.bright_mean
                ),
            });
        }
        if self.noise_region_start >= self.noise_region_end {
            return Err(ConfigError::InvalidConfig {
                message: "noise region must be non-empty".to_string(),
            });
        }
        if self.noise_region_end > self.noise_check_min_dim + 1 {
            return Err(ConfigError::InvalidConfig {
                message: format!(
                    "noise region end ({}) must fit inside images larger than {}px",
                    self.noise_region_end, self.noise_check_min_dim
                ),
            });
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Settings for the prediction decoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// How many ranked classes to keep with each prediction.
    pub topk: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self { topk: DEFAULT_TOPK }
    }
}

impl ConfigValidator for DecoderConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_positive_usize(self.topk, "topk")
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Settings for the alphabet sample provider chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleConfig {
    /// Labeled reference dataset (CSV, label then 784 pixels per row).
    pub dataset_path: Option<PathBuf>,
    /// Extra TrueType fonts tried before the system font locations.
    pub font_paths: Vec<PathBuf>,
    /// Smallest procedural font size in pixels.
    pub min_font_size: u32,
    /// Largest procedural font size in pixels.
    pub max_font_size: u32,
    /// Font size used for centered, non-randomized renderings.
    pub fallback_font_size: u32,
    /// Maximum positional jitter in pixels along each axis.
    pub max_jitter: i32,
    /// Fraction of procedural samples that receive Gaussian noise.
    pub noise_probability: f64,
    /// Standard deviation of the Gaussian pixel noise.
    pub noise_sigma: f64,
    /// Fraction of procedural samples that are rotated.
    pub rotation_probability: f64,
    /// Maximum absolute rotation in whole degrees.
    pub max_rotation_degrees: i32,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            dataset_path: None,
            font_paths: Vec::new(),
            min_font_size: 12,
            max_font_size: 19,
            fallback_font_size: 18,
            max_jitter: 4,
            noise_probability: 0.7,
            noise_sigma: 12.0,
            rotation_probability: 0.4,
            max_rotation_degrees: 15,
        }
    }
}

impl ConfigValidator for SampleConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.min_font_size == 0 || self.min_font_size > self.max_font_size {
            return Err(ConfigError::InvalidConfig {
                message: format!(
                    "font size range [{}, {}] is invalid",
                    self.min_font_size, self.max_font_size
                ),
            });
        }
        self.validate_positive_usize(self.fallback_font_size as usize, "fallback_font_size")?;
        self.validate_range(self.max_jitter as f64, 0.0, 14.0, "max_jitter")?;
        self.validate_probability(self.noise_probability, "noise_probability")?;
        self.validate_probability(self.rotation_probability, "rotation_probability")?;
        self.validate_range(self.noise_sigma, 0.0, 255.0, "noise_sigma")?;
        self.validate_range(self.max_rotation_degrees as f64, 0.0, 180.0, "max_rotation_degrees")?;
        for path in &self.font_paths {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Top-level configuration of a [`crate::predictor::Recognizer`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    pub quality: QualityConfig,
    pub decoder: DecoderConfig,
    pub samples: SampleConfig,
}

impl RecognizerConfig {
    /// Parses and validates a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> HcrResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| HcrError::config_error(format!("failed to parse configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    pub fn from_json_file(path: &Path) -> HcrResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HcrError::config_error(format!(
                "failed to read configuration from '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&content)
    }
}

impl ConfigValidator for RecognizerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.quality.validate()?;
        self.decoder.validate()?;
        self.samples.validate()
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}
