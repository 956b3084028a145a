//! Configuration structures for the garment_scan feature pipeline.
//!
//! This module defines all tunable parameters for feature extraction,
//! organized into one section per pipeline stage.
//!
//! # Configuration Loading
//!
//! Configuration can be loaded from JSON files or constructed programmatically:
//!
//! ```no_run
//! use garment_scan::PipelineConfig;
//! use std::path::Path;
//!
//! // Load from file
//! let config = PipelineConfig::from_json_file(Path::new("config.json"))?;
//!
//! // Or use defaults
//! let config = PipelineConfig::default();
//! # Ok::<(), garment_scan::AnalysisError>(())
//! ```
//!
//! Every section is `#[serde(default)]`, so a file only needs to name the
//! values it changes.
//!
//! # Configuration Sections
//!
//! - [`ClusteringConfig`]: palette size and k-means budget
//! - [`RegionDetectionConfig`]: binarization polarity and contour filtering
//! - [`ClassificationConfig`]: aspect-ratio cut points
//! - [`TaggingConfig`]: ordered color tag rules

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::tagging::{self, TagRule};
use crate::constants;
use crate::{AnalysisError, Result};

/// Complete pipeline configuration for feature extraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Color clustering configuration
    pub clustering: ClusteringConfig,

    /// Garment region detection configuration
    pub region_detection: RegionDetectionConfig,

    /// Garment type classification configuration
    pub classification: ClassificationConfig,

    /// Color tag configuration
    pub tagging: TaggingConfig,
}

/// Color clustering parameters.
///
/// Controls the k-means run used both for the palette and for the single
/// color that feeds tagging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Number of palette colors (k)
    pub palette_size: usize,

    /// Maximum Lloyd iterations
    pub max_iterations: usize,

    /// Stop once no centroid moves further than this (channel units)
    pub tolerance: f64,

    /// Seed for k-means++ initialisation
    pub seed: u64,

    /// Maximum number of pixels clustered; larger rasters are strided
    pub sample_limit: usize,

    /// Order centroids by assigned-pixel count instead of internal index
    pub sort_by_population: bool,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            palette_size: constants::clustering::PALETTE_SIZE,
            max_iterations: constants::clustering::MAX_ITERATIONS,
            tolerance: constants::clustering::TOLERANCE,
            seed: constants::clustering::SEED,
            sample_limit: constants::clustering::SAMPLE_LIMIT,
            sort_by_population: true,
        }
    }
}

/// Garment region detection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionDetectionConfig {
    /// Treat pixels darker than the Otsu threshold as garment
    /// (garment photographed on a light background)
    pub dark_foreground: bool,

    /// Contours enclosing less area than this (pixels²) are ignored
    pub min_contour_area: f64,
}

impl Default for RegionDetectionConfig {
    fn default() -> Self {
        Self {
            dark_foreground: true,
            min_contour_area: 0.0,
        }
    }
}

/// Garment classification parameters.
///
/// Aspect ratio is box height divided by box width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Upper (exclusive) ratio bound for shirts
    pub shirt_max_ratio: f64,

    /// Upper (exclusive) ratio bound for pants; anything taller is full body
    pub pants_max_ratio: f64,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            shirt_max_ratio: constants::classification::SHIRT_MAX_ASPECT_RATIO,
            pants_max_ratio: constants::classification::PANTS_MAX_ASPECT_RATIO,
        }
    }
}

/// Color tag parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggingConfig {
    /// Rules in priority order; the first match wins
    pub rules: Vec<TagRule>,
}

impl Default for TaggingConfig {
    fn default() -> Self {
        Self {
            rules: tagging::default_rules(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AnalysisError::config(format!("Failed to read {}", path.display()), e)
        })?;
        Self::from_json_str(&content)
    }

    /// Parse configuration from a JSON string
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| AnalysisError::config("Failed to parse configuration", e))
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AnalysisError::config("Failed to serialize configuration", e))?;
        std::fs::write(path, json).map_err(|e| {
            AnalysisError::config(format!("Failed to write {}", path.display()), e)
        })
    }

    /// Check that every parameter is usable
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidParameter` naming the first offending value.
    pub fn validate(&self) -> Result<()> {
        let clustering = &self.clustering;
        if clustering.palette_size == 0 {
            return Err(AnalysisError::invalid_parameter("clustering.palette_size", 0));
        }
        if clustering.max_iterations == 0 {
            return Err(AnalysisError::invalid_parameter("clustering.max_iterations", 0));
        }
        if !clustering.tolerance.is_finite() || clustering.tolerance < 0.0 {
            return Err(AnalysisError::invalid_parameter(
                "clustering.tolerance",
                clustering.tolerance,
            ));
        }
        if clustering.sample_limit == 0 {
            return Err(AnalysisError::invalid_parameter("clustering.sample_limit", 0));
        }

        let min_area = self.region_detection.min_contour_area;
        if !min_area.is_finite() || min_area < 0.0 {
            return Err(AnalysisError::invalid_parameter(
                "region_detection.min_contour_area",
                min_area,
            ));
        }

        let classification = &self.classification;
        if !(classification.shirt_max_ratio.is_finite() && classification.shirt_max_ratio > 0.0) {
            return Err(AnalysisError::invalid_parameter(
                "classification.shirt_max_ratio",
                classification.shirt_max_ratio,
            ));
        }
        if !(classification.pants_max_ratio.is_finite()
            && classification.pants_max_ratio > classification.shirt_max_ratio)
        {
            return Err(AnalysisError::invalid_parameter(
                "classification.pants_max_ratio",
                classification.pants_max_ratio,
            ));
        }

        for (index, rule) in self.tagging.rules.iter().enumerate() {
            if !rule.is_satisfiable() {
                return Err(AnalysisError::invalid_parameter(
                    format!("tagging.rules[{}]", index),
                    rule.tag,
                ));
            }
        }

        Ok(())
    }
}
