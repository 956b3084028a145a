//! Garment type classification from the detected region
//!
//! The aspect ratio (height / width) of the garment box is split into
//! three bands by two cut points:
//!
//! | ratio                              | type        |
//! |------------------------------------|-------------|
//! | `< shirt_max_ratio`                | `shirt`     |
//! | `shirt_max_ratio..pants_max_ratio` | `pants`     |
//! | `>= pants_max_ratio`               | `full_body` |
//!
//! The default shirt cut point (1 / 1.5) takes garments at least one and a
//! half times wider than tall. Tall boxes are never pants: everything at or
//! above `pants_max_ratio` is `full_body`.
//!
//! Boxes without a usable ratio (zero width or height) are `unknown`.

use log::debug;

use crate::config::ClassificationConfig;
use crate::constants;
use crate::{BoundingBox, ClothingType};

/// Aspect-ratio garment classifier
#[derive(Debug, Clone)]
pub struct GarmentClassifier {
    shirt_max_ratio: f64,
    pants_max_ratio: f64,
}

impl Default for GarmentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl GarmentClassifier {
    /// Create a classifier with the default cut points
    pub fn new() -> Self {
        Self {
            shirt_max_ratio: constants::classification::SHIRT_MAX_ASPECT_RATIO,
            pants_max_ratio: constants::classification::PANTS_MAX_ASPECT_RATIO,
        }
    }

    /// Create a classifier with custom cut points
    pub fn with_params(shirt_max_ratio: f64, pants_max_ratio: f64) -> Self {
        Self {
            shirt_max_ratio,
            pants_max_ratio,
        }
    }

    /// Create a classifier from the classification section of a pipeline config
    pub fn from_config(config: &ClassificationConfig) -> Self {
        Self::with_params(config.shirt_max_ratio, config.pants_max_ratio)
    }

    /// Classify a garment box
    pub fn classify(&self, bbox: &BoundingBox) -> ClothingType {
        let Some(ratio) = bbox.aspect_ratio() else {
            debug!("GarmentClassifier: no aspect ratio for {:?}", bbox);
            return ClothingType::Unknown;
        };

        if ratio < self.shirt_max_ratio {
            ClothingType::Shirt
        } else if ratio < self.pants_max_ratio {
            ClothingType::Pants
        } else {
            ClothingType::FullBody
        }
    }
}
