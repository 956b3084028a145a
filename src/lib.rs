//! # Garment Scan
//!
//! A Rust crate for extracting wardrobe features from a single clothing photograph.
//!
//! This library produces, for one decoded RGB image:
//! - A dominant color and a small color palette (k-means clustering)
//! - A bounding box around the garment (Otsu binarization + largest contour)
//! - A coarse garment type derived from the box aspect ratio
//! - Descriptive color tags from an ordered rule table
//!
//! ## Example
//!
//! ```rust,no_run
//! use garment_scan::extract_features;
//! use std::path::Path;
//!
//! let record = extract_features(
//!     Path::new("shirt.jpg"),
//!     "https://cdn.example.com/u1/shirt.jpg",
//!     "u1",
//! )?;
//! println!("{} {} {:?}", record.clothing_type, record.dominant_color.to_hex(), record.tags);
//! # Ok::<(), garment_scan::AnalysisError>(())
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexSet;
use palette::Srgb;
use serde::{Deserialize, Serialize};

pub mod error;
pub mod constants;
pub mod config;
pub mod image_loader;
pub mod color;
pub mod detection;
pub mod pipeline;
pub mod storage;

pub use config::PipelineConfig;
pub use error::{AnalysisError, Result};
pub use pipeline::FeaturePipeline;
pub use storage::{FeatureStore, InMemoryFeatureStore, StoredId};

/// An 8-bit RGB color, typically a rounded cluster centroid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ColorSample {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ColorSample {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a sample from floating point channels, rounding to the nearest integer
    pub fn from_channels(channels: [f64; 3]) -> Self {
        let round = |v: f64| v.round().clamp(0.0, 255.0) as u8;
        Self::new(round(channels[0]), round(channels[1]), round(channels[2]))
    }

    /// Parse `#RRGGBB`, `RRGGBB` or the short `#RGB` form
    pub fn from_hex(hex: &str) -> Result<Self> {
        Srgb::<u8>::from_str(hex)
            .map(Self::from)
            .map_err(|_| AnalysisError::invalid_parameter("hex color", hex))
    }

    /// Uppercase `#RRGGBB` representation
    pub fn to_hex(&self) -> String {
        format!("#{:X}", Srgb::from(*self))
    }

    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<Srgb<u8>> for ColorSample {
    fn from(color: Srgb<u8>) -> Self {
        Self::new(color.red, color.green, color.blue)
    }
}

impl From<ColorSample> for Srgb<u8> {
    fn from(color: ColorSample) -> Self {
        Srgb::new(color.r, color.g, color.b)
    }
}

/// Axis-aligned garment region in pixel coordinates
///
/// The all-zero box means no foreground region was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Fallback box reported when detection finds nothing
    pub const EMPTY: BoundingBox = BoundingBox {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    };

    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// True for boxes with no area (including the fallback box)
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Height divided by width, `None` for degenerate boxes
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        let ratio = self.height as f64 / self.width as f64;
        ratio.is_finite().then_some(ratio)
    }

    /// Whether the box lies inside an image of the given size
    pub fn fits_within(&self, image_width: u32, image_height: u32) -> bool {
        self.x as u64 + self.width as u64 <= image_width as u64
            && self.y as u64 + self.height as u64 <= image_height as u64
    }
}

/// Coarse garment category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClothingType {
    Shirt,
    Pants,
    FullBody,
    /// Only produced when classification itself fails
    Unknown,
}

impl ClothingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClothingType::Shirt => "shirt",
            ClothingType::Pants => "pants",
            ClothingType::FullBody => "full_body",
            ClothingType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ClothingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Features extracted from one clothing photograph
///
/// Field names are the contract consumed by the outfit recommender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRecord {
    /// Most representative color of the photograph
    pub dominant_color: ColorSample,
    /// Multi-color palette, most populous first unless configured otherwise
    pub palette: Vec<ColorSample>,
    /// Garment region
    pub bounding_box: BoundingBox,
    /// Garment category
    pub clothing_type: ClothingType,
    /// Descriptive tags in insertion order
    pub tags: IndexSet<String>,
    /// Public URL of the uploaded image
    pub source_image_url: String,
    /// Wardrobe owner
    pub owner_id: String,
}

impl FeatureRecord {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// Extract features from an image file with the default pipeline
///
/// Nothing is persisted; use [`FeaturePipeline::process`] with a
/// [`FeatureStore`] for that.
///
/// # Errors
///
/// Returns `AnalysisError` if the file is not a readable JPEG or PNG image
/// or decodes to an empty raster.
pub fn extract_features(image_path: &Path, image_url: &str, owner_id: &str) -> Result<FeatureRecord> {
    let image = image_loader::load_image(image_path)?;
    FeaturePipeline::new().process(&image, image_url, owner_id, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_record_serialization() {
        let record = FeatureRecord {
            dominant_color: ColorSample::new(255, 0, 0),
            palette: vec![ColorSample::new(255, 0, 0), ColorSample::new(250, 250, 250)],
            bounding_box: BoundingBox::new(10, 10, 100, 100),
            clothing_type: ClothingType::FullBody,
            tags: ["red".to_string()].into_iter().collect(),
            source_image_url: "https://example.com/shirt1.jpg".to_string(),
            owner_id: "test_user".to_string(),
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"clothing_type\":\"full_body\""));
        assert!(json.contains("\"dominant_color\":{\"r\":255,\"g\":0,\"b\":0}"));

        let deserialized: FeatureRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, deserialized);
    }

    #[test]
    fn test_color_sample_hex() {
        assert_eq!(ColorSample::new(255, 0, 0).to_hex(), "#FF0000");
        assert_eq!(ColorSample::new(3, 102, 204).to_hex(), "#0366CC");
        assert_eq!(ColorSample::from_hex("#0366cc").unwrap(), ColorSample::new(3, 102, 204));
        assert!(ColorSample::from_hex("not a color").is_err());
    }

    #[test]
    fn test_from_channels_rounds_and_clamps() {
        let sample = ColorSample::from_channels([254.6, 0.4, -3.0]);
        assert_eq!(sample, ColorSample::new(255, 0, 0));
        assert_eq!(ColorSample::from_channels([300.0, 127.5, 12.49]), ColorSample::new(255, 128, 12));
    }

    #[test]
    fn test_bounding_box_aspect_ratio() {
        assert_eq!(BoundingBox::new(45, 20, 10, 160).aspect_ratio(), Some(16.0));
        assert_eq!(BoundingBox::EMPTY.aspect_ratio(), None);
        assert_eq!(BoundingBox::new(0, 0, 0, 10).aspect_ratio(), None);
        assert_eq!(BoundingBox::new(0, 0, 10, 0).aspect_ratio(), None);
    }

    #[test]
    fn test_bounding_box_fits_within() {
        let bbox = BoundingBox::new(45, 20, 10, 160);
        assert!(bbox.fits_within(100, 200));
        assert!(bbox.fits_within(55, 180));
        assert!(!bbox.fits_within(54, 180));
        assert!(BoundingBox::EMPTY.fits_within(0, 0));
    }

    #[test]
    fn test_clothing_type_labels() {
        assert_eq!(ClothingType::FullBody.to_string(), "full_body");
        assert_eq!(serde_json::to_string(&ClothingType::Pants).unwrap(), "\"pants\"");
        let parsed: ClothingType = serde_json::from_str("\"unknown\"").unwrap();
        assert_eq!(parsed, ClothingType::Unknown);
    }
}
