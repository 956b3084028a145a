//! Garment region detection and classification module
//!
//! This module handles locating the garment in the photograph and
//! deriving a coarse garment type from its bounding box.

pub mod region;
pub mod garment;

pub use region::RegionDetector;
pub use garment::GarmentClassifier;
