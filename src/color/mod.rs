//! Color clustering and tagging module
//!
//! This module handles grouping image pixels into a color palette and
//! naming a representative color with a descriptive tag.

pub mod clustering;
pub mod tagging;

pub use clustering::{ColorCluster, ColorClusterer};
pub use tagging::{ColorTag, TagDeriver, TagRule};
