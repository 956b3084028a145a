//! Default tunables for feature extraction
//!
//! Grouped by pipeline stage. Every value here can be overridden through
//! [`crate::config::PipelineConfig`].

/// Color clustering defaults
pub mod clustering {
    /// Number of colors in the extracted palette
    pub const PALETTE_SIZE: usize = 3;

    /// Upper bound on Lloyd iterations per clustering run
    pub const MAX_ITERATIONS: usize = 50;

    /// Convergence threshold: largest centroid move, in 8-bit channel units
    pub const TOLERANCE: f64 = 0.01;

    /// Seed for k-means++ initialisation
    pub const SEED: u64 = 42;

    /// Maximum number of pixels fed to the clusterer (512 x 512)
    pub const SAMPLE_LIMIT: usize = 262_144;
}

/// Garment classification defaults
pub mod classification {
    /// Boxes with height / width below this are shirts
    /// (at least one and a half times as wide as tall)
    pub const SHIRT_MAX_ASPECT_RATIO: f64 = 1.0 / 1.5;

    /// Boxes with height / width below this (and not shirts) are pants
    pub const PANTS_MAX_ASPECT_RATIO: f64 = 1.8;
}

/// Upload acceptance limits
pub mod upload {
    /// Largest accepted upload (10 MiB)
    pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

    /// Accepted MIME types
    pub const ALLOWED_MIME_TYPES: [&str; 2] = ["image/jpeg", "image/png"];
}
