//! Error types for the garment_scan library

use thiserror::Error;

/// Result type alias for garment_scan operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors surfaced by feature extraction.
///
/// Only input problems (loading, decoding, an empty raster) and invalid
/// configuration reach the caller of the pipeline. Stage-local degradations
/// such as "no contour found" are encoded in the result instead.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Image file or upload could not be read or decoded
    #[error("Failed to load image: {message}")]
    ImageLoadError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Image format is not one of the accepted upload formats
    #[error("Unsupported image format: {format}")]
    UnsupportedFormat { format: String },

    /// Upload exceeds the accepted size
    #[error("Upload too large: {size} bytes (limit {limit} bytes)")]
    UploadTooLarge { size: usize, limit: usize },

    /// Decoded raster cannot be analysed
    #[error("Invalid image: {reason}")]
    InvalidImage { reason: String },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    /// Configuration file could not be read or written
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Feature record could not be stored
    #[error("Persistence error: {message}")]
    PersistenceError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl AnalysisError {
    /// Create an image load error with context
    pub fn image_load<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ImageLoadError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error with context
    pub fn config<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ConfigError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a persistence error without an underlying cause
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::PersistenceError {
            message: message.into(),
            source: None,
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    /// Check if this error is absorbed by the pipeline rather than returned
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AnalysisError::PersistenceError { .. })
    }

    /// Get user-friendly error description for application display
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::ImageLoadError { .. } | AnalysisError::InvalidImage { .. } => {
                "Could not read the image. Please check the file and try again.".to_string()
            }
            AnalysisError::UnsupportedFormat { .. } => {
                "Invalid file type. Only PNG and JPEG are supported.".to_string()
            }
            AnalysisError::UploadTooLarge { limit, .. } => {
                format!("File size exceeds the {}MB limit.", limit / (1024 * 1024))
            }
            AnalysisError::PersistenceError { .. } => {
                "The item was analysed but could not be saved to your wardrobe.".to_string()
            }
            _ => "Image analysis failed. Please try with a different image.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_persistence_is_recoverable() {
        assert!(AnalysisError::persistence("disk full").is_recoverable());
        assert!(!AnalysisError::InvalidImage { reason: "empty".into() }.is_recoverable());
        assert!(!AnalysisError::invalid_parameter("palette_size", 0).is_recoverable());
    }

    #[test]
    fn test_upload_too_large_message() {
        let err = AnalysisError::UploadTooLarge {
            size: 11 * 1024 * 1024,
            limit: 10 * 1024 * 1024,
        };
        assert_eq!(err.user_message(), "File size exceeds the 10MB limit.");
        assert!(err.to_string().contains("limit 10485760"));
    }

    #[test]
    fn test_image_load_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = AnalysisError::image_load("Failed to open image file", io);
        assert!(std::error::Error::source(&err).is_some());
    }
}
