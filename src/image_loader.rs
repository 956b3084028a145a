//! Image loading for uploaded clothing photographs
//!
//! Only JPEG and PNG are accepted, matching the upload endpoint. Every
//! image is decoded with the `image` crate and converted to an 8-bit RGB
//! raster (alpha and palette images are flattened), which is the only
//! raster type the pipeline consumes.

use std::path::Path;

use image::{ImageReader, RgbImage};

use crate::constants::upload::{ALLOWED_MIME_TYPES, MAX_UPLOAD_BYTES};
use crate::error::{AnalysisError, Result};

/// Accepted image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// JPEG image
    Jpeg,
    /// PNG image
    Png,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<ImageFormat> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            _ => None,
        }
    }

    /// Detect format from an upload's declared content type
    pub fn from_mime_type(mime: &str) -> Option<ImageFormat> {
        match mime.trim().to_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            "image/png" => Some(ImageFormat::Png),
            _ => None,
        }
    }

    fn codec(&self) -> image::ImageFormat {
        match self {
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
        }
    }
}

/// Load a JPEG or PNG file as an RGB raster
///
/// # Errors
///
/// Returns `AnalysisError` if:
/// - The extension is not `jpg`, `jpeg` or `png`
/// - The file cannot be opened
/// - Decoding fails
///
/// # Example
///
/// ```rust,no_run
/// use garment_scan::image_loader::load_image;
/// use std::path::Path;
///
/// let image = load_image(Path::new("photo.jpg"))?;
/// println!("Loaded image: {}x{}", image.width(), image.height());
/// # Ok::<(), garment_scan::AnalysisError>(())
/// ```
pub fn load_image(path: &Path) -> Result<RgbImage> {
    let format = ImageFormat::from_extension(path).ok_or_else(|| AnalysisError::UnsupportedFormat {
        format: path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("<none>")
            .to_string(),
    })?;

    let mut reader = ImageReader::open(path).map_err(|e| {
        AnalysisError::image_load(format!("Failed to open image file: {}", path.display()), e)
    })?;
    reader.set_format(format.codec());

    let image = reader.decode().map_err(|e| {
        AnalysisError::image_load(format!("Failed to decode image: {}", path.display()), e)
    })?;

    Ok(image.to_rgb8())
}

/// Decode uploaded bytes as an RGB raster
///
/// When `mime` is given it must be an accepted type and is used as the
/// decoder hint; otherwise the format is sniffed from the content and
/// must still be JPEG or PNG.
///
/// # Errors
///
/// Returns `AnalysisError` if the upload is larger than 10 MiB, has an
/// unsupported type, or cannot be decoded.
pub fn load_image_from_bytes(bytes: &[u8], mime: Option<&str>) -> Result<RgbImage> {
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(AnalysisError::UploadTooLarge {
            size: bytes.len(),
            limit: MAX_UPLOAD_BYTES,
        });
    }

    let format = match mime {
        Some(mime) => ImageFormat::from_mime_type(mime).ok_or_else(|| AnalysisError::UnsupportedFormat {
            format: mime.to_string(),
        })?,
        None => sniff_format(bytes)?,
    };

    let image = image::load_from_memory_with_format(bytes, format.codec())
        .map_err(|e| AnalysisError::image_load("Failed to decode uploaded image", e))?;

    Ok(image.to_rgb8())
}

fn sniff_format(bytes: &[u8]) -> Result<ImageFormat> {
    match image::guess_format(bytes) {
        Ok(image::ImageFormat::Jpeg) => Ok(ImageFormat::Jpeg),
        Ok(image::ImageFormat::Png) => Ok(ImageFormat::Png),
        Ok(other) => Err(AnalysisError::UnsupportedFormat {
            format: format!("{:?}", other),
        }),
        Err(e) => Err(AnalysisError::image_load("Unrecognised image content", e)),
    }
}

/// Check if a MIME type is accepted for upload
pub fn is_supported_mime_type(mime: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&mime.trim().to_lowercase().as_str())
}

/// Get list of all supported file extensions
pub fn supported_extensions() -> &'static [&'static str] {
    &["jpg", "jpeg", "png"]
}

/// Check if a file extension is supported
pub fn is_supported_extension(ext: &str) -> bool {
    let ext_lower = ext.to_lowercase();
    supported_extensions().contains(&ext_lower.as_str())
}
