//! Garment region detection
//!
//! Locates the garment as the largest connected foreground region:
//! - Converts the photograph to grayscale
//! - Binarizes with Otsu's global threshold, garment darker than background
//! - Traces outer contours of the foreground
//! - Returns the bounding rectangle of the contour enclosing the most area
//!
//! Detection is best effort. Whenever no region can be found the
//! all-zero [`BoundingBox::EMPTY`] is returned instead of an error.

use image::{imageops, GrayImage, Luma, RgbImage};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::contrast::otsu_level;
use log::debug;

use crate::config::RegionDetectionConfig;
use crate::BoundingBox;

const FOREGROUND: u8 = 255;
const BACKGROUND: u8 = 0;

/// Contour-based garment region detector
#[derive(Debug, Clone)]
pub struct RegionDetector {
    dark_foreground: bool,
    min_contour_area: f64,
}

impl Default for RegionDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionDetector {
    /// Create a detector for dark garments on light backgrounds
    pub fn new() -> Self {
        Self {
            dark_foreground: true,
            min_contour_area: 0.0,
        }
    }

    /// Create a detector from the region section of a pipeline config
    pub fn from_config(config: &RegionDetectionConfig) -> Self {
        Self {
            dark_foreground: config.dark_foreground,
            min_contour_area: config.min_contour_area,
        }
    }

    /// Detect the garment bounding box
    ///
    /// The returned box always lies inside the image. Empty or uniform
    /// images, and images whose contours are all below the minimum area,
    /// give [`BoundingBox::EMPTY`].
    pub fn detect(&self, image: &RgbImage) -> BoundingBox {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            debug!("RegionDetector: empty image, using fallback box");
            return BoundingBox::EMPTY;
        }

        let gray = imageops::grayscale(image);
        let Some(binary) = self.binarize(&gray) else {
            debug!("RegionDetector: uniform intensity, using fallback box");
            return BoundingBox::EMPTY;
        };

        let contours: Vec<Contour<i32>> = find_contours::<i32>(&binary)
            .into_iter()
            .filter(|contour| contour.border_type == BorderType::Outer && contour.parent.is_none())
            .collect();

        let largest = largest_contour(&contours, self.min_contour_area);
        debug!(
            "RegionDetector: {} external contours, largest area {:?}",
            contours.len(),
            largest.map(|(_, area)| area)
        );

        match largest {
            Some((contour, _)) => bounding_rect(contour, width, height),
            None => BoundingBox::EMPTY,
        }
    }

    /// Otsu binarization, foreground = 255. `None` when the image has a
    /// single intensity and therefore no threshold separates anything.
    fn binarize(&self, gray: &GrayImage) -> Option<GrayImage> {
        let (min, max) = gray
            .pixels()
            .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));
        if min == max {
            return None;
        }

        let level = otsu_level(gray);
        debug!("RegionDetector: otsu level {} (range {}..={})", level, min, max);

        let dark_foreground = self.dark_foreground;
        Some(GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
            let is_dark = gray.get_pixel(x, y)[0] <= level;
            if is_dark == dark_foreground {
                Luma([FOREGROUND])
            } else {
                Luma([BACKGROUND])
            }
        }))
    }
}

/// Polygon area enclosed by a contour (shoelace formula)
pub fn contour_area(contour: &Contour<i32>) -> f64 {
    let points = &contour.points;
    if points.len() < 3 {
        return 0.0;
    }
    let twice_area: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
        .sum();
    twice_area.abs() as f64 / 2.0
}

/// First contour with the maximum area, ignoring those below `min_area`
fn largest_contour(contours: &[Contour<i32>], min_area: f64) -> Option<(&Contour<i32>, f64)> {
    contours
        .iter()
        .map(|contour| (contour, contour_area(contour)))
        .filter(|(_, area)| *area >= min_area)
        .fold(None, |best: Option<(&Contour<i32>, f64)>, candidate| match best {
            Some((_, best_area)) if best_area >= candidate.1 => best,
            _ => Some(candidate),
        })
}

/// Axis-aligned pixel extent of a contour, clamped to the image
fn bounding_rect(contour: &Contour<i32>, image_width: u32, image_height: u32) -> BoundingBox {
    let mut points = contour.points.iter();
    let Some(first) = points.next() else {
        return BoundingBox::EMPTY;
    };

    let (min_x, min_y, max_x, max_y) = points.fold(
        (first.x, first.y, first.x, first.y),
        |(min_x, min_y, max_x, max_y), p| (min_x.min(p.x), min_y.min(p.y), max_x.max(p.x), max_y.max(p.y)),
    );

    let x = min_x.max(0) as u32;
    let y = min_y.max(0) as u32;
    if x >= image_width || y >= image_height || max_x < 0 || max_y < 0 {
        return BoundingBox::EMPTY;
    }
    let right = (max_x as u32 + 1).min(image_width);
    let bottom = (max_y as u32 + 1).min(image_height);

    BoundingBox::new(x, y, right - x, bottom - y)
}
