//! Synthetic clothing photographs for integration tests

use image::{Rgb, RgbImage};

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Canvas of `background` with one filled `(x, y, width, height)` garment
pub fn garment_on_background(
    width: u32,
    height: u32,
    garment: (u32, u32, u32, u32),
    garment_color: Rgb<u8>,
    background: Rgb<u8>,
) -> RgbImage {
    let (gx, gy, gw, gh) = garment;
    RgbImage::from_fn(width, height, |x, y| {
        if x >= gx && x < gx + gw && y >= gy && y < gy + gh {
            garment_color
        } else {
            background
        }
    })
}

/// 100x200 black vertical silhouette on white
pub fn vertical_silhouette() -> RgbImage {
    garment_on_background(100, 200, (45, 20, 10, 160), BLACK, WHITE)
}

/// Deterministic noisy photograph-like raster
pub fn noisy_photo(width: u32, height: u32) -> RgbImage {
    let mut state: u32 = 0x9E37_79B9;
    RgbImage::from_fn(width, height, |x, y| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let noise = (state % 24) as u8;
        let in_garment = x > width / 4 && x < 3 * width / 4 && y > height / 6 && y < 5 * height / 6;
        if in_garment {
            Rgb([30 + noise, 40 + noise, 140 + noise])
        } else {
            Rgb([220 + noise / 2, 220 + noise / 2, 215 + noise / 2])
        }
    })
}
