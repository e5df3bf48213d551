//! One bit per pixel, blue channel only.
//!
//! The mark is anchored at the cover's top-left corner at native size; the
//! rest of the bit-plane is zero-padded. `embed` and `extract` share that
//! convention, so extraction yields a cover-sized plane with the symbol in
//! its top-left sub-region.

use image::{GrayImage, Luma, RgbImage};

use crate::error::WatermarkError;
use crate::result::Result;

/// Mark pixels below this luma count as dark modules (bit 1).
const DARK_THRESHOLD: u8 = 128;

/// Number of embeddable bits: one per pixel.
pub fn capacity(cover: &RgbImage) -> u64 {
    u64::from(cover.width()) * u64::from(cover.height())
}

/// Embeds `mark` into the blue-channel LSB plane of `cover`.
///
/// Every other bit of every channel is left untouched. Fails with
/// [`WatermarkError::CapacityError`] when the mark exceeds the cover in
/// either dimension, which is exactly when its bits cannot all be placed.
pub fn embed(cover: &RgbImage, mark: &GrayImage) -> Result<RgbImage> {
    if mark.width() > cover.width() || mark.height() > cover.height() {
        return Err(WatermarkError::CapacityError {
            cover_width: cover.width(),
            cover_height: cover.height(),
            mark_width: mark.width(),
            mark_height: mark.height(),
        });
    }

    let mut stamped = cover.clone();
    for (x, y, pixel) in stamped.enumerate_pixels_mut() {
        let bit = x < mark.width() && y < mark.height() && mark.get_pixel(x, y).0[0] < DARK_THRESHOLD;
        pixel.0[2] = (pixel.0[2] & (u8::MAX - 1)) | u8::from(bit);
    }

    Ok(stamped)
}

/// Reads the blue-channel LSB plane of `cover` back into a bi-level raster
/// of the cover's dimensions. Bit 1 becomes a black pixel.
pub fn extract(cover: &RgbImage) -> GrayImage {
    GrayImage::from_fn(cover.width(), cover.height(), |x, y| {
        if cover.get_pixel(x, y).0[2] & 1 == 1 {
            Luma([0])
        } else {
            Luma([u8::MAX])
        }
    })
}

/// Distribution of the blue-channel LSB plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LsbStats {
    pub zeros: u64,
    pub ones: u64,
}

impl LsbStats {
    pub fn ones_ratio(&self) -> f64 {
        let total = self.zeros + self.ones;
        if total == 0 {
            return 0.0;
        }
        self.ones as f64 / total as f64
    }
}

/// Counts the blue-channel LSB distribution of `cover`.
pub fn lsb_stats(cover: &RgbImage) -> LsbStats {
    let mut stats = LsbStats { zeros: 0, ones: 0 };
    for pixel in cover.pixels() {
        if pixel.0[2] & 1 == 1 {
            stats.ones += 1;
        } else {
            stats.zeros += 1;
        }
    }
    stats
}
