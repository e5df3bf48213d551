//! Visual fidelity metrics between an original and a watermarked raster.

use std::fmt;

use image::RgbImage;

use crate::error::WatermarkError;
use crate::result::Result;

/// Finite PSNR stand-in for identical images; keeps the value representable
/// where infinity is not.
pub const PSNR_IDENTICAL: f64 = 999.99;

const MAX_PIXEL_VALUE: f64 = 255.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    Identical,
    VeryGood,
    Good,
    Fair,
    Poor,
}

impl Quality {
    fn from_psnr(psnr: f64) -> Self {
        if psnr >= PSNR_IDENTICAL {
            Self::Identical
        } else if psnr > 40.0 {
            Self::VeryGood
        } else if psnr > 30.0 {
            Self::Good
        } else if psnr > 20.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Identical => "identical",
            Self::VeryGood => "very good",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
        };
        f.write_str(label)
    }
}

/// Per-image fidelity score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fidelity {
    pub mse: f64,
    pub psnr: f64,
    pub quality: Quality,
}

/// Computes MSE and PSNR over all three channels of two equally-sized rasters.
pub fn mse_psnr(a: &RgbImage, b: &RgbImage) -> Result<Fidelity> {
    if a.dimensions() != b.dimensions() {
        return Err(WatermarkError::DimensionMismatch {
            width_a: a.width(),
            height_a: a.height(),
            width_b: b.width(),
            height_b: b.height(),
        });
    }

    let mut sum = 0.0f64;
    for (pa, pb) in a.pixels().zip(b.pixels()) {
        for channel in 0..3 {
            let delta = f64::from(pa.0[channel]) - f64::from(pb.0[channel]);
            sum += delta * delta;
        }
    }

    let samples = f64::from(a.width()) * f64::from(a.height()) * 3.0;
    let mse = sum / samples;

    let psnr = if mse == 0.0 {
        PSNR_IDENTICAL
    } else {
        (20.0 * (MAX_PIXEL_VALUE / mse.sqrt()).log10()).clamp(0.0, PSNR_IDENTICAL)
    };

    Ok(Fidelity {
        mse,
        psnr,
        quality: Quality::from_psnr(psnr),
    })
}
