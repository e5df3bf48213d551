use image::{GrayImage, Luma};
use log::debug;
use qrcode::{EcLevel, QrCode};

use crate::error::WatermarkError;
use crate::result::Result;

/// Render options for the mark raster.
#[derive(Debug, Clone)]
pub struct QrOptions {
    /// Edge length of one QR module in pixels.
    ///
    /// Larger modules survive detection more reliably but cost cover
    /// capacity quadratically. The quiet zone is fixed at the standard
    /// 4 modules.
    pub module_size: u32,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self { module_size: 4 }
    }
}

/// Renders `text` as a bi-level QR raster.
///
/// Error correction level L, automatic symbol version, 4-module quiet
/// zone. Fails with [`WatermarkError::EncodingError`] when the text does
/// not fit any symbol version at level L.
pub fn render(text: &str, options: &QrOptions) -> Result<GrayImage> {
    let code = QrCode::with_error_correction_level(text.as_bytes(), EcLevel::L)
        .map_err(|_| WatermarkError::EncodingError)?;

    let module = options.module_size.max(1);
    Ok(code
        .render::<Luma<u8>>()
        .quiet_zone(true)
        .module_dimensions(module, module)
        .build())
}

/// Detects and decodes every QR symbol found in `raster`.
///
/// The raster may contain the symbol in a sub-region only, as produced by
/// the LSB extractor. Returns an empty list, never an error, when nothing
/// decodes.
pub fn decode(raster: &GrayImage) -> Vec<String> {
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        raster.width() as usize,
        raster.height() as usize,
        |x, y| raster.get_pixel(x as u32, y as u32).0[0],
    );

    let mut texts = Vec::new();
    for grid in prepared.detect_grids() {
        match grid.decode() {
            Ok((_, content)) => texts.push(content),
            Err(e) => debug!("detected a grid that did not decode: {e:?}"),
        }
    }

    texts
}
