pub mod lsb_codec;

use std::io::Cursor;

use image::{GrayImage, RgbImage};

use crate::error::WatermarkError;
use crate::result::Result;

/// A carrier raster pulled out of a document container.
///
/// `identity` is container-relative (a DOCX media part name, or a
/// `page{n}/{name}` path for PDF image objects) and `index` preserves the
/// extraction order, so the Nth extracted image maps onto the Nth
/// reconstructed one.
#[derive(Debug, Clone)]
pub struct CoverImage {
    pub pixels: RgbImage,
    pub identity: String,
    pub index: usize,
}

impl CoverImage {
    pub fn new(pixels: RgbImage, identity: impl Into<String>, index: usize) -> Self {
        Self {
            pixels,
            identity: identity.into(),
            index,
        }
    }
}

/// Encodes an RGB raster as PNG bytes.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, image::ImageFormat::Png)
        .map_err(|_| WatermarkError::ImageEncodingError)?;
    Ok(buf.into_inner())
}

/// Encodes a grayscale raster (a mark or an extracted bit-plane) as PNG bytes.
pub fn encode_gray_png(image: &GrayImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, image::ImageFormat::Png)
        .map_err(|_| WatermarkError::ImageEncodingError)?;
    Ok(buf.into_inner())
}

/// Decodes arbitrary raster bytes (PNG, JPEG, ...) into an RGB buffer.
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage> {
    Ok(image::load_from_memory(bytes)
        .map_err(|_| WatermarkError::InvalidImageMedia)?
        .to_rgb8())
}

/// Mean value of each channel, for quick carrier characterization.
pub fn channel_means(image: &RgbImage) -> [f64; 3] {
    let count = f64::from(image.width()) * f64::from(image.height());
    if count == 0.0 {
        return [0.0; 3];
    }

    let mut sums = [0.0f64; 3];
    for pixel in image.pixels() {
        for (sum, value) in sums.iter_mut().zip(pixel.0) {
            *sum += f64::from(value);
        }
    }
    sums.map(|sum| sum / count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn should_round_trip_png_encoding() {
        let img = RgbImage::from_fn(8, 8, |x, y| Rgb([x as u8, y as u8, (x + y) as u8]));

        let png = encode_png(&img).unwrap();
        let decoded = decode_rgb(&png).unwrap();

        assert_eq!(img, decoded, "PNG round trip was not lossless");
    }

    #[test]
    fn should_reject_non_image_bytes() {
        match decode_rgb(b"definitely not a raster") {
            Err(WatermarkError::InvalidImageMedia) => (),
            other => panic!("Expected InvalidImageMedia, got {other:?}"),
        }
    }

    #[test]
    fn should_average_each_channel_independently() {
        let mut img = RgbImage::from_pixel(2, 2, Rgb([10, 20, 30]));
        img.put_pixel(0, 0, Rgb([50, 20, 30]));

        let means = channel_means(&img);
        assert_eq!(means, [20.0, 20.0, 30.0]);
    }
}
