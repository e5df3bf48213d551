//! PDF containers, via the `lopdf` object model.
//!
//! Two extraction strategies: `RealImages` walks the image-object tables of
//! every page and pulls the actual embedded streams; `PageRender` is the
//! lower-fidelity fallback that composes each page onto a fixed-DPI canvas,
//! one cover image per page.
//!
//! Reconstruction always assembles a new document whose pages are exactly
//! the watermarked rasters, full bleed, one per page. The image streams are
//! FlateDecode so the LSB plane survives losslessly.

use std::collections::{HashMap, HashSet};
use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::RgbImage;
use log::{debug, warn};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use super::{ContainerCodec, ContainerKind, ContainerSummary};
use crate::error::WatermarkError;
use crate::media::CoverImage;
use crate::result::Result;

/// US Letter, the PDF default when no MediaBox is present anywhere.
const DEFAULT_MEDIA_BOX: (f64, f64) = (612.0, 792.0);

const POINTS_PER_INCH: f64 = 72.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PdfImageMode {
    /// Extract the actual embedded image streams, deduplicated by object id.
    #[default]
    RealImages,
    /// Rasterize each page as a whole-page cover image at the run DPI.
    PageRender,
}

pub struct PdfContainer {
    doc: Document,
    mode: PdfImageMode,
    dpi: u16,
}

impl PdfContainer {
    pub fn from_bytes(bytes: &[u8], mode: PdfImageMode, dpi: u16) -> Result<Self> {
        let doc = Document::load_mem(bytes).map_err(|e| {
            warn!("container bytes failed PDF parsing: {e}");
            WatermarkError::FormatError("PDF")
        })?;

        Ok(Self { doc, mode, dpi })
    }

    /// Image XObject references of a page's resource dictionary, in
    /// dictionary order.
    fn page_image_xobjects(&self, page_id: ObjectId) -> Vec<(String, ObjectId)> {
        let Ok((resources, _)) = self.doc.get_page_resources(page_id) else {
            return Vec::new();
        };
        let Some(resources) = resources else {
            return Vec::new();
        };
        let Some(xobjects) = resources
            .get(b"XObject")
            .ok()
            .and_then(|obj| self.resolve(obj).as_dict().ok())
        else {
            return Vec::new();
        };

        let mut images = Vec::new();
        for (name, value) in xobjects.iter() {
            let Ok(id) = value.as_reference() else {
                continue;
            };
            let Ok(stream) = self.doc.get_object(id).and_then(Object::as_stream) else {
                continue;
            };
            let is_image = stream
                .dict
                .get(b"Subtype")
                .and_then(Object::as_name)
                .map(|subtype| subtype == b"Image")
                .unwrap_or(false);
            if is_image {
                images.push((String::from_utf8_lossy(name).into_owned(), id));
            }
        }
        images
    }

    /// Follows reference chains down to a direct object.
    fn resolve<'a>(&'a self, object: &'a Object) -> &'a Object {
        let mut current = object;
        while let Ok(id) = current.as_reference() {
            match self.doc.get_object(id) {
                Ok(next) => current = next,
                Err(_) => break,
            }
        }
        current
    }

    fn extract_real_images(&self) -> Result<Vec<CoverImage>> {
        let mut covers = Vec::new();
        let mut seen: HashSet<ObjectId> = HashSet::new();

        for (page_index, (_, page_id)) in self.doc.get_pages().iter().enumerate() {
            for (name, id) in self.page_image_xobjects(*page_id) {
                if !seen.insert(id) {
                    continue;
                }
                let identity = format!("page{}/{}", page_index + 1, name);
                match self.decode_image_object(id) {
                    Ok(pixels) => covers.push(CoverImage::new(pixels, identity, covers.len())),
                    Err(e) => warn!("dropping undecodable image object {identity}: {e}"),
                }
            }
        }

        if covers.is_empty() {
            return Err(WatermarkError::NoImagesFound);
        }
        Ok(covers)
    }

    fn decode_image_object(&self, id: ObjectId) -> Result<RgbImage> {
        let stream = self.doc.get_object(id).and_then(Object::as_stream)?;
        decode_image_stream(stream)
    }

    fn extract_page_renders(&self) -> Result<Vec<CoverImage>> {
        let pages = self.doc.get_pages();
        if pages.is_empty() {
            return Err(WatermarkError::NoImagesFound);
        }

        let scale = f64::from(self.dpi.max(1)) / POINTS_PER_INCH;
        let mut decoded: HashMap<ObjectId, RgbImage> = HashMap::new();
        let mut covers = Vec::new();

        for (page_index, (_, page_id)) in pages.iter().enumerate() {
            let (width_pt, height_pt) = self.media_box(*page_id);
            let canvas_w = ((width_pt * scale).round() as u32).max(1);
            let canvas_h = ((height_pt * scale).round() as u32).max(1);
            let mut canvas = RgbImage::from_pixel(canvas_w, canvas_h, image::Rgb([255, 255, 255]));

            let xobjects: HashMap<String, ObjectId> =
                self.page_image_xobjects(*page_id).into_iter().collect();

            match self.doc.get_page_content(*page_id) {
                Ok(content) => match Content::decode(&content) {
                    Ok(content) => self.paint_images(
                        &mut canvas,
                        &content,
                        &xobjects,
                        &mut decoded,
                        height_pt,
                        scale,
                    ),
                    Err(e) => warn!("page {}: content stream did not decode: {e}", page_index + 1),
                },
                Err(e) => warn!("page {}: no readable content: {e}", page_index + 1),
            }

            covers.push(CoverImage::new(
                canvas,
                format!("page{}", page_index + 1),
                page_index,
            ));
        }

        Ok(covers)
    }

    /// Walks `q`/`Q`/`cm`/`Do` and paints every image XObject at its CTM
    /// placement. Text and vector content are not painted; this mode's
    /// contract is a carrier raster per page, not a visual replica.
    fn paint_images(
        &self,
        canvas: &mut RgbImage,
        content: &Content,
        xobjects: &HashMap<String, ObjectId>,
        decoded: &mut HashMap<ObjectId, RgbImage>,
        page_height_pt: f64,
        scale: f64,
    ) {
        let mut ctm = Matrix::IDENTITY;
        let mut stack = Vec::new();

        for operation in &content.operations {
            match operation.operator.as_str() {
                "q" => stack.push(ctm),
                "Q" => ctm = stack.pop().unwrap_or(Matrix::IDENTITY),
                "cm" => {
                    if let Some(m) = Matrix::from_operands(&operation.operands) {
                        ctm = m.concat(&ctm);
                    }
                }
                "Do" => {
                    let Some(name) = operation
                        .operands
                        .first()
                        .and_then(|o| o.as_name().ok())
                        .map(|n| String::from_utf8_lossy(n).into_owned())
                    else {
                        continue;
                    };
                    let Some(&id) = xobjects.get(&name) else {
                        debug!("skipping non-image XObject /{name}");
                        continue;
                    };
                    if !decoded.contains_key(&id) {
                        match self.decode_image_object(id) {
                            Ok(pixels) => {
                                decoded.insert(id, pixels);
                            }
                            Err(e) => {
                                warn!("image XObject /{name} did not decode: {e}");
                                continue;
                            }
                        }
                    }
                    if let Some(pixels) = decoded.get(&id) {
                        paint_unit_square(canvas, pixels, &ctm, page_height_pt, scale);
                    }
                }
                _ => {}
            }
        }
    }

    /// Effective MediaBox of a page, following `Parent` inheritance.
    fn media_box(&self, page_id: ObjectId) -> (f64, f64) {
        let mut current = Some(page_id);
        while let Some(id) = current {
            let Ok(dict) = self.doc.get_object(id).and_then(Object::as_dict) else {
                break;
            };
            if let Some(bounds) = dict
                .get(b"MediaBox")
                .ok()
                .map(|obj| self.resolve(obj))
                .and_then(media_box_bounds)
            {
                return bounds;
            }
            current = dict
                .get(b"Parent")
                .ok()
                .and_then(|obj| obj.as_reference().ok());
        }
        DEFAULT_MEDIA_BOX
    }

    fn count_real_images(&self) -> usize {
        let mut seen = HashSet::new();
        for (_, page_id) in self.doc.get_pages() {
            for (_, id) in self.page_image_xobjects(page_id) {
                seen.insert(id);
            }
        }
        seen.len()
    }
}

impl ContainerCodec for PdfContainer {
    fn extract_images(&self) -> Result<Vec<CoverImage>> {
        match self.mode {
            PdfImageMode::RealImages => self.extract_real_images(),
            PdfImageMode::PageRender => self.extract_page_renders(),
        }
    }

    fn rebuild(&self, images: &[CoverImage]) -> Result<Vec<u8>> {
        assemble(images, self.dpi)
    }

    fn describe(&self) -> ContainerSummary {
        let pages = self.doc.get_pages().len();
        let images = match self.mode {
            PdfImageMode::RealImages => self.count_real_images(),
            PdfImageMode::PageRender => pages,
        };
        ContainerSummary {
            kind: ContainerKind::Pdf,
            units: pages,
            images,
        }
    }
}

/// Composes a new document whose pages are exactly the given rasters, one
/// full-bleed image per page, in order.
pub fn assemble(images: &[CoverImage], dpi: u16) -> Result<Vec<u8>> {
    if images.is_empty() {
        return Err(WatermarkError::ReconstructionError);
    }

    let dpi = f64::from(dpi.max(1));
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::new();

    for cover in images {
        let (width, height) = cover.pixels.dimensions();

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(cover.pixels.as_raw())?;
        let compressed = encoder.finish()?;

        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(width),
                "Height" => i64::from(height),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8i64,
                "Filter" => "FlateDecode",
            },
            compressed,
        ));

        let width_pt = f64::from(width) * POINTS_PER_INCH / dpi;
        let height_pt = f64::from(height) * POINTS_PER_INCH / dpi;

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        real(width_pt),
                        Object::Integer(0),
                        Object::Integer(0),
                        real(height_pt),
                        Object::Integer(0),
                        Object::Integer(0),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content
                .encode()
                .map_err(|_| WatermarkError::ReconstructionError)?,
        ));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                real(width_pt),
                real(height_pt),
            ],
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
            },
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => images.len() as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|_| WatermarkError::ReconstructionError)?;
    Ok(out)
}

fn real(value: f64) -> Object {
    Object::Real(value as _)
}

fn object_number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

fn media_box_bounds(object: &Object) -> Option<(f64, f64)> {
    let array = object.as_array().ok()?;
    if array.len() != 4 {
        return None;
    }
    let numbers: Vec<f64> = array.iter().filter_map(object_number).collect();
    if numbers.len() != 4 {
        return None;
    }
    let width = (numbers[2] - numbers[0]).abs();
    let height = (numbers[3] - numbers[1]).abs();
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    Some((width, height))
}

fn stream_filters(stream: &Stream) -> Vec<Vec<u8>> {
    match stream.dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.clone()],
        Ok(Object::Array(array)) => array
            .iter()
            .filter_map(|obj| obj.as_name().ok().map(<[u8]>::to_vec))
            .collect(),
        _ => Vec::new(),
    }
}

/// Decodes an image stream to RGB.
///
/// Supports the two encodings the watermark path can carry losslessly or
/// decode outright: DCTDecode (JPEG) and FlateDecode/raw 8-bit
/// DeviceRGB/DeviceGray buffers. Anything else is dropped by the caller.
fn decode_image_stream(stream: &Stream) -> Result<RgbImage> {
    let filters = stream_filters(stream);

    if filters.iter().any(|f| f == b"DCTDecode") {
        return Ok(
            image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg)
                .map_err(|_| WatermarkError::InvalidImageMedia)?
                .to_rgb8(),
        );
    }

    if stream.dict.get(b"DecodeParms").is_ok() {
        // predictors are not supported
        return Err(WatermarkError::InvalidImageMedia);
    }

    let data = if filters.iter().any(|f| f == b"FlateDecode") {
        stream
            .decompressed_content()
            .map_err(|_| WatermarkError::InvalidImageMedia)?
    } else if filters.is_empty() {
        stream.content.clone()
    } else {
        return Err(WatermarkError::InvalidImageMedia);
    };

    let width = dict_u32(&stream.dict, b"Width")?;
    let height = dict_u32(&stream.dict, b"Height")?;
    let bits = stream
        .dict
        .get(b"BitsPerComponent")
        .and_then(Object::as_i64)
        .unwrap_or(8);
    if bits != 8 || width == 0 || height == 0 {
        return Err(WatermarkError::InvalidImageMedia);
    }

    let pixels = width as usize * height as usize;
    match data.len() / pixels {
        3 => RgbImage::from_raw(width, height, data).ok_or(WatermarkError::InvalidImageMedia),
        1 => {
            let gray = image::GrayImage::from_raw(width, height, data)
                .ok_or(WatermarkError::InvalidImageMedia)?;
            Ok(image::DynamicImage::ImageLuma8(gray).to_rgb8())
        }
        _ => Err(WatermarkError::InvalidImageMedia),
    }
}

fn dict_u32(dict: &Dictionary, key: &[u8]) -> Result<u32> {
    dict.get(key)
        .and_then(Object::as_i64)
        .ok()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or(WatermarkError::InvalidImageMedia)
}

/// Row-major 2D affine transform, PDF operand order `[a b c d e f]`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
}

impl Matrix {
    const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn from_operands(operands: &[Object]) -> Option<Self> {
        let numbers: Vec<f64> = operands.iter().filter_map(object_number).collect();
        if numbers.len() != 6 {
            return None;
        }
        Some(Self {
            a: numbers[0],
            b: numbers[1],
            c: numbers[2],
            d: numbers[3],
            e: numbers[4],
            f: numbers[5],
        })
    }

    /// `self × other`, the composition applied when `cm` prepends onto the
    /// current transformation matrix.
    fn concat(&self, other: &Self) -> Self {
        Self {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }
}

/// Paints an image XObject into the canvas region its CTM maps the unit
/// square onto. The four transformed corners bound the target; rows sample
/// top-down, matching the image-space orientation of the unit square.
fn paint_unit_square(
    canvas: &mut RgbImage,
    src: &RgbImage,
    ctm: &Matrix,
    page_height_pt: f64,
    scale: f64,
) {
    let corners = [
        ctm.apply(0.0, 0.0),
        ctm.apply(1.0, 0.0),
        ctm.apply(0.0, 1.0),
        ctm.apply(1.0, 1.0),
    ];

    let pdf_x0 = corners.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let pdf_x1 = corners
        .iter()
        .map(|p| p.0)
        .fold(f64::NEG_INFINITY, f64::max);
    let pdf_y0 = corners.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let pdf_y1 = corners
        .iter()
        .map(|p| p.1)
        .fold(f64::NEG_INFINITY, f64::max);

    // top-left origin, scaled to canvas pixels
    let left = (pdf_x0 * scale).floor().max(0.0) as u32;
    let top = ((page_height_pt - pdf_y1) * scale).floor().max(0.0) as u32;
    let right = ((pdf_x1 * scale).ceil() as u32).min(canvas.width());
    let bottom = (((page_height_pt - pdf_y0) * scale).ceil() as u32).min(canvas.height());
    if right <= left || bottom <= top {
        return;
    }

    let span_x = f64::from(right - left);
    let span_y = f64::from(bottom - top);
    for py in top..bottom {
        for px in left..right {
            let u = (f64::from(px - left) + 0.5) / span_x;
            let v = (f64::from(py - top) + 0.5) / span_y;
            let sx = ((u * f64::from(src.width())) as u32).min(src.width() - 1);
            let sy = ((v * f64::from(src.height())) as u32).min(src.height() - 1);
            canvas.put_pixel(px, py, *src.get_pixel(sx, sy));
        }
    }
}
