//! DOCX packages: a ZIP archive whose embedded rasters live under
//! `word/media/`. The order of the cover images is the order in which the
//! document body references them, not the archive entry order, which is
//! unspecified.

use std::collections::HashMap;
use std::io::{Cursor, Read, Write};

use log::warn;
use quick_xml::events::Event;
use quick_xml::Reader;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::{ContainerCodec, ContainerKind, ContainerSummary};
use crate::error::WatermarkError;
use crate::media::{self, CoverImage};
use crate::result::Result;

const DOCUMENT_PART: &str = "word/document.xml";
const RELS_PART: &str = "word/_rels/document.xml.rels";
const MEDIA_PREFIX: &str = "word/media/";
const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

const PNG_DEFAULT: &str = r#"<Default Extension="png" ContentType="image/png"/>"#;

pub struct DocxContainer {
    bytes: Vec<u8>,
    /// Media part names in document-body order.
    media: Vec<String>,
    entries: usize,
}

impl DocxContainer {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(&bytes[..]))
            .map_err(|_| WatermarkError::FormatError("DOCX"))?;
        let entries = archive.len();

        let document = read_part(&mut archive, DOCUMENT_PART)
            .ok_or(WatermarkError::FormatError("DOCX"))?;
        let relationships = read_part(&mut archive, RELS_PART)
            .map(|xml| parse_relationships(&xml))
            .transpose()?
            .unwrap_or_default();

        let media = body_ordered_media(&mut archive, &document, &relationships)?;

        Ok(Self {
            bytes,
            media,
            entries,
        })
    }
}

impl ContainerCodec for DocxContainer {
    fn extract_images(&self) -> Result<Vec<CoverImage>> {
        let mut archive = ZipArchive::new(Cursor::new(&self.bytes[..]))?;

        let mut covers = Vec::new();
        for name in &self.media {
            let mut part = archive.by_name(name)?;
            let mut bytes = Vec::new();
            part.read_to_end(&mut bytes)?;

            match media::decode_rgb(&bytes) {
                Ok(pixels) => covers.push(CoverImage::new(pixels, name.clone(), covers.len())),
                Err(e) => warn!("dropping undecodable media part {name}: {e}"),
            }
        }

        if covers.is_empty() {
            return Err(WatermarkError::NoImagesFound);
        }
        Ok(covers)
    }

    fn rebuild(&self, images: &[CoverImage]) -> Result<Vec<u8>> {
        if images.is_empty() {
            return Err(WatermarkError::ReconstructionError);
        }

        let replacements: HashMap<&str, &CoverImage> = images
            .iter()
            .map(|cover| (cover.identity.as_str(), cover))
            .collect();

        let mut archive = ZipArchive::new(Cursor::new(&self.bytes[..]))?;
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let name = entry.name().to_string();

            if let Some(cover) = replacements.get(name.as_str()) {
                // watermarked media must stay lossless, so it is re-encoded
                // as PNG under its original part name
                let png = media::encode_png(&cover.pixels)?;
                writer.start_file(name, options)?;
                writer.write_all(&png)?;
            } else if name == CONTENT_TYPES_PART {
                let mut xml = String::new();
                entry.read_to_string(&mut xml)?;
                writer.start_file(name, options)?;
                writer.write_all(ensure_png_default(&xml).as_bytes())?;
            } else {
                writer.raw_copy_file(entry)?;
            }
        }

        let cursor = writer
            .finish()
            .map_err(|_| WatermarkError::ReconstructionError)?;
        Ok(cursor.into_inner())
    }

    fn describe(&self) -> ContainerSummary {
        ContainerSummary {
            kind: ContainerKind::Docx,
            units: self.entries,
            images: self.media.len(),
        }
    }
}

fn read_part(archive: &mut ZipArchive<Cursor<&[u8]>>, name: &str) -> Option<Vec<u8>> {
    let mut part = archive.by_name(name).ok()?;
    let mut bytes = Vec::new();
    part.read_to_end(&mut bytes).ok()?;
    Some(bytes)
}

/// `Relationship Id -> Target` from `word/_rels/document.xml.rels`, targets
/// normalized to archive entry names.
fn parse_relationships(xml: &[u8]) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_reader(xml);
    let mut map = HashMap::new();

    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Start(e) | Event::Empty(e) => {
                if e.local_name().as_ref() != b"Relationship" {
                    continue;
                }
                let mut id = None;
                let mut target = None;
                for attr in e.attributes().flatten() {
                    match attr.key.local_name().as_ref() {
                        b"Id" => id = Some(String::from_utf8_lossy(&attr.value).into_owned()),
                        b"Target" => {
                            target = Some(String::from_utf8_lossy(&attr.value).into_owned())
                        }
                        _ => {}
                    }
                }
                if let (Some(id), Some(target)) = (id, target) {
                    map.insert(id, normalize_target(&target));
                }
            }
            _ => {}
        }
    }

    Ok(map)
}

/// Relationship targets are relative to `word/`; archive entry names are
/// package-absolute.
fn normalize_target(target: &str) -> String {
    let target = target.trim_start_matches('/');
    if target.starts_with("word/") {
        target.to_owned()
    } else {
        format!("word/{target}")
    }
}

/// Media part names ordered by their `r:embed` reference order inside the
/// document body; media never referenced from the body is appended in
/// entry-name order so that every embedded raster is extracted.
fn body_ordered_media(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    document: &[u8],
    relationships: &HashMap<String, String>,
) -> Result<Vec<String>> {
    let mut reader = Reader::from_reader(document);
    let mut ordered = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Start(e) | Event::Empty(e) => {
                for attr in e.attributes().flatten() {
                    if attr.key.local_name().as_ref() != b"embed" {
                        continue;
                    }
                    let id = String::from_utf8_lossy(&attr.value).into_owned();
                    let Some(target) = relationships.get(&id) else {
                        continue;
                    };
                    if target.starts_with(MEDIA_PREFIX) && !ordered.contains(target) {
                        ordered.push(target.clone());
                    }
                }
            }
            _ => {}
        }
    }

    let mut unreferenced: Vec<String> = archive
        .file_names()
        .filter(|name| name.starts_with(MEDIA_PREFIX) && !name.ends_with('/'))
        .map(str::to_owned)
        .filter(|name| !ordered.contains(name))
        .collect();
    unreferenced.sort();
    ordered.extend(unreferenced);

    // only parts that actually exist in the package
    ordered.retain(|name| archive.by_name(name).is_ok());

    Ok(ordered)
}

fn ensure_png_default(content_types: &str) -> String {
    if content_types.contains(r#"Extension="png""#) {
        return content_types.to_owned();
    }
    match content_types.rfind("</Types>") {
        Some(pos) => {
            let mut patched = String::with_capacity(content_types.len() + PNG_DEFAULT.len());
            patched.push_str(&content_types[..pos]);
            patched.push_str(PNG_DEFAULT);
            patched.push_str(&content_types[pos..]);
            patched
        }
        None => content_types.to_owned(),
    }
}
