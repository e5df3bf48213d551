//! Shared helpers that build synthetic containers in memory, so the tests
//! carry no binary fixtures.

// not every test binary uses every helper
#![allow(dead_code)]

use std::io::{Cursor, Write};

use image::{Rgb, RgbImage};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use aquamark_core::media;

/// Deterministic texture so each image has a distinct pixel fingerprint.
pub fn textured_image(width: u32, height: u32, seed: u8) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let i = (x * 31 + y * 17) as u8;
        Rgb([
            i.wrapping_add(seed),
            i.wrapping_mul(3).wrapping_add(seed),
            i.wrapping_add(seed).wrapping_mul(7),
        ])
    })
}

pub fn png_bytes(image: &RgbImage) -> Vec<u8> {
    media::encode_png(image).expect("PNG encoding of a test image failed")
}

/// A minimal but well-formed DOCX package.
///
/// `body_parts` are media files referenced from the document body, in body
/// order; `unreferenced` are media files present in the package but never
/// referenced. Media entries are written to the archive in reverse order,
/// so archive order differs from body order on purpose.
pub fn synthetic_docx(body_parts: &[(&str, &[u8])], unreferenced: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut blips = String::new();
    let mut relationships = String::new();
    for (i, (name, _)) in body_parts.iter().enumerate() {
        let rel_id = format!("rId{}", i + 10);
        blips.push_str(&format!(
            "<w:p><w:r><w:drawing><a:blip r:embed=\"{rel_id}\"/></w:drawing></w:r></w:p>"
        ));
        relationships.push_str(&format!(
            "<Relationship Id=\"{rel_id}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/image\" Target=\"media/{name}\"/>"
        ));
    }

    let document = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\" \
         xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\" \
         xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\">\
         <w:body><w:p><w:r><w:t>Quarterly report</w:t></w:r></w:p>{blips}</w:body></w:document>"
    );
    let rels = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
         {relationships}</Relationships>"
    );
    let content_types = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
         <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
         <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
         <Default Extension=\"png\" ContentType=\"image/png\"/>\
         <Override PartName=\"/word/document.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml\"/>\
         </Types>";
    let package_rels = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
         <Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" Target=\"word/document.xml\"/>\
         </Relationships>";

    for (name, bytes) in unreferenced.iter().chain(body_parts.iter().rev()) {
        writer
            .start_file(format!("word/media/{name}"), options)
            .unwrap();
        writer.write_all(bytes).unwrap();
    }
    for (name, content) in [
        ("[Content_Types].xml", content_types.to_string()),
        ("_rels/.rels", package_rels.to_string()),
        ("word/document.xml", document),
        ("word/_rels/document.xml.rels", rels),
    ] {
        writer.start_file(name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }

    writer.finish().unwrap().into_inner()
}

/// Reads one entry of a ZIP package.
pub fn zip_entry(bytes: &[u8], name: &str) -> Vec<u8> {
    use std::io::Read;

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("package was not a ZIP");
    let mut entry = archive.by_name(name).expect("entry was missing");
    let mut out = Vec::new();
    entry.read_to_end(&mut out).expect("entry was unreadable");
    out
}
