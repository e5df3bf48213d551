//! Path-based wrappers over the [`crate::api`] operations, for front ends
//! that work with files on disk (the CLI does).

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::api;
use crate::container::{Container, ContainerCodec, ContainerKind, ContainerSummary};
use crate::error::WatermarkError;
use crate::media::{self, lsb_codec};
use crate::payload::PayloadVerdict;
use crate::pipeline::{EmbedOutcome, RunConfig};
use crate::result::Result;

/// Renders a payload into a QR mark file.
pub fn generate(text: &str, use_integrity: bool, output: &Path) -> Result<()> {
    let png = api::generate::prepare()
        .with_text(text)
        .with_integrity(use_integrity)
        .execute()?;

    fs::write(output, png).map_err(|source| WatermarkError::WriteError { source })?;
    info!("mark written to {}", output.display());
    Ok(())
}

/// Watermarks every image of a container file and writes the new container.
pub fn embed(
    container: &Path,
    mark: &Path,
    output: &Path,
    config: RunConfig,
) -> Result<EmbedOutcome> {
    let kind = container_kind(container)?;
    let container_bytes =
        fs::read(container).map_err(|source| WatermarkError::ReadError { source })?;
    let mark_bytes = fs::read(mark).map_err(|source| WatermarkError::ReadError { source })?;

    let outcome = api::embed::prepare()
        .with_container(container_bytes, kind)
        .with_mark(mark_bytes)
        .with_config(config)
        .execute()?;

    fs::write(output, &outcome.container)
        .map_err(|source| WatermarkError::WriteError { source })?;
    info!(
        "watermarked container written to {} ({} of {} image(s) marked)",
        output.display(),
        outcome.processed,
        outcome.reports.len()
    );
    Ok(outcome)
}

/// A mark recovered to disk.
#[derive(Debug)]
pub struct ExtractedMark {
    pub source_identity: String,
    pub path: PathBuf,
    pub texts: Vec<String>,
}

/// Recovers marks from a container file into `output_folder`, one PNG per
/// cover image that carried a decodable symbol.
pub fn extract(container: &Path, output_folder: &Path, config: RunConfig) -> Result<Vec<ExtractedMark>> {
    let kind = container_kind(container)?;
    let container_bytes =
        fs::read(container).map_err(|source| WatermarkError::ReadError { source })?;

    let recovered = api::extract::prepare()
        .with_container(container_bytes, kind)
        .with_config(config)
        .execute()?;

    let mut written = Vec::with_capacity(recovered.len());
    for mark in recovered {
        let file_name = format!("{}_qr.png", sanitize(&mark.identity));
        let path = output_folder.join(file_name);
        fs::write(&path, &mark.raster_png)
            .map_err(|source| WatermarkError::WriteError { source })?;
        written.push(ExtractedMark {
            source_identity: mark.identity,
            path,
            texts: mark.texts,
        });
    }

    info!(
        "{} recovered mark(s) written to {}",
        written.len(),
        output_folder.display()
    );
    Ok(written)
}

/// Classifies a decoded payload text.
pub fn verify(decoded_text: &str) -> PayloadVerdict {
    api::verify::verify_integrity(decoded_text)
}

/// Capacity and LSB-plane statistics of a single raster file.
#[derive(Debug)]
pub struct InspectReport {
    pub width: u32,
    pub height: u32,
    pub capacity_bits: u64,
    pub stats: lsb_codec::LsbStats,
    pub mean_rgb: [f64; 3],
}

pub fn inspect(image: &Path) -> Result<InspectReport> {
    let bytes = fs::read(image).map_err(|source| WatermarkError::ReadError { source })?;
    let pixels = media::decode_rgb(&bytes)?;

    Ok(InspectReport {
        width: pixels.width(),
        height: pixels.height(),
        capacity_bits: lsb_codec::capacity(&pixels),
        stats: lsb_codec::lsb_stats(&pixels),
        mean_rgb: media::channel_means(&pixels),
    })
}

/// Shallow structure report of a container file.
pub fn describe(container: &Path, config: &RunConfig) -> Result<ContainerSummary> {
    let kind = container_kind(container)?;
    let bytes = fs::read(container).map_err(|source| WatermarkError::ReadError { source })?;

    Ok(Container::from_bytes(bytes, kind, config)?.describe())
}

fn container_kind(path: &Path) -> Result<ContainerKind> {
    ContainerKind::from_path(path).ok_or(WatermarkError::FormatError("DOCX or PDF"))
}

fn sanitize(identity: &str) -> String {
    identity
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
        .collect()
}
