//! One run = one synchronous sequence of stages over one container.
//!
//! Every run owns its working set; nothing is shared between runs and no
//! partial container is ever emitted. Per-image failures are recorded on
//! that image's report while the rest of the run proceeds; a run in which
//! no image succeeds fails as a whole.

use image::GrayImage;
use log::{debug, info, warn};

use crate::container::{Container, ContainerCodec, ContainerKind, PdfImageMode};
use crate::error::WatermarkError;
use crate::fidelity::{self, Fidelity};
use crate::media::{self, CoverImage};
use crate::payload::{qr, QrOptions};
use crate::result::Result;

pub const DEFAULT_DPI: u16 = 300;

/// Per-run configuration, passed down explicitly. Never process-wide.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Caller-supplied identifier naming this run's working set.
    pub run_id: String,
    /// Render resolution for PDF page-render extraction and PDF assembly.
    pub dpi: u16,
    pub pdf_mode: PdfImageMode,
    pub qr: QrOptions,
}

impl RunConfig {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            dpi: DEFAULT_DPI,
            pdf_mode: PdfImageMode::default(),
            qr: QrOptions::default(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::new("adhoc")
    }
}

/// Result of watermarking a single cover image.
#[derive(Debug)]
pub enum ImageReport {
    Embedded { identity: String, fidelity: Fidelity },
    Failed { identity: String, error: WatermarkError },
}

impl ImageReport {
    pub fn identity(&self) -> &str {
        match self {
            Self::Embedded { identity, .. } | Self::Failed { identity, .. } => identity,
        }
    }
}

/// Result of a whole embed run.
#[derive(Debug)]
pub struct EmbedOutcome {
    /// The reconstructed container, complete or nothing.
    pub container: Vec<u8>,
    pub reports: Vec<ImageReport>,
    /// Count of images that took the mark.
    pub processed: usize,
    pub original_len: usize,
}

impl EmbedOutcome {
    pub fn produced_len(&self) -> usize {
        self.container.len()
    }
}

/// A bit-plane that yielded at least one decodable QR symbol.
#[derive(Debug)]
pub struct RecoveredMark {
    pub identity: String,
    /// The extracted bit-plane, PNG-encoded.
    pub raster_png: Vec<u8>,
    pub texts: Vec<String>,
}

/// Embeds `mark` into every cover image of the container and reconstructs it.
pub fn embed_run(
    container_bytes: Vec<u8>,
    kind: ContainerKind,
    mark: &GrayImage,
    config: &RunConfig,
) -> Result<EmbedOutcome> {
    let original_len = container_bytes.len();
    let container = Container::from_bytes(container_bytes, kind, config)?;
    let covers = container.extract_images()?;
    info!(
        "run {}: embedding into {} cover image(s) of a {kind} container",
        config.run_id,
        covers.len()
    );

    let mut artifacts: Vec<CoverImage> = Vec::with_capacity(covers.len());
    let mut reports = Vec::with_capacity(covers.len());
    let mut processed = 0usize;

    for cover in covers {
        match media::lsb_codec::embed(&cover.pixels, mark) {
            Ok(stamped) => match fidelity::mse_psnr(&cover.pixels, &stamped) {
                Ok(fidelity) => {
                    debug!(
                        "run {}: {} embedded, psnr {:.2} ({})",
                        config.run_id, cover.identity, fidelity.psnr, fidelity.quality
                    );
                    processed += 1;
                    reports.push(ImageReport::Embedded {
                        identity: cover.identity.clone(),
                        fidelity,
                    });
                    artifacts.push(CoverImage::new(stamped, cover.identity, cover.index));
                }
                Err(error) => {
                    // the mark is in; only the score is missing
                    reports.push(ImageReport::Failed {
                        identity: cover.identity.clone(),
                        error,
                    });
                    artifacts.push(CoverImage::new(stamped, cover.identity, cover.index));
                }
            },
            Err(error) => {
                // the image is carried through unmarked so the container
                // keeps its full image count
                warn!("run {}: {} not embedded: {error}", config.run_id, cover.identity);
                reports.push(ImageReport::Failed {
                    identity: cover.identity.clone(),
                    error,
                });
                artifacts.push(cover);
            }
        }
    }

    if processed == 0 {
        return Err(take_first_failure(reports));
    }

    let container = container.rebuild(&artifacts)?;
    Ok(EmbedOutcome {
        container,
        reports,
        processed,
        original_len,
    })
}

/// Recovers every decodable mark from the container's cover images.
pub fn extract_run(
    container_bytes: Vec<u8>,
    kind: ContainerKind,
    config: &RunConfig,
) -> Result<Vec<RecoveredMark>> {
    let container = Container::from_bytes(container_bytes, kind, config)?;
    let covers = container.extract_images()?;
    info!(
        "run {}: scanning {} cover image(s) of a {kind} container",
        config.run_id,
        covers.len()
    );

    let mut recovered = Vec::new();
    for cover in covers {
        let plane = media::lsb_codec::extract(&cover.pixels);
        let texts = qr::decode(&plane);
        if texts.is_empty() {
            // no watermark on this image, not fatal
            debug!("run {}: no symbol on {}", config.run_id, cover.identity);
            continue;
        }
        recovered.push(RecoveredMark {
            identity: cover.identity,
            raster_png: media::encode_gray_png(&plane)?,
            texts,
        });
    }

    if recovered.is_empty() {
        return Err(WatermarkError::DecodingError);
    }
    Ok(recovered)
}

fn take_first_failure(reports: Vec<ImageReport>) -> WatermarkError {
    reports
        .into_iter()
        .find_map(|report| match report {
            ImageReport::Failed { error, .. } => Some(error),
            ImageReport::Embedded { .. } => None,
        })
        .unwrap_or(WatermarkError::NoImagesFound)
}
