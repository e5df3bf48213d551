//! Format-aware access to the rasters embedded in a document container.
//!
//! One capability interface, one variant per container kind. The ordering
//! contract holds across both: the Nth image returned by
//! [`ContainerCodec::extract_images`] is the Nth image consumed by
//! [`ContainerCodec::rebuild`].

pub mod docx;
pub mod pdf;

use std::fmt;
use std::path::Path;

use enum_dispatch::enum_dispatch;

pub use docx::DocxContainer;
pub use pdf::{PdfContainer, PdfImageMode};

use crate::media::CoverImage;
use crate::pipeline::RunConfig;
use crate::result::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Docx,
    Pdf,
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Docx => f.write_str("DOCX"),
            Self::Pdf => f.write_str("PDF"),
        }
    }
}

impl ContainerKind {
    /// Infers the container kind from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()?
            .to_str()?
            .to_lowercase()
            .as_str()
        {
            "docx" => Some(Self::Docx),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }
}

/// Shallow description of a container, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerSummary {
    pub kind: ContainerKind,
    /// Pages for a PDF, package entries for a DOCX.
    pub units: usize,
    /// Embedded rasters eligible as cover images.
    pub images: usize,
}

#[enum_dispatch]
pub trait ContainerCodec {
    /// Pulls every embedded raster out of the container, in stable order.
    fn extract_images(&self) -> Result<Vec<CoverImage>>;

    /// Rebuilds a complete container from per-image results, in extraction
    /// order. Never emits a partial container.
    fn rebuild(&self, images: &[CoverImage]) -> Result<Vec<u8>>;

    fn describe(&self) -> ContainerSummary;
}

#[enum_dispatch(ContainerCodec)]
pub enum Container {
    Docx(DocxContainer),
    Pdf(PdfContainer),
}

impl Container {
    pub fn from_bytes(bytes: Vec<u8>, kind: ContainerKind, config: &RunConfig) -> Result<Self> {
        match kind {
            ContainerKind::Docx => Ok(DocxContainer::from_bytes(bytes)?.into()),
            ContainerKind::Pdf => {
                Ok(PdfContainer::from_bytes(&bytes, config.pdf_mode, config.dpi)?.into())
            }
        }
    }
}
