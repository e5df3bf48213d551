//! # Aquamark Core API
//!
//! Invisible watermarking for document containers. A payload text is
//! rendered as a QR raster (optionally wrapped in a CRC32 integrity
//! envelope), hidden in the blue-channel LSB plane of every raster image
//! embedded in a DOCX or PDF container, and recovered later from a
//! possibly-reprocessed copy.
//!
//! The four operations a front end consumes live in [`api`]:
//! - [`api::generate`] renders the mark raster
//! - [`api::embed`] watermarks a container
//! - [`api::extract`] recovers marks from a container
//! - [`api::verify`] checks a recovered payload's integrity envelope
//!
//! # Usage Examples
//!
//! ## Render a watermark with an integrity envelope
//!
//! ```rust
//! let mark_png = aquamark_core::api::generate::prepare()
//!     .with_text("doc-7f3a")
//!     .with_integrity(true)
//!     .execute()
//!     .expect("payload fits a QR symbol");
//!
//! assert!(!mark_png.is_empty());
//! ```
//!
//! ## Watermark a document and read it back
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use aquamark_core::commands;
//! use aquamark_core::pipeline::RunConfig;
//!
//! commands::generate("doc-7f3a", true, Path::new("mark.png"))?;
//!
//! let outcome = commands::embed(
//!     Path::new("report.docx"),
//!     Path::new("mark.png"),
//!     Path::new("report-marked.docx"),
//!     RunConfig::new("demo"),
//! )?;
//! assert!(outcome.processed > 0);
//!
//! let recovered = commands::extract(
//!     Path::new("report-marked.docx"),
//!     Path::new("./recovered"),
//!     RunConfig::new("demo-extract"),
//! )?;
//! for mark in &recovered {
//!     for text in &mark.texts {
//!         println!("{:?}", commands::verify(text));
//!     }
//! }
//! # Ok::<(), aquamark_core::WatermarkError>(())
//! ```

#![warn(clippy::redundant_else)]

pub mod api;
pub mod commands;
pub mod container;
pub mod error;
pub mod fidelity;
pub mod media;
pub mod payload;
pub mod pipeline;
pub mod result;

pub use container::{Container, ContainerCodec, ContainerKind, ContainerSummary, PdfImageMode};
pub use error::WatermarkError;
pub use fidelity::{mse_psnr, Fidelity, Quality};
pub use media::CoverImage;
pub use payload::{IntegrityEnvelope, IntegrityRecord, PayloadVerdict, QrOptions};
pub use pipeline::{EmbedOutcome, ImageReport, RecoveredMark, RunConfig, DEFAULT_DPI};
pub use result::Result;
