use std::path::PathBuf;

use clap::Args;
use aquamark_core::pipeline::{ImageReport, RunConfig, DEFAULT_DPI};
use aquamark_core::{commands, PdfImageMode};

use crate::CliResult;

/// Hides a mark in every image of a DOCX or PDF document
#[derive(Args, Debug)]
pub struct EmbedArgs {
    /// Document to watermark, used readonly
    #[arg(short = 'i', long = "in", value_name = "document file", required = true)]
    pub container: PathBuf,

    /// Mark image produced by the generate command
    #[arg(short = 'm', long = "mark", value_name = "mark file", required = true)]
    pub mark: PathBuf,

    /// Watermarked document will be stored as this file
    #[arg(short = 'o', long = "out", value_name = "output file", required = true)]
    pub output: PathBuf,

    /// Render resolution for PDF page handling
    #[arg(long, value_name = "dpi", default_value_t = DEFAULT_DPI)]
    pub dpi: u16,

    /// Treat each PDF page as one cover image instead of extracting the
    /// embedded image objects
    #[arg(long = "pdf-pages")]
    pub pdf_pages: bool,

    /// Identifier for this run's working set
    #[arg(long = "run-id", value_name = "id", default_value = "cli")]
    pub run_id: String,
}

impl EmbedArgs {
    pub fn run(self) -> CliResult<()> {
        let mut config = RunConfig::new(self.run_id);
        config.dpi = self.dpi;
        if self.pdf_pages {
            config.pdf_mode = PdfImageMode::PageRender;
        }

        let outcome = commands::embed(&self.container, &self.mark, &self.output, config)?;

        for report in &outcome.reports {
            match report {
                ImageReport::Embedded { identity, fidelity } => println!(
                    "  {identity}: mse {:.4}, psnr {:.2} dB ({})",
                    fidelity.mse, fidelity.psnr, fidelity.quality
                ),
                ImageReport::Failed { identity, error } => {
                    println!("  {identity}: not marked ({error})")
                }
            }
        }
        println!(
            "{} of {} image(s) marked, {} -> {} bytes, written to {}",
            outcome.processed,
            outcome.reports.len(),
            outcome.original_len,
            outcome.produced_len(),
            self.output.display()
        );
        Ok(())
    }
}
