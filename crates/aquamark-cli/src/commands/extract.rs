use std::fs;
use std::path::PathBuf;

use clap::Args;
use aquamark_core::pipeline::{RunConfig, DEFAULT_DPI};
use aquamark_core::{commands, PdfImageMode, WatermarkError};

use crate::CliResult;

/// Recovers marks from a watermarked DOCX or PDF document
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Document that may carry marks
    #[arg(short = 'i', long = "in", value_name = "document file", required = true)]
    pub container: PathBuf,

    /// Recovered marks will be stored in this folder
    #[arg(short = 'o', long = "out", value_name = "output folder", required = true)]
    pub output_folder: PathBuf,

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

impl ExtractArgs {
    pub fn run(self) -> CliResult<()> {
        fs::create_dir_all(&self.output_folder)
            .map_err(|source| WatermarkError::WriteError { source })?;

        let mut config = RunConfig::new(self.run_id);
        config.dpi = self.dpi;
        if self.pdf_pages {
            config.pdf_mode = PdfImageMode::PageRender;
        }

        let marks = commands::extract(&self.container, &self.output_folder, config)?;

        for mark in &marks {
            println!("  {} -> {}", mark.source_identity, mark.path.display());
            for text in &mark.texts {
                println!("    payload: {text}");
                println!("    verdict: {}", describe_verdict(text));
            }
        }
        println!("{} mark(s) recovered", marks.len());
        Ok(())
    }
}

fn describe_verdict(text: &str) -> String {
    use aquamark_core::PayloadVerdict;

    match commands::verify(text) {
        PayloadVerdict::Envelope(record) if record.data_valid => match record.timestamp {
            Some(ts) => format!("envelope valid (timestamp {ts})"),
            None => "envelope valid".to_string(),
        },
        PayloadVerdict::Envelope(_) => "envelope INVALID, payload corrupted".to_string(),
        PayloadVerdict::Legacy(_) => "legacy format, no envelope".to_string(),
    }
}
