use std::path::PathBuf;

use clap::Args;
use aquamark_core::commands;
use aquamark_core::pipeline::RunConfig;
use aquamark_core::ContainerKind;

use crate::CliResult;

/// Reports the structure of a document container, or capacity and
/// LSB-plane statistics of a raster image
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Document or image file to inspect
    #[arg(short = 'i', long = "in", value_name = "file", required = true)]
    pub input: PathBuf,
}

impl InspectArgs {
    pub fn run(self) -> CliResult<()> {
        println!("{}", self.input.display());

        if ContainerKind::from_path(&self.input).is_some() {
            let summary = commands::describe(&self.input, &RunConfig::new("inspect"))?;
            let units = match summary.kind {
                ContainerKind::Docx => "entries",
                ContainerKind::Pdf => "pages",
            };
            println!("  kind:       {}", summary.kind);
            println!("  {units}:    {}", summary.units);
            println!("  images:     {}", summary.images);
            return Ok(());
        }

        let report = commands::inspect(&self.input)?;
        println!("  dimensions: {}x{}", report.width, report.height);
        println!("  capacity:   {} bits", report.capacity_bits);
        println!(
            "  mean RGB:   {:.1} / {:.1} / {:.1}",
            report.mean_rgb[0], report.mean_rgb[1], report.mean_rgb[2]
        );
        println!(
            "  blue LSBs:  {} zeros, {} ones ({:.1}% ones)",
            report.stats.zeros,
            report.stats.ones,
            report.stats.ones_ratio() * 100.0
        );
        Ok(())
    }
}
