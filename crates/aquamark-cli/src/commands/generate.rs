use std::path::PathBuf;

use clap::Args;
use aquamark_core::commands;

use crate::CliResult;

/// Renders a payload text as a QR mark image
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Payload text to encode
    #[arg(short, long, value_name = "text", required = true)]
    pub text: String,

    /// Wrap the payload in a CRC32 integrity envelope
    #[arg(short = 'c', long = "integrity")]
    pub integrity: bool,

    /// The mark will be stored as this PNG file
    #[arg(short = 'o', long = "out", value_name = "output file", required = true)]
    pub output: PathBuf,
}

impl GenerateArgs {
    pub fn run(self) -> CliResult<()> {
        commands::generate(&self.text, self.integrity, &self.output)?;
        println!("Mark written to {}", self.output.display());
        Ok(())
    }
}
