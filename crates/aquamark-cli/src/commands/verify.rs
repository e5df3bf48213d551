use clap::Args;
use aquamark_core::commands;
use aquamark_core::PayloadVerdict;

use crate::CliResult;

/// Checks a decoded payload text against its integrity envelope
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Decoded QR payload text
    #[arg(short, long, value_name = "text", required = true)]
    pub text: String,
}

impl VerifyArgs {
    pub fn run(self) -> CliResult<()> {
        match commands::verify(&self.text) {
            PayloadVerdict::Envelope(record) => {
                if record.data_valid {
                    println!("Envelope valid, payload intact");
                } else {
                    println!("Envelope INVALID, payload corrupted");
                }
                if let Some(ts) = record.timestamp {
                    println!("Embedded at unix time {ts}");
                }
            }
            PayloadVerdict::Legacy(text) => {
                println!("Legacy payload without envelope: {text}");
            }
        }
        Ok(())
    }
}
