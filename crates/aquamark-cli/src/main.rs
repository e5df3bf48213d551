use clap::Parser;

use crate::cli::{CliArgs, Commands};

mod cli;
mod commands;

pub type CliResult<T> = std::result::Result<T, aquamark_core::WatermarkError>;

fn main() {
    env_logger::init();

    let args = CliArgs::parse();
    log::debug!("dispatching {:?}", args.command);

    let result = match args.command {
        Commands::Generate(cmd) => cmd.run(),
        Commands::Embed(cmd) => cmd.run(),
        Commands::Extract(cmd) => cmd.run(),
        Commands::Verify(cmd) => cmd.run(),
        Commands::Inspect(cmd) => cmd.run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
