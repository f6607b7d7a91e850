//! ## nplay
//! Command-line entry point: parse flags, load configuration, run the
//! pipeline. Configuration errors exit non-zero before capture starts.

use std::process::ExitCode;

use clap::Parser;

mod commands;
mod error;

use commands::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match commands::run_command(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("nplay: {e}");
            ExitCode::FAILURE
        }
    }
}
