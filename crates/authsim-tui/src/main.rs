//! `authsim-tui` binary.
//!
//! Plays the IoMT authentication flow in a full-screen dashboard, or
//! headless with `--headless`.

use authsim_tui::{Args, CliError, cli};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let args = Args::parse();
    cli::init_logging(&args)?;
    cli::run(args).await
}
