//! SeedScope CLI — keyword discovery and scoring from seed phrases.
//!
//! Expands seeds into suggestions and related keywords through the
//! DataForSEO API, scores them, and prints a ranked list.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
