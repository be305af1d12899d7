//! reportcard binary.

mod cli;
mod commands;
mod config;

use clap::Parser;
use tracing::debug;

fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    let cli = cli::Cli::parse();
    reportcard_observability::init_logging(&cli.logs)?;
    debug!(?cli, "Parsed arguments");

    commands::run(cli)
}
