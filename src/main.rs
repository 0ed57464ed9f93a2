mod bootstrap;
mod cli;
mod commands;

use crate::bootstrap::{config, logging, storage};
use crate::cli::Cli;
use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    logging::initialize();

    let cli = Cli::parse();

    let config = config::load(&cli.config).await?;
    let storage = storage::initialize(&config).await?;

    commands::run(cli.command, storage).await
}
