use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod controller;
mod frames;
mod report;
mod ui;

use cli::{Cli, Command};
use config::load_settings;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Command::Personas = cli.command {
        return commands::personas();
    }

    let settings =
        load_settings(cli.config.as_deref())?.with_overrides(cli.functions_url, cli.api_key);
    settings.validate()?;

    match cli.command {
        Command::Personas => commands::personas(),
        Command::Image(args) => commands::image(&settings, args).await,
        Command::Frames(args) => commands::frames(&settings, args).await,
        Command::Interactive => commands::interactive(&settings).await,
    }
}
