//! docpress - render data records through HTML templates into PDF documents.

mod cli;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use docpress::config::PressConfig;
use docpress::logger;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = PressConfig::load(&cli.config)?;

    match &cli.command {
        Commands::Render { args } => cli::render::render_document(&config, args),
        Commands::Watch { args } => cli::watch::watch_document(&config, args),
    }
}
