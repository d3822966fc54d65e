mod cli;
mod config;
mod engine;
mod paths;
mod progress;
mod ui;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::Cli;
use config::{FileConfig, Settings};
use std::io;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "proxy-hardener", &mut io::stdout());
        return Ok(());
    }

    config::load_dotenv();

    let file = FileConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let settings = Settings::resolve(&cli, &file, |key| std::env::var(key).ok())?;
    for warning in &settings.warnings {
        ui::warn(warning);
    }

    engine::execute(&settings, engine::ExecuteOptions::detect(cli.quiet))?;
    Ok(())
}
