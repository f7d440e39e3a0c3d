use anyhow::{Context, Result, anyhow};
use clap::Parser;
use inikeep_config::Config;
use inikeep_engine::{FileStorage, IniDocument, LoadMode};
use std::{io, process};

mod args;
mod commands;

use args::Cli;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    // RUST_LOG, when set, overrides the -v level
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?.unwrap_or_default();

    let file = config.resolve_file(cli.file).ok_or_else(|| {
        anyhow!(
            "No INI file given: pass --file or set default_file in {}",
            Config::config_path().display()
        )
    })?;
    let mode = if cli.strict || config.strict {
        LoadMode::Strict
    } else {
        LoadMode::Lenient
    };
    log::debug!("Opening {} ({mode:?})", file.display());

    let mut doc = IniDocument::load(FileStorage::new(&file), mode)
        .with_context(|| format!("Failed to open {}", file.display()))?;

    let mut out = io::stdout().lock();
    commands::execute(&mut doc, cli.command, &mut out)
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
