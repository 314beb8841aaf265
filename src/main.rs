mod cli;
mod commands;
mod logging;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use logging::LogTarget;
use radar::RadarConfig;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let config = RadarConfig::load(args.config.as_deref()).context("loading configuration")?;
    let command = args.command.unwrap_or(cli::Command::Show);
    let target = match command {
        cli::Command::Show => LogTarget::File(logging::log_file_path()?),
        _ => LogTarget::Stderr,
    };
    logging::init(&config.log_level, args.verbose, target)?;

    match command {
        cli::Command::Init { name } => commands::init(name),
        cli::Command::Add {
            title,
            kind,
            at,
            priority,
        } => commands::add(title, kind.into(), at, priority.map(Into::into)),
        cli::Command::List => commands::list(&config),
        cli::Command::Layout { at, scale } => commands::layout(&config, at, scale.into()),
        cli::Command::Done { item_id } => commands::done(item_id),
        cli::Command::Show => commands::show(&config),
    }
}
