//! ziptools CLI - Command-line utility for inspecting and editing ZIP
//! archives in place.

mod cli;
mod commands;
mod error;
mod output;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use output::OutputFormatter;
use ziptools_core::ZipBackendConfig;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let formatter = output::create_formatter(cli.json, cli.verbose > 0, cli.quiet);
    match run(&cli, &*formatter) {
        Ok(code) => code,
        Err(e) => {
            formatter.format_error(&e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: &cli::Cli, formatter: &dyn OutputFormatter) -> Result<ExitCode> {
    let config = backend_config(cli.compression_level);

    match &cli.command {
        cli::Commands::List(args) => commands::list::execute(args, formatter)?,
        cli::Commands::Get(args) => commands::get::execute(args, formatter)?,
        cli::Commands::Add(args) => commands::add::execute(args, config, formatter)?,
        cli::Commands::Drop(args) => commands::drop::execute(args, formatter)?,
        cli::Commands::Exists(args) => {
            let present = commands::exists::execute(args, formatter)?;
            return Ok(if present {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            });
        }
        cli::Commands::Stat(args) => commands::stat::execute(args, formatter)?,
        cli::Commands::Make(args) => commands::make::execute(args, config, formatter)?,
        cli::Commands::Features => commands::features::execute(formatter)?,
    }
    Ok(ExitCode::SUCCESS)
}

fn backend_config(compression_level: Option<u8>) -> ZipBackendConfig {
    let mut config = ZipBackendConfig::default();
    if compression_level.is_some() {
        config.compression_level = compression_level;
    }
    config
}

/// Maps verbosity flags onto a default log filter; `RUST_LOG` still wins.
fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}
