//! archer - compress and extract archives with the host's own tools.

mod cli;
mod config;

use std::process::ExitCode;

use anyhow::Context;
use archer_tool::ToolResolver;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::cli::{Cli, Commands};
use crate::config::ArcherConfig;

const LOG_ENV: &str = "ARCHER_LOG";

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ArcherConfig::load().context("failed to load configuration")?;
    let resolver = ToolResolver::system(&config.resolver_options());

    match cli.command {
        Commands::Compress(args) => args.run(&resolver),
        Commands::Extract(args) => args.run(&resolver),
    }
}

fn init_tracing(cli: &Cli) {
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
