//! Main entry point for the sprite-sim CLI
#![allow(clippy::print_stdout)]

mod cli;
mod commands;
mod utils;

use anyhow::Result;
use clap::CommandFactory;
use clap::Parser;
use clap_complete::{Generator, generate};
use std::io;

use crate::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logger; RUST_LOG overrides the verbosity flags
    env_logger::Builder::new()
        .filter_level(verbosity_filter(cli.verbose, cli.quiet))
        .parse_env(env_logger::Env::default())
        .init();

    // Execute command
    match cli.command {
        Commands::Run(args) => commands::run::execute(&args),

        Commands::Config { command } => commands::config::execute(command),

        Commands::Completions { shell } => {
            print_completions(shell, &mut Cli::command());
            Ok(())
        }
    }
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    generate(
        generator,
        cmd,
        cmd.get_name().to_string(),
        &mut io::stdout(),
    );
}

fn verbosity_filter(verbose: u8, quiet: bool) -> log::LevelFilter {
    match (verbose, quiet) {
        (0, true) => log::LevelFilter::Error,
        (0, false) => log::LevelFilter::Warn,
        (1, _) => log::LevelFilter::Info,
        (2, _) => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}
