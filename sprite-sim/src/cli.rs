//! Root CLI structure for sprite-sim

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sprite-sim")]
#[command(about = "Run and inspect sprite particle emitters without a renderer", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Simulate an emitter for a number of frames and report pool usage
    Run(crate::commands::run::RunArgs),

    /// Emitter configuration files
    Config {
        #[command(subcommand)]
        command: crate::commands::config::ConfigCommands,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
