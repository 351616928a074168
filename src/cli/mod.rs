mod clean;
mod common;
mod deploy;
pub mod error;
mod files;
pub mod parser;
mod ui;

use clap::Parser;
use error::CliError;
use parser::Cli;

pub fn parse_args() -> Cli {
    Cli::parse()
}

pub fn run(cli: Cli) -> Result<(), CliError> {
    match &cli.command {
        parser::Commands::Deploy(cmd) => cmd.run(&cli),
        parser::Commands::Clean(cmd) => cmd.run(&cli),
        parser::Commands::Files(cmd) => cmd.run(&cli),
    }
}
