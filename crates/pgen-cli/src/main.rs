//! Project generator CLI
//!
//! Renders Makefile and Eclipse projects from YAML project declarations.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands, ListTarget};
use error::Result;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}: could not set up logging: {}", "warning".yellow().bold(), e);
    }
    if cli.verbose {
        tracing::debug!("Verbose mode enabled");
    }

    if let Err(e) = execute_command(cli.command) {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn execute_command(cmd: Commands) -> Result<()> {
    tracing::debug!(command = ?cmd, "Executing command");
    match cmd {
        Commands::Generate { target, copy } => commands::run_generate(&target, copy),
        Commands::Clean { target } => commands::run_clean(&target),
        Commands::Build { target, copy } => commands::run_build(&target, copy),
        Commands::List { what } => match what {
            ListTarget::Tools => commands::run_list_tools(),
            ListTarget::Projects { file } => commands::run_list_projects(&file),
        },
    }
}
