//! Command implementations for pgen-cli

pub mod build;
pub mod clean;
pub mod generate;
pub mod list;

pub use build::run_build;
pub use clean::run_clean;
pub use generate::run_generate;
pub use list::{run_list_projects, run_list_tools};

use colored::Colorize;
use pgen_core::{Outcome, SessionReport};

use crate::error::{CliError, Result};

/// Print one line per outcome and turn failures into an error.
pub(crate) fn finish(report: &SessionReport) -> Result<()> {
    if report.outcomes.is_empty() {
        println!("{} Nothing to {}.", "=>".blue().bold(), report.operation);
        return Ok(());
    }

    for outcome in &report.outcomes {
        print_outcome(outcome);
    }

    let failed = report.failures().count();
    if failed > 0 {
        return Err(CliError::Failed {
            failed,
            total: report.outcomes.len(),
        });
    }
    println!(
        "{} {} target(s) done.",
        "OK".green().bold(),
        report.outcomes.len()
    );
    Ok(())
}

fn print_outcome(outcome: &Outcome) {
    let project = outcome.project.as_deref().unwrap_or("-");
    let message = outcome.message.as_deref().unwrap_or_default();
    let status = if outcome.success {
        " ok ".green().bold()
    } else {
        "FAIL".red().bold()
    };
    match &outcome.output {
        Some(output) if outcome.success => println!(
            "[{status}] {:<16} {:<20} {} ({})",
            outcome.tool.cyan(),
            project,
            message,
            output.as_str().dimmed()
        ),
        _ => println!("[{status}] {:<16} {:<20} {}", outcome.tool.cyan(), project, message),
    }
}
