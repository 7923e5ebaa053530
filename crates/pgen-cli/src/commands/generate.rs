//! Generate command implementation

use colored::Colorize;
use pgen_core::{Session, SessionOptions};

use super::finish;
use crate::cli::TargetArgs;
use crate::error::Result;

/// Run the generate command
pub fn run_generate(target: &TargetArgs, copy: bool) -> Result<()> {
    println!(
        "{} Generating projects from {}...",
        "=>".blue().bold(),
        target.file.display()
    );

    let session = Session::open(&target.file)?;
    let options = SessionOptions {
        project: target.project.clone(),
        copy,
    };
    let report = session.generate(&target.tools, &options)?;
    finish(&report)
}
