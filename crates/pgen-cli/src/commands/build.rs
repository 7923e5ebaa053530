//! Build command implementation

use colored::Colorize;
use pgen_core::{Session, SessionOptions};

use super::finish;
use crate::cli::TargetArgs;
use crate::error::Result;

/// Run the build command: generate, then invoke each tool's build
pub fn run_build(target: &TargetArgs, copy: bool) -> Result<()> {
    println!(
        "{} Building projects from {}...",
        "=>".blue().bold(),
        target.file.display()
    );

    let session = Session::open(&target.file)?;
    let options = SessionOptions {
        project: target.project.clone(),
        copy,
    };
    let report = session.build(&target.tools, &options)?;
    finish(&report)
}
