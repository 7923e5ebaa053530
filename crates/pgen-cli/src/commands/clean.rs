//! Clean command implementation

use colored::Colorize;
use pgen_core::{Session, SessionOptions};

use super::finish;
use crate::cli::TargetArgs;
use crate::error::Result;

/// Run the clean command
pub fn run_clean(target: &TargetArgs) -> Result<()> {
    println!(
        "{} Removing generated projects...",
        "=>".blue().bold()
    );

    let session = Session::open(&target.file)?;
    let options = SessionOptions {
        project: target.project.clone(),
        copy: false,
    };
    let report = session.clean(&target.tools, &options)?;
    finish(&report)
}
