//! List commands for tools and projects

use std::path::Path;

use colored::Colorize;
use pgen_core::Session;
use pgen_tools::ToolDispatcher;

use crate::error::Result;

/// Run the list-tools command
pub fn run_list_tools() -> Result<()> {
    let dispatcher = ToolDispatcher::new();

    println!("{}", "Available Tools".bold());
    println!();
    for slug in dispatcher.list_available() {
        let description = dispatcher.description(&slug).unwrap_or_default();
        let aliases = dispatcher.aliases(&slug);
        if aliases.is_empty() {
            println!("  {:<18} {}", slug.green(), description);
        } else {
            println!(
                "  {:<18} {} (alias: {})",
                slug.green(),
                description,
                aliases.join(", ").dimmed()
            );
        }
    }
    Ok(())
}

/// Run the list-projects command
pub fn run_list_projects(file: &Path) -> Result<()> {
    let session = Session::open(file)?;

    println!("{}", "Projects".bold());
    for project in session.list_projects() {
        println!("  {}", project.green());
    }

    let workspaces = session.list_workspaces();
    if !workspaces.is_empty() {
        println!();
        println!("{}", "Workspaces".bold());
        for (name, members) in workspaces {
            println!("  {:<18} {}", name.cyan(), members.join(", "));
        }
    }
    Ok(())
}
