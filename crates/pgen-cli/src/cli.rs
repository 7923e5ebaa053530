//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Project generator - render build projects from YAML declarations
#[derive(Parser, Debug)]
#[command(name = "pgen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug output (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Which projects to work on, and with which tools
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct TargetArgs {
    /// Root document
    #[arg(short, long, default_value = "projects.yaml", env = "PGEN_PROJECTS_FILE")]
    pub file: PathBuf,

    /// Tool to generate for; repeat for several tools
    #[arg(short, long = "tool", required = true)]
    pub tools: Vec<String>,

    /// Project or workspace name; all projects when omitted
    #[arg(short, long)]
    pub project: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Generate tool projects
    ///
    /// Examples:
    ///   pgen generate -t gcc_arm                 # every project
    ///   pgen generate -t gcc_arm -p blinky       # one project
    ///   pgen generate -t gcc_arm -t gnu_mcu_eclipse --copy
    Generate {
        #[command(flatten)]
        target: TargetArgs,

        /// Copy referenced sources into the output directory
        #[arg(short, long)]
        copy: bool,
    },

    /// Remove generated project directories
    Clean {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Generate, then build with the tool
    Build {
        #[command(flatten)]
        target: TargetArgs,

        /// Copy referenced sources into the output directory
        #[arg(short, long)]
        copy: bool,
    },

    /// List available tools or declared projects
    List {
        #[command(subcommand)]
        what: ListTarget,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ListTarget {
    /// Tools the generator can render
    Tools,
    /// Projects and workspaces of a root document
    Projects {
        /// Root document
        #[arg(short, long, default_value = "projects.yaml", env = "PGEN_PROJECTS_FILE")]
        file: PathBuf,
    },
}
