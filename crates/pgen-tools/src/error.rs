//! Error types for pgen-tools

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] pgen_fs::Error),

    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Rendering {file} for {tool} failed: {message}")]
    RenderFailed {
        tool: String,
        file: String,
        message: String,
    },

    #[error("Build with {tool} failed in {path} (exit code {exit_code:?})")]
    BuildFailed {
        tool: String,
        path: PathBuf,
        exit_code: Option<i32>,
    },

    #[error("Tool {tool} does not support building")]
    BuildUnsupported { tool: String },

    #[error("Project {project} has not been generated for {tool}")]
    NotGenerated { tool: String, project: String },
}
