//! Error types for pgen-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error from the resolution engine
    #[error(transparent)]
    Core(#[from] pgen_core::Error),

    /// Some targets failed; details were already printed
    #[error("{failed} of {total} target(s) failed")]
    Failed { failed: usize, total: usize },
}
