//! Error types for pgen-meta

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] pgen_fs::Error),

    #[error("Invalid project type '{value}' (expected exe, lib or src)")]
    InvalidProjectType { value: String },

    #[error("Invalid {what}: {message}")]
    InvalidDocument { what: String, message: String },
}

impl Error {
    pub(crate) fn invalid(what: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::InvalidDocument {
            what: what.into(),
            message: err.to_string(),
        }
    }
}
