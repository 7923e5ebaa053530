//! Filesystem abstraction for the project generator
//!
//! Provides forward-slash normalized paths, lexical path arithmetic and the
//! handful of I/O operations the generator performs: document loading,
//! atomic writes, best-effort directory listing and skip-if-exists copies.

pub mod config;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use path::NormalizedPath;
