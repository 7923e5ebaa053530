//! Shared test utilities for the project generator workspace.
//!
//! Dev-dependency only, never published.
//!
//! - [`workspace`]: [`TestWorkspace`](workspace::TestWorkspace) builder for
//!   on-disk project trees

pub mod workspace;

pub use workspace::TestWorkspace;
