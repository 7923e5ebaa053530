//! Resolution engine for the project generator
//!
//! `pgen-core` turns a root document and per-project `module.yaml` files
//! into rendered tool projects:
//!
//! - **Property substitution**: `${name}` placeholders against a layered,
//!   immutable [`PropertyScope`]
//! - **Structural merge**: pure merges over YAML trees
//! - **Model builder**: favors, tool overlays and required projects folded
//!   into a [`ProjectModel`]
//! - **Export assembly**: the model flattened into an `ExportDictionary`
//! - **Generator / Session**: workspace iteration and the
//!   generate/clean/build operations
//!
//! ```text
//!                      pgen-cli
//!                          |
//!                      pgen-core
//!                          |
//!        +-----------+-----+------+
//!        |           |            |
//!    pgen-fs     pgen-meta    pgen-tools
//! ```
//!
//! # Example
//!
//! ```no_run
//! use pgen_core::{Session, SessionOptions};
//!
//! fn example() -> pgen_core::Result<()> {
//!     let session = Session::open("projects.yaml")?;
//!     let report = session.generate(&["gcc_arm".to_string()], &SessionOptions::default())?;
//!     assert!(report.success());
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod error;
pub mod export;
pub mod generator;
pub mod merge;
pub mod model;
pub mod portable;
pub mod project;
pub mod properties;
pub mod session;

pub use builder::{ModelBuilder, ResolvedProject};
pub use error::{Error, Result};
pub use export::{CopyPlan, assemble, assemble_with_plan, output_dir_relation};
pub use generator::{DEFAULT_PROJECTS_FILE, Generator};
pub use merge::{deep_merge, eliminate_none, merge_without_override};
pub use model::ProjectModel;
pub use project::Project;
pub use properties::PropertyScope;
pub use session::{Operation, Outcome, Session, SessionOptions, SessionReport};

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_module_error_names_project_and_path() {
        let error = Error::MissingModule {
            project: "blinky".into(),
            path: PathBuf::from("/ws/blinky/module.yaml"),
        };
        let display = error.to_string();
        assert!(display.contains("blinky"), "got: {display}");
        assert!(display.contains("/ws/blinky/module.yaml"), "got: {display}");
    }
}
