//! Error types for pgen-core

use std::path::PathBuf;

/// Result type for pgen-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration errors. Any of these aborts resolution of the project
/// being built; no partial model escapes.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A project directory has no `module.yaml`
    #[error("Project '{project}' has no declaration at {path}")]
    MissingModule { project: String, path: PathBuf },

    /// The root document does not exist
    #[error("Workspace file not found: {path}")]
    MissingWorkspaceFile { path: PathBuf },

    #[error("Unresolved property '${{{name}}}' in project '{project}'")]
    UnresolvedProperty { project: String, name: String },

    /// A property resolved to a list, mapping or null
    #[error("Property '{name}' in project '{project}' is not a string")]
    InvalidPropertyType { project: String, name: String },

    #[error("Unknown method '{method}' on property '{name}' in project '{project}'")]
    UnknownPropertyMethod {
        project: String,
        name: String,
        method: String,
    },

    #[error("Project '{project}' has no favor selected for dimension '{dimension}'")]
    FavorNotSelected { project: String, dimension: String },

    #[error("Project '{project}' has no favor named '{favor}'")]
    UnknownFavor { project: String, favor: String },

    #[error(
        "Favor '{favor}' of project '{project}' belongs to dimension '{actual}', not '{expected}'"
    )]
    FavorDimensionMismatch {
        project: String,
        favor: String,
        expected: String,
        actual: String,
    },

    /// A `src` project requires a project that is not `src`
    #[error("Project '{parent}' is of type src, but its required project '{child}' is of type {child_type}")]
    TypeMismatch {
        parent: String,
        child: String,
        child_type: String,
    },

    /// A top-level project that is not an executable
    #[error("Root project '{project}' must be of type exe, found {kind}")]
    RootType { project: String, kind: String },

    #[error("Dependency cycle: {}", chain.join(" -> "))]
    DependencyCycle { chain: Vec<String> },

    #[error("Invalid declaration of project '{project}': {message}")]
    InvalidDeclaration { project: String, message: String },

    /// A `portable.config` / `portable.port` file does not exist
    #[error("Portable file of project '{project}' not found: {path}")]
    PortableFileMissing { project: String, path: PathBuf },

    #[error(transparent)]
    Fs(#[from] pgen_fs::Error),

    #[error(transparent)]
    Meta(#[from] pgen_meta::Error),

    #[error(transparent)]
    Tools(#[from] pgen_tools::Error),
}
