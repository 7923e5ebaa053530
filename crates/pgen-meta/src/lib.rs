//! Declaration schema, settings and export model for the project generator.
//!
//! Everything read from disk is validated into these types once, at the load
//! boundary. The resolution engine in `pgen-core` works on them and produces
//! an [`ExportDictionary`] for the per-tool renderers.

pub mod error;
pub mod export;
pub mod files;
pub mod schema;
pub mod settings;

pub use error::{Error, Result};
pub use export::{ExportDictionary, LinkerExport, OutputDir, SourceFiles, StageValues};
pub use files::{FileGroups, FileKind, SourceKind};
pub use schema::{
    FileEntry, LinkerOptions, ModuleDocument, PortableSpec, ProjectDeclaration, ProjectOverlay,
    ProjectRecord, ProjectType, RawFavor, Stage, StageOptions, ToolOverlay, WorkspaceDocument,
};
pub use settings::{DEFAULT_EXPORT_LOCATION_FORMAT, Settings};
