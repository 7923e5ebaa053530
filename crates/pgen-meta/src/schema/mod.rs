//! Schema definitions for the documents the generator reads
//!
//! - `projects.yaml` (the root document): [`WorkspaceDocument`]
//! - `<project>/module.yaml`: [`ModuleDocument`], which becomes a
//!   [`ProjectDeclaration`] once its properties are substituted

pub mod project;
pub mod workspace;

pub use project::{
    FileEntry, FileSection, LinkerOptions, ModuleDocument, PathList, PortableSpec,
    ProjectDeclaration, ProjectOverlay, ProjectType, RawFavor, Stage, StageOptions, ToolOverlay,
};
pub use workspace::{ProjectRecord, SettingsSection, ToolSetting, WorkspaceDocument, WorkspaceEntry};

use serde::{Deserialize, Deserializer};

/// Deserialize a field that may be written as `key:` (null), reading null as
/// the type's default.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize a string list that may also be written as a single string.
pub(crate) fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<PathList>::deserialize(deserializer)?
        .map(PathList::into_vec)
        .unwrap_or_default())
}
