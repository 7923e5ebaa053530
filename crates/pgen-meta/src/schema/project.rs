//! Project declaration schema - loaded from `<project>/module.yaml`
//!
//! # Example YAML
//!
//! ```yaml
//! type: lib
//! files:
//!   includes: [include/driver.h]
//!   sources:
//!     drivers: [source/driver.c, source/${board}_pins.c]
//! common:
//!   macros: [USE_DRIVER]
//! favor_dimensions: [cpu]
//! project_favors:
//!   m4:
//!     dimension: cpu
//!     properties: { board: k64f }
//!     common: { flags: [-mcpu=cortex-m4] }
//! required:
//!   hal: {}
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use super::{nullable, one_or_many};
use crate::files::{DEFAULT_GROUP, FileGroups};
use crate::{Error, Result};

/// How a project participates in a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ProjectType {
    /// Linked executable; the only valid root.
    #[default]
    Exe,
    /// Static library; parents link against it.
    Lib,
    /// Plain sources compiled into the nearest non-`src` ancestor.
    Src,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::Exe => "exe",
            ProjectType::Lib => "lib",
            ProjectType::Src => "src",
        }
    }
}

impl FromStr for ProjectType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "exe" => Ok(ProjectType::Exe),
            "lib" => Ok(ProjectType::Lib),
            "src" => Ok(ProjectType::Src),
            _ => Err(Error::InvalidProjectType {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for ProjectType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ProjectType> for String {
    fn from(value: ProjectType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compile stages that carry flags and macros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    Common,
    Asm,
    C,
    Cxx,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Common, Stage::Asm, Stage::C, Stage::Cxx];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Common => "common",
            Stage::Asm => "asm",
            Stage::C => "c",
            Stage::Cxx => "cxx",
        }
    }
}

/// A single path or a list of paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathList {
    One(String),
    Many(Vec<String>),
}

impl PathList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            PathList::One(path) => vec![path],
            PathList::Many(paths) => paths,
        }
    }

    pub fn as_slice(&self) -> &[String] {
        match self {
            PathList::One(path) => std::slice::from_ref(path),
            PathList::Many(paths) => paths,
        }
    }
}

/// A `files.includes` / `files.sources` entry as authored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileEntry {
    /// `sources: src/main.c`
    Single(String),
    /// `sources: [a.c, b.c]`, lands in the `default` group
    Flat(Vec<String>),
    /// `sources: { group: [a.c] }`
    Grouped(BTreeMap<String, Option<PathList>>),
}

impl FileEntry {
    /// Normalize into group form.
    pub fn to_groups(&self) -> FileGroups {
        let mut groups = FileGroups::new();
        match self {
            FileEntry::Single(path) => groups.add(DEFAULT_GROUP, path),
            FileEntry::Flat(paths) => groups.extend(DEFAULT_GROUP, paths),
            FileEntry::Grouped(map) => {
                for (group, paths) in map {
                    groups.ensure_group(group);
                    if let Some(paths) = paths {
                        groups.extend(group, paths.as_slice());
                    }
                }
            }
        }
        groups
    }
}

/// Flags and macros for one compile stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageOptions {
    #[serde(default, deserialize_with = "one_or_many")]
    pub flags: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub macros: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkerOptions {
    #[serde(default, deserialize_with = "one_or_many")]
    pub flags: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub script_files: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub search_paths: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub libraries: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSection {
    #[serde(default)]
    pub includes: Option<FileEntry>,
    #[serde(default)]
    pub sources: Option<FileEntry>,
}

/// The mergeable part of a declaration.
///
/// Shared by the declaration body, favor variants and `tool_specific`
/// entries. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectOverlay {
    #[serde(default, deserialize_with = "nullable")]
    pub files: FileSection,
    #[serde(default)]
    pub includes: Option<FileEntry>,
    #[serde(default)]
    pub sources: Option<FileEntry>,
    #[serde(default, deserialize_with = "nullable")]
    pub common: StageOptions,
    #[serde(default, deserialize_with = "nullable", alias = "assemble")]
    pub asm: StageOptions,
    #[serde(default, deserialize_with = "nullable", alias = "ccompile")]
    pub c: StageOptions,
    #[serde(default, deserialize_with = "nullable", alias = "cxxcompile")]
    pub cxx: StageOptions,
    #[serde(default, deserialize_with = "nullable")]
    pub linker: LinkerOptions,
}

impl ProjectOverlay {
    pub fn from_value(value: Value, what: &str) -> Result<Self> {
        serde_yaml::from_value(value).map_err(|e| Error::invalid(what, e))
    }

    /// Include entries from both `files.includes` and a top-level `includes`.
    pub fn include_groups(&self) -> FileGroups {
        collect_groups([&self.files.includes, &self.includes])
    }

    /// Source entries from both `files.sources` and a top-level `sources`.
    pub fn source_groups(&self) -> FileGroups {
        collect_groups([&self.files.sources, &self.sources])
    }

    pub fn stage(&self, stage: Stage) -> &StageOptions {
        match stage {
            Stage::Common => &self.common,
            Stage::Asm => &self.asm,
            Stage::C => &self.c,
            Stage::Cxx => &self.cxx,
        }
    }
}

fn collect_groups<'a>(entries: impl IntoIterator<Item = &'a Option<FileEntry>>) -> FileGroups {
    let mut groups = FileGroups::new();
    for entry in entries.into_iter().flatten() {
        groups.merge(&entry.to_groups());
    }
    groups
}

/// A `tool_specific.<keyword>` entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolOverlay {
    pub overlay: ProjectOverlay,
    /// Free-form settings deep-unioned into the export for the renderer.
    pub misc: Mapping,
    /// Extra template names forwarded to the renderer.
    pub template: Vec<String>,
}

#[derive(Deserialize, Default)]
struct ToolExtras {
    #[serde(default, deserialize_with = "nullable")]
    misc: Mapping,
    #[serde(default, deserialize_with = "one_or_many")]
    template: Vec<String>,
}

impl ToolOverlay {
    pub fn from_value(value: Value, what: &str) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        let extras: ToolExtras =
            serde_yaml::from_value(value.clone()).map_err(|e| Error::invalid(what, e))?;
        Ok(Self {
            overlay: ProjectOverlay::from_value(value, what)?,
            misc: extras.misc,
            template: extras.template,
        })
    }
}

/// Files staged into the shared portable directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortableSpec {
    /// Destination tag; defaults to the owning project's name.
    #[serde(default)]
    pub dest: Option<String>,
    /// Configuration headers, registered as includes.
    #[serde(default, deserialize_with = "one_or_many")]
    pub config: Vec<String>,
    /// Port sources, registered as sources.
    #[serde(default, deserialize_with = "one_or_many")]
    pub port: Vec<String>,
}

#[derive(Deserialize, Default)]
struct DeclarationHeader {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<ProjectType>,
    #[serde(default)]
    build_dir: Option<String>,
    #[serde(default)]
    debugger: Option<String>,
    #[serde(default)]
    export_dir: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    tool_specific: Mapping,
    #[serde(default, deserialize_with = "nullable")]
    required: Mapping,
    #[serde(default)]
    portable: Option<PortableSpec>,
}

/// A project declaration with its properties substituted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectDeclaration {
    /// Artifact name; the project key when absent.
    pub name: Option<String>,
    pub kind: ProjectType,
    pub build_dir: Option<String>,
    pub debugger: Option<String>,
    /// Per-project location format, used when the global one is the default.
    pub export_dir: Option<String>,
    pub overlay: ProjectOverlay,
    pub tool_specific: BTreeMap<String, ToolOverlay>,
    /// Sub-projects in declaration order, each with the record override the
    /// parent passes down.
    pub required: Vec<(String, Mapping)>,
    pub portable: Option<PortableSpec>,
}

impl ProjectDeclaration {
    /// Validate a substituted declaration body.
    pub fn from_value(value: Value, project: &str) -> Result<Self> {
        let what = format!("declaration of project '{project}'");
        if !(value.is_mapping() || value.is_null()) {
            return Err(Error::invalid(what, "expected a mapping"));
        }
        let header: DeclarationHeader =
            serde_yaml::from_value(value.clone()).map_err(|e| Error::invalid(&what, e))?;
        let overlay = ProjectOverlay::from_value(value, &what)?;

        let mut tool_specific = BTreeMap::new();
        for (key, entry) in header.tool_specific {
            let keyword = key_string(&key, &what)?;
            let entry_what = format!("tool_specific.{keyword} of project '{project}'");
            tool_specific.insert(keyword, ToolOverlay::from_value(entry, &entry_what)?);
        }

        let mut required = Vec::with_capacity(header.required.len());
        for (key, entry) in header.required {
            let name = key_string(&key, &what)?;
            let record = match entry {
                Value::Null => Mapping::new(),
                Value::Mapping(map) => map,
                other => {
                    return Err(Error::invalid(
                        format!("required.{name} of project '{project}'"),
                        format!("expected a mapping, found {other:?}"),
                    ));
                }
            };
            required.push((name, record));
        }

        Ok(Self {
            name: header.name,
            kind: header.kind.unwrap_or_default(),
            build_dir: header.build_dir,
            debugger: header.debugger,
            export_dir: header.export_dir.filter(|dir| !dir.is_empty()),
            overlay,
            tool_specific,
            required,
            portable: header.portable,
        })
    }
}

/// One entry of `project_favors`, before substitution.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFavor {
    pub dimension: String,
    pub properties: Mapping,
    /// Everything else; becomes a [`ProjectOverlay`] once substituted.
    pub body: Value,
}

/// A `module.yaml` document split into the parts resolved before
/// substitution and the body substituted afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDocument {
    pub properties: Mapping,
    pub favor_dimensions: Vec<String>,
    pub project_favors: BTreeMap<String, RawFavor>,
    pub body: Value,
}

impl ModuleDocument {
    pub fn from_value(value: Value, project: &str) -> Result<Self> {
        let what = format!("module document of project '{project}'");
        let mut body = match value {
            Value::Mapping(map) => map,
            Value::Null => Mapping::new(),
            _ => return Err(Error::invalid(what, "expected a mapping")),
        };

        let properties = take_mapping(&mut body, "properties", &what)?;
        let favor_dimensions = match body.remove("favor_dimensions") {
            None | Some(Value::Null) => Vec::new(),
            Some(v) => serde_yaml::from_value::<PathList>(v)
                .map_err(|e| Error::invalid(format!("favor_dimensions of project '{project}'"), e))?
                .into_vec(),
        };

        let mut project_favors = BTreeMap::new();
        for (key, favor) in take_mapping(&mut body, "project_favors", &what)? {
            let favor_name = key_string(&key, &what)?;
            let favor_what = format!("project_favors.{favor_name} of project '{project}'");
            let mut favor_body = match favor {
                Value::Mapping(map) => map,
                _ => return Err(Error::invalid(favor_what, "expected a mapping")),
            };
            let dimension = match favor_body.remove("dimension") {
                Some(Value::String(dim)) => dim,
                _ => return Err(Error::invalid(favor_what, "missing 'dimension'")),
            };
            let properties = take_mapping(&mut favor_body, "properties", &favor_what)?;
            project_favors.insert(
                favor_name,
                RawFavor {
                    dimension,
                    properties,
                    body: Value::Mapping(favor_body),
                },
            );
        }

        Ok(Self {
            properties,
            favor_dimensions,
            project_favors,
            body: Value::Mapping(body),
        })
    }
}

fn take_mapping(map: &mut Mapping, key: &str, what: &str) -> Result<Mapping> {
    match map.remove(key) {
        None | Some(Value::Null) => Ok(Mapping::new()),
        Some(Value::Mapping(inner)) => Ok(inner),
        Some(_) => Err(Error::invalid(what, format!("'{key}' must be a mapping"))),
    }
}

pub(crate) fn key_string(key: &Value, what: &str) -> Result<String> {
    match key {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(Error::invalid(what, format!("unsupported key {key:?}"))),
    }
}
