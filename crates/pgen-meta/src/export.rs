//! The export dictionary: the flattened, tool-facing view of a project

use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;

use crate::files::{FileGroups, SourceKind};
use crate::schema::{ProjectType, Stage};

/// Where generated files go and how to get from there back to the project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDir {
    /// Formatted location, relative to the settings root.
    pub path: String,
    /// Prefix leading from the output directory back to the project
    /// directory, with a trailing slash; empty when sources were copied.
    pub rel_path: String,
    /// Number of `..` steps in `rel_path`.
    pub rel_count: usize,
    /// Absolute output directory on disk.
    pub destination: String,
}

/// One string list per compile stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageValues {
    pub common: Vec<String>,
    pub asm: Vec<String>,
    pub c: Vec<String>,
    pub cxx: Vec<String>,
}

impl StageValues {
    pub fn get(&self, stage: Stage) -> &[String] {
        match stage {
            Stage::Common => &self.common,
            Stage::Asm => &self.asm,
            Stage::C => &self.c,
            Stage::Cxx => &self.cxx,
        }
    }

    pub fn get_mut(&mut self, stage: Stage) -> &mut Vec<String> {
        match stage {
            Stage::Common => &mut self.common,
            Stage::Asm => &mut self.asm,
            Stage::C => &mut self.c,
            Stage::Cxx => &mut self.cxx,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkerExport {
    pub flags: Vec<String>,
    pub script_files: Vec<String>,
    pub search_paths: Vec<String>,
    pub libraries: Vec<String>,
}

/// Source groups split by kind, since renderers treat each kind differently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFiles {
    pub c: FileGroups,
    pub cpp: FileGroups,
    pub asm: FileGroups,
    pub lib: FileGroups,
    pub obj: FileGroups,
}

impl SourceFiles {
    pub fn get(&self, kind: SourceKind) -> &FileGroups {
        match kind {
            SourceKind::C => &self.c,
            SourceKind::Cpp => &self.cpp,
            SourceKind::Asm => &self.asm,
            SourceKind::Lib => &self.lib,
            SourceKind::Obj => &self.obj,
        }
    }

    pub fn get_mut(&mut self, kind: SourceKind) -> &mut FileGroups {
        match kind {
            SourceKind::C => &mut self.c,
            SourceKind::Cpp => &mut self.cpp,
            SourceKind::Asm => &mut self.asm,
            SourceKind::Lib => &mut self.lib,
            SourceKind::Obj => &mut self.obj,
        }
    }

    /// Names of every group holding at least one source of any kind.
    pub fn group_names(&self) -> Vec<String> {
        let mut names: Vec<String> = SourceKind::ALL
            .iter()
            .flat_map(|kind| {
                self.get(*kind)
                    .groups()
                    .filter(|(_, paths)| !paths.is_empty())
                    .map(|(name, _)| name.to_string())
            })
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

/// Everything a renderer needs for one project and one tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportDictionary {
    /// Project key (its directory name).
    pub name: String,
    /// Build artifact name.
    pub artifact: String,
    pub tool: String,
    pub output_type: ProjectType,
    pub output_dir: OutputDir,
    pub build_dir: String,
    pub debugger: Option<String>,
    pub macros: StageValues,
    pub flags: StageValues,
    pub linker: LinkerExport,
    pub include_files: FileGroups,
    pub include_paths: Vec<String>,
    pub source_files: SourceFiles,
    pub source_paths: Vec<String>,
    pub template: Vec<String>,
    pub misc: Mapping,
    /// Sources were copied into the output directory.
    pub copied: bool,
}

impl ExportDictionary {
    /// All project files the export references: headers, sources of every
    /// kind and linker scripts.
    pub fn referenced_files(&self) -> Vec<String> {
        let mut files: Vec<String> = self.include_files.paths().map(str::to_string).collect();
        for kind in SourceKind::ALL {
            files.extend(self.source_files.get(kind).paths().map(str::to_string));
        }
        files.extend(self.linker.script_files.iter().cloned());
        files
    }
}
