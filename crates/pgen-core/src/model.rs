//! The resolved project model
//!
//! A [`ProjectModel`] is a declaration with favors, the declaration body and
//! tool overlays merged in, and required projects absorbed. Paths are kept
//! relative to the project's own directory (`basepath`) until export.

use pgen_fs::NormalizedPath;
use pgen_meta::{
    FileGroups, LinkerExport, ProjectDeclaration, ProjectOverlay, ProjectType, Settings, Stage,
    StageValues, ToolOverlay,
};
use serde_yaml::Mapping;

use crate::merge::{deep_merge_mappings, extend_unique, merge_mappings_without_override};

const DEFAULT_BUILD_DIR: &str = "build";

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectModel {
    /// Project key, which is also its directory name in the workspace.
    pub name: String,
    pub artifact: String,
    pub kind: ProjectType,
    /// Absolute project directory.
    pub basepath: NormalizedPath,
    pub build_dir: String,
    pub debugger: Option<String>,
    /// Output location relative to the settings root.
    pub location: NormalizedPath,
    /// Absolute output directory.
    pub output: NormalizedPath,
    pub includes: FileGroups,
    pub sources: FileGroups,
    pub macros: StageValues,
    pub flags: StageValues,
    pub linker: LinkerExport,
    pub misc: Mapping,
    pub template: Vec<String>,
}

impl ProjectModel {
    /// Empty model for a declaration; overlays are applied separately.
    pub fn new(
        name: &str,
        basepath: NormalizedPath,
        declaration: &ProjectDeclaration,
        settings: &Settings,
        tool: &str,
    ) -> Self {
        let location = settings.location(tool, name, declaration.export_dir.as_deref());
        let output = basepath.join(&settings.root).join(location.as_str());
        Self {
            name: name.to_string(),
            artifact: declaration.name.clone().unwrap_or_else(|| name.to_string()),
            kind: declaration.kind,
            basepath,
            build_dir: declaration
                .build_dir
                .clone()
                .unwrap_or_else(|| DEFAULT_BUILD_DIR.to_string()),
            debugger: declaration.debugger.clone(),
            location,
            output,
            includes: FileGroups::new(),
            sources: FileGroups::new(),
            macros: StageValues::default(),
            flags: StageValues::default(),
            linker: LinkerExport::default(),
            misc: Mapping::new(),
            template: Vec::new(),
        }
    }

    /// Merge an overlay in. Flags concatenate; macros, linker lists and file
    /// groups skip entries already present.
    pub fn apply_overlay(&mut self, overlay: &ProjectOverlay) {
        self.includes.merge(&overlay.include_groups());
        self.sources.merge(&overlay.source_groups());
        for stage in Stage::ALL {
            let options = overlay.stage(stage);
            self.flags.get_mut(stage).extend(options.flags.iter().cloned());
            extend_unique(self.macros.get_mut(stage), &options.macros);
        }
        self.linker.flags.extend(overlay.linker.flags.iter().cloned());
        extend_unique(&mut self.linker.script_files, &overlay.linker.script_files);
        extend_unique(&mut self.linker.search_paths, &overlay.linker.search_paths);
        extend_unique(&mut self.linker.libraries, &overlay.linker.libraries);
    }

    pub fn apply_tool_overlay(&mut self, tool: &ToolOverlay) {
        self.apply_overlay(&tool.overlay);
        self.misc = deep_merge_mappings(&self.misc, &tool.misc);
        extend_unique(&mut self.template, &tool.template);
    }

    /// Make an ancestor's stage flags and macros visible here: entries
    /// already present keep their place, missing ones are appended.
    pub fn inherit_stages(&mut self, ancestor: &ProjectModel) {
        for stage in Stage::ALL {
            extend_unique(self.flags.get_mut(stage), ancestor.flags.get(stage));
            extend_unique(self.macros.get_mut(stage), ancestor.macros.get(stage));
        }
    }

    /// Take a `lib` dependency's public part: headers, options and the
    /// library itself. Its sources are built on their own.
    pub fn absorb_library(&mut self, lib: &ProjectModel) {
        self.absorb_common(lib);
        extend_unique(&mut self.linker.libraries, [&lib.artifact]);
        extend_unique(&mut self.linker.libraries, &lib.linker.libraries);
        let lib_output = lib.output.join(&lib.build_dir);
        let search_path = lib_output.relative_to(&self.basepath).as_str().to_string();
        extend_unique(&mut self.linker.search_paths, [&search_path]);
    }

    /// Take a `src` dependency whole, sources and linker scripts included.
    pub fn absorb_sources(&mut self, src: &ProjectModel) {
        self.absorb_common(src);
        let sources = src.sources.map_paths(|p| self.rebase(src, p));
        self.sources.merge(&sources);
        let scripts: Vec<String> = src
            .linker
            .script_files
            .iter()
            .map(|p| self.rebase(src, p))
            .collect();
        extend_unique(&mut self.linker.script_files, &scripts);
        extend_unique(&mut self.linker.libraries, &src.linker.libraries);
    }

    fn absorb_common(&mut self, dep: &ProjectModel) {
        let includes = dep.includes.map_paths(|p| self.rebase(dep, p));
        self.includes.merge(&includes);
        for stage in Stage::ALL {
            extend_unique(self.flags.get_mut(stage), dep.flags.get(stage));
            extend_unique(self.macros.get_mut(stage), dep.macros.get(stage));
        }
        extend_unique(&mut self.linker.flags, &dep.linker.flags);
        let search_paths: Vec<String> = dep
            .linker
            .search_paths
            .iter()
            .map(|p| self.rebase(dep, p))
            .collect();
        extend_unique(&mut self.linker.search_paths, &search_paths);
        self.misc = merge_mappings_without_override(&self.misc, &dep.misc);
        extend_unique(&mut self.template, &dep.template);
    }

    /// A dependency path as seen from this project: kept when it already
    /// resolves here, otherwise routed through the dependency's directory.
    pub fn rebase(&self, dep: &ProjectModel, path: &str) -> String {
        let candidate = NormalizedPath::new(path);
        if candidate.is_absolute() || self.basepath.join(path).exists() {
            candidate.clean().as_str().to_string()
        } else {
            NormalizedPath::new(format!("../{}/{}", dep.name, path))
                .clean()
                .as_str()
                .to_string()
        }
    }
}
