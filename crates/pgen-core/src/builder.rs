//! Project model builder
//!
//! Builds one project for one tool, recursing into its required projects:
//!
//! 1. load `module.yaml` and layer its properties into the scope
//! 2. select one favor per dimension
//! 3. substitute and validate the declaration, then merge favors, the
//!    declaration itself and the tool-specific overlays
//! 4. stage portable files
//! 5. resolve required projects and absorb what each dependency type exports

use std::collections::HashSet;

use pgen_fs::{ConfigStore, NormalizedPath};
use pgen_meta::{
    ModuleDocument, ProjectDeclaration, ProjectOverlay, ProjectRecord, ProjectType, RawFavor,
    Settings,
};
use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};
use crate::merge::{eliminate_none, merge_mappings_without_override};
use crate::model::ProjectModel;
use crate::portable;
use crate::properties::PropertyScope;

/// Declaration file names, in lookup order.
pub const MODULE_FILES: &[&str] = &["module.yaml", "module.yml", "module.json", "module.toml"];

/// A built project and the required projects built for it.
#[derive(Debug, Clone)]
pub struct ResolvedProject {
    pub model: ProjectModel,
    /// Required projects in declaration order.
    pub subprojects: Vec<ResolvedProject>,
    /// `src` descendants still waiting for a non-`src` ancestor to absorb them.
    forwarded: Vec<ProjectModel>,
}

impl ResolvedProject {
    /// This project followed by every buildable descendant, depth first.
    /// `src` projects are left out since they never build on their own. A
    /// project reached through several paths appears once, at its first
    /// position.
    pub fn buildable(&self) -> Vec<&ProjectModel> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        self.collect_buildable(&mut out, &mut seen);
        out
    }

    fn collect_buildable<'a>(&'a self, out: &mut Vec<&'a ProjectModel>, seen: &mut HashSet<&'a str>) {
        if self.model.kind != ProjectType::Src && seen.insert(self.model.name.as_str()) {
            out.push(&self.model);
        }
        for sub in &self.subprojects {
            sub.collect_buildable(out, seen);
        }
    }

    /// Apply an ancestor's stage options to this project and everything
    /// below it.
    fn inherit_stages(&mut self, ancestor: &ProjectModel) {
        self.model.inherit_stages(ancestor);
        for forwarded in &mut self.forwarded {
            forwarded.inherit_stages(ancestor);
        }
        for sub in &mut self.subprojects {
            sub.inherit_stages(ancestor);
        }
    }
}

/// Builds project models for one tool.
pub struct ModelBuilder<'a> {
    workspace_dir: &'a NormalizedPath,
    settings: &'a Settings,
    tool: &'a str,
    keywords: &'a [String],
    root_scope: &'a PropertyScope,
    store: ConfigStore,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(
        workspace_dir: &'a NormalizedPath,
        settings: &'a Settings,
        tool: &'a str,
        keywords: &'a [String],
        root_scope: &'a PropertyScope,
    ) -> Self {
        Self {
            workspace_dir,
            settings,
            tool,
            keywords,
            root_scope,
            store: ConfigStore::new(),
        }
    }

    /// Build a top-level project from its record in the root document.
    pub fn build(&self, name: &str, record: &Mapping) -> Result<ResolvedProject> {
        let mut chain = Vec::new();
        self.build_project(name, record, false, &mut chain)
    }

    fn build_project(
        &self,
        name: &str,
        record: &Mapping,
        has_parent: bool,
        chain: &mut Vec<String>,
    ) -> Result<ResolvedProject> {
        if chain.iter().any(|p| p == name) {
            let mut cycle = chain.clone();
            cycle.push(name.to_string());
            return Err(Error::DependencyCycle { chain: cycle });
        }

        // LOAD
        let basepath = self.workspace_dir.join(name);
        let document = self.load_module(name, &basepath)?;
        let parsed_record = ProjectRecord::from_mapping(record, name)?;
        let mut scope = self
            .root_scope
            .push(&parsed_record.properties)
            .with_defaults(&document.properties);
        tracing::debug!(project = name, tool = self.tool, "Loaded declaration");

        // SELECT_FAVORS
        let mut favors: Vec<&RawFavor> = Vec::new();
        for dimension in &document.favor_dimensions {
            let favor_name =
                parsed_record
                    .favor
                    .get(dimension)
                    .ok_or_else(|| Error::FavorNotSelected {
                        project: name.to_string(),
                        dimension: dimension.clone(),
                    })?;
            let favor = document
                .project_favors
                .get(favor_name)
                .ok_or_else(|| Error::UnknownFavor {
                    project: name.to_string(),
                    favor: favor_name.clone(),
                })?;
            if &favor.dimension != dimension {
                return Err(Error::FavorDimensionMismatch {
                    project: name.to_string(),
                    favor: favor_name.clone(),
                    expected: dimension.clone(),
                    actual: favor.dimension.clone(),
                });
            }
            scope = scope.with_defaults(&favor.properties);
            favors.push(favor);
            tracing::debug!(project = name, dimension = %dimension, favor = %favor_name, "Selected favor");
        }

        // MERGE_DECLARATION
        let declaration = ProjectDeclaration::from_value(scope.substitute(&document.body, name)?, name)?;
        let mut model = ProjectModel::new(name, basepath, &declaration, self.settings, self.tool);
        for favor in &favors {
            let body = scope.substitute(&favor.body, name)?;
            let overlay = ProjectOverlay::from_value(body, &format!("favor of project '{name}'"))?;
            model.apply_overlay(&overlay);
        }
        model.apply_overlay(&declaration.overlay);

        // APPLY_TOOL_OVERLAY
        for keyword in self.keywords {
            if let Some(overlay) = declaration.tool_specific.get(keyword) {
                tracing::debug!(project = name, keyword = %keyword, "Applying tool overlay");
                model.apply_tool_overlay(overlay);
            }
        }

        if !has_parent && model.kind != ProjectType::Exe {
            return Err(Error::RootType {
                project: name.to_string(),
                kind: model.kind.to_string(),
            });
        }

        if let Some(portable) = &declaration.portable {
            portable::stage(&mut model, portable, self.workspace_dir, self.settings)?;
        }

        // RESOLVE_REQUIRED
        // Stage options as declared, before any sibling is absorbed.
        let own_stages = model.clone();
        chain.push(name.to_string());
        let mut subprojects = Vec::with_capacity(declaration.required.len());
        let mut forwarded = Vec::new();
        for (child_name, override_record) in &declaration.required {
            let child_record = merge_mappings_without_override(override_record, record);
            let mut child = self.build_project(child_name, &child_record, true, chain)?;

            if model.kind == ProjectType::Src && child.model.kind != ProjectType::Src {
                return Err(Error::TypeMismatch {
                    parent: name.to_string(),
                    child: child_name.clone(),
                    child_type: child.model.kind.to_string(),
                });
            }

            child.inherit_stages(&own_stages);
            let child_forwarded = std::mem::take(&mut child.forwarded);
            if model.kind == ProjectType::Src {
                forwarded.push(child.model.clone());
                forwarded.extend(child_forwarded);
            } else {
                match child.model.kind {
                    ProjectType::Lib => model.absorb_library(&child.model),
                    ProjectType::Src => model.absorb_sources(&child.model),
                    ProjectType::Exe => {}
                }
                for src in &child_forwarded {
                    model.absorb_sources(src);
                }
            }
            tracing::debug!(project = name, required = %child_name, kind = %child.model.kind, "Resolved required project");
            subprojects.push(child);
        }
        chain.pop();

        tracing::debug!(project = name, tool = self.tool, "Project ready");
        Ok(ResolvedProject {
            model,
            subprojects,
            forwarded,
        })
    }

    fn load_module(&self, name: &str, basepath: &NormalizedPath) -> Result<ModuleDocument> {
        let path = MODULE_FILES
            .iter()
            .map(|file| basepath.join(file))
            .find(|path| path.is_file())
            .ok_or_else(|| Error::MissingModule {
                project: name.to_string(),
                path: basepath.join(MODULE_FILES[0]).to_native(),
            })?;
        let value: Value = self.store.load_value(&path)?;
        Ok(ModuleDocument::from_value(eliminate_none(&value), name)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgen_test_utils::TestWorkspace;
    use pretty_assertions::assert_eq;

    fn build(ws: &TestWorkspace, name: &str, record: &str) -> Result<ResolvedProject> {
        let workspace = NormalizedPath::new(ws.root());
        let settings = Settings::default();
        let keywords = vec!["gcc_arm".to_string()];
        let scope = PropertyScope::default();
        let builder = ModelBuilder::new(&workspace, &settings, "gcc_arm", &keywords, &scope);
        let record: Mapping = serde_yaml::from_str(record).unwrap();
        builder.build(name, &record)
    }

    #[test]
    fn missing_module_is_reported() {
        let ws = TestWorkspace::new();
        let err = build(&ws, "ghost", "{}").unwrap_err();
        assert!(matches!(err, Error::MissingModule { ref project, .. } if project == "ghost"));
    }

    #[test]
    fn root_must_be_exe() {
        let ws = TestWorkspace::new();
        ws.write_module("lib_a", "type: lib\n");
        let err = build(&ws, "lib_a", "{}").unwrap_err();
        assert!(matches!(err, Error::RootType { .. }));
    }

    #[test]
    fn root_type_is_checked_before_portable_staging() {
        let ws = TestWorkspace::new();
        ws.write_module("rtos", "type: lib\nportable:\n  config: [rtos_config.h]\n");
        ws.touch("rtos/rtos_config.h");
        let err = build(&ws, "rtos", "{}").unwrap_err();
        assert!(matches!(err, Error::RootType { .. }));
        ws.assert_not_exists("portable");
    }

    #[test]
    fn src_cannot_require_lib() {
        let ws = TestWorkspace::new();
        ws.write_module("app", "type: exe\nrequired:\n  drivers:\n");
        ws.write_module("drivers", "type: src\nrequired:\n  hal:\n");
        ws.write_module("hal", "type: lib\n");
        let err = build(&ws, "app", "{}").unwrap_err();
        assert!(
            matches!(err, Error::TypeMismatch { ref parent, ref child, .. } if parent == "drivers" && child == "hal")
        );
    }

    #[test]
    fn cycles_are_detected() {
        let ws = TestWorkspace::new();
        ws.write_module("app", "required:\n  a:\n");
        ws.write_module("a", "type: src\nrequired:\n  b:\n");
        ws.write_module("b", "type: src\nrequired:\n  a:\n");
        let err = build(&ws, "app", "{}").unwrap_err();
        match err {
            Error::DependencyCycle { chain } => assert_eq!(chain, vec!["app", "a", "b", "a"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn favors_select_properties_deterministically() {
        let ws = TestWorkspace::new();
        ws.write_module(
            "app",
            r#"
favor_dimensions: [dim_1, dim_2]
properties:
  prop_1: pabc
project_favors:
  favor_1_1:
    dimension: dim_1
    properties: {prop_1_1: "1_1"}
    files: {sources: ["${undefined_in_unselected}"]}
  favor_1_2:
    dimension: dim_1
    properties: {prop_1_1: "1_2"}
  favor_2_1:
    dimension: dim_2
    properties: {prop_2_1: "2_1"}
  favor_2_2:
    dimension: dim_2
    properties: {prop_2_1: "2_2"}
files:
  sources: ["sources/${prop_1_1}/${prop_2_1}_favors.c"]
"#,
        );
        let resolved = build(&ws, "app", "{favor: {dim_1: favor_1_2, dim_2: favor_2_1}}").unwrap();
        assert_eq!(
            resolved.model.sources.get("default").unwrap(),
            &["sources/1_2/2_1_favors.c".to_string()]
        );
    }

    #[test]
    fn favor_errors() {
        let ws = TestWorkspace::new();
        ws.write_module(
            "app",
            "favor_dimensions: [cpu]\nproject_favors:\n  m4: {dimension: cpu}\n  gcc: {dimension: compiler}\n",
        );
        assert!(matches!(build(&ws, "app", "{}").unwrap_err(), Error::FavorNotSelected { .. }));
        assert!(matches!(
            build(&ws, "app", "{favor: {cpu: m7}}").unwrap_err(),
            Error::UnknownFavor { .. }
        ));
        assert!(matches!(
            build(&ws, "app", "{favor: {cpu: gcc}}").unwrap_err(),
            Error::FavorDimensionMismatch { .. }
        ));
    }

    #[test]
    fn tool_overlay_applies_for_matching_keyword_only() {
        let ws = TestWorkspace::new();
        ws.write_module(
            "app",
            "tool_specific:\n  gcc_arm:\n    common: {flags: [-mthumb]}\n    misc: {standard_libraries: [m]}\n  iar_arm:\n    common: {flags: [--thumb]}\n",
        );
        let resolved = build(&ws, "app", "{}").unwrap();
        assert_eq!(resolved.model.flags.common, vec!["-mthumb"]);
        assert!(resolved.model.misc.contains_key("standard_libraries"));
    }

    #[test]
    fn child_inherits_record_and_parent_stages() {
        let ws = TestWorkspace::new();
        ws.write_module(
            "app",
            "common: {flags: [-mcpu=cortex-m4], macros: [APP]}\nrequired:\n  hal: {properties: {chip: k64}}\n",
        );
        ws.write_module("hal", "type: lib\ncommon: {macros: [\"CHIP_${chip#upper}\"]}\n");
        let resolved = build(&ws, "app", "{properties: {chip: ignored}}").unwrap();

        let hal = &resolved.subprojects[0].model;
        assert_eq!(hal.macros.common, vec!["CHIP_K64", "APP"]);
        assert_eq!(hal.flags.common, vec!["-mcpu=cortex-m4"]);
        assert_eq!(resolved.model.macros.common, vec!["APP", "CHIP_K64"]);
        assert_eq!(resolved.model.linker.libraries, vec!["hal"]);
    }

    #[test]
    fn siblings_do_not_leak_stage_options() {
        let ws = TestWorkspace::new();
        ws.write_module(
            "app",
            "common: {macros: [APP]}\nrequired:\n  lib_a:\n  lib_b:\n",
        );
        ws.write_module("lib_a", "type: lib\ncommon: {macros: [LIB_A_ONLY], flags: [-fno-common]}\n");
        ws.write_module("lib_b", "type: lib\ncommon: {macros: [LIB_B]}\n");
        let resolved = build(&ws, "app", "{}").unwrap();

        let lib_b = &resolved.subprojects[1].model;
        assert_eq!(lib_b.macros.common, vec!["LIB_B", "APP"]);
        assert!(lib_b.flags.common.is_empty());
        assert_eq!(resolved.model.macros.common, vec!["APP", "LIB_A_ONLY", "LIB_B"]);
    }

    #[test]
    fn shared_library_is_linked_and_listed_once() {
        let ws = TestWorkspace::new();
        ws.write_module("app", "required:\n  lib_a:\n  lib_c:\n");
        ws.write_module("lib_a", "type: lib\nrequired:\n  lib_c:\n");
        ws.write_module("lib_c", "type: lib\n");
        let resolved = build(&ws, "app", "{}").unwrap();

        assert_eq!(resolved.model.linker.libraries, vec!["lib_a", "lib_c"]);
        assert_eq!(resolved.model.linker.search_paths.len(), 2);
        let buildable: Vec<&str> = resolved.buildable().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(buildable, vec!["app", "lib_a", "lib_c"]);
    }

    #[test]
    fn src_sources_bubble_to_nearest_non_src_ancestor() {
        let ws = TestWorkspace::new();
        ws.write_module("app", "required:\n  drivers:\n");
        ws.write_module("drivers", "type: src\nfiles:\n  sources: {drv: [uart.c]}\nrequired:\n  bsp:\n");
        ws.write_module("bsp", "type: src\nfiles:\n  sources: {bsp: [board.c]}\n");
        let resolved = build(&ws, "app", "{}").unwrap();

        assert_eq!(resolved.model.sources.get("drv").unwrap(), &["../drivers/uart.c".to_string()]);
        assert_eq!(resolved.model.sources.get("bsp").unwrap(), &["../bsp/board.c".to_string()]);
        let buildable: Vec<&str> = resolved.buildable().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(buildable, vec!["app"]);
    }
}
