//! Flattening a resolved model into an [`ExportDictionary`]

use pgen_fs::{NormalizedPath, io};
use pgen_meta::{
    ExportDictionary, FileGroups, FileKind, LinkerExport, OutputDir, ProjectType, SourceFiles,
};

use crate::error::Result;
use crate::merge::extend_unique;
use crate::model::ProjectModel;

/// Files to copy into the output directory before rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyPlan {
    pub destination: NormalizedPath,
    /// `(source, target)` pairs, both absolute.
    pub files: Vec<(NormalizedPath, NormalizedPath)>,
}

impl CopyPlan {
    /// Recreate the destination and copy every file into it.
    pub fn execute(&self) -> Result<()> {
        io::remove_dir_if_exists(&self.destination)?;
        io::ensure_dir(&self.destination)?;
        for (source, target) in &self.files {
            io::copy_file(source, target)?;
        }
        tracing::debug!(
            destination = %self.destination,
            files = self.files.len(),
            "Copied project files"
        );
        Ok(())
    }
}

/// Prefix leading from `output` back to `root`, and its number of `..` steps.
///
/// Both paths are compared lexically; if `output` is not below `root` they
/// are first made absolute.
pub fn output_dir_relation(root: &NormalizedPath, output: &NormalizedPath) -> Result<(String, usize)> {
    let (root, output) = if root.is_absolute() == output.is_absolute()
        && !output.relative_to(root).as_str().starts_with("..")
    {
        (root.clean(), output.clean())
    } else {
        (root.absolutize()?, output.absolutize()?)
    };

    let back = root.relative_to(&output);
    if back.as_str() == "." {
        return Ok((String::new(), 0));
    }
    let count = back.components().take_while(|c| *c == "..").count();
    Ok((format!("{}/", back.as_str()), count))
}

/// Files of a model, classified, with paths still relative to the project.
#[derive(Default)]
struct Collected {
    include_files: FileGroups,
    include_paths: Vec<String>,
    source_files: SourceFiles,
    source_paths: Vec<String>,
    script_files: Vec<String>,
}

impl Collected {
    fn from_model(model: &ProjectModel) -> Self {
        let mut collected = Collected::default();
        extend_unique(&mut collected.script_files, &model.linker.script_files);

        for (group, entries) in model.includes.groups() {
            for entry in entries {
                let path = NormalizedPath::new(entry);
                let on_disk = model.basepath.join(entry);
                if on_disk.is_dir() || (!on_disk.exists() && path.extension().is_none()) {
                    collected.add_include_dir(group, &path, &on_disk);
                } else if FileKind::is_header(&path) {
                    collected.add_file(group, &path, FileKind::Header);
                } else {
                    tracing::debug!(project = %model.name, path = %entry, "Skipping non-header include entry");
                }
            }
        }

        for (group, entries) in model.sources.groups() {
            for entry in entries {
                let path = NormalizedPath::new(entry);
                let on_disk = model.basepath.join(entry);
                if on_disk.is_dir() {
                    for name in io::list_files(&on_disk) {
                        collected.classify(group, &path.join(&name));
                    }
                } else {
                    collected.classify(group, &path);
                }
            }
        }
        collected
    }

    /// A directory of headers: the directory itself is the include path;
    /// headers anywhere below it are listed.
    fn add_include_dir(&mut self, group: &str, dir: &NormalizedPath, on_disk: &NormalizedPath) {
        extend_unique(&mut self.include_paths, [&dir.as_str().to_string()]);
        for relative in io::walk_files(on_disk) {
            let file = dir.join(&relative);
            if FileKind::is_header(&file) {
                self.include_files.add(group, file.as_str());
            }
        }
    }

    fn classify(&mut self, group: &str, path: &NormalizedPath) {
        match FileKind::classify(path) {
            Some(kind) => self.add_file(group, path, kind),
            None => tracing::debug!(path = %path, "Skipping file with unknown extension"),
        }
    }

    fn add_file(&mut self, group: &str, path: &NormalizedPath, kind: FileKind) {
        let parent = path
            .parent()
            .map(|p| p.as_str().to_string())
            .unwrap_or_else(|| ".".to_string());
        match kind {
            FileKind::Header => {
                self.include_files.add(group, path.as_str());
                extend_unique(&mut self.include_paths, [&parent]);
            }
            FileKind::Source(source_kind) => {
                self.source_files.get_mut(source_kind).add(group, path.as_str());
                extend_unique(&mut self.source_paths, [&parent]);
            }
            FileKind::LinkerScript => {
                extend_unique(&mut self.script_files, [&path.clean().as_str().to_string()]);
            }
        }
    }

    /// Every file the export references, relative to the project.
    fn files(&self) -> Vec<String> {
        let mut files: Vec<String> = self.include_files.paths().map(str::to_string).collect();
        for kind in pgen_meta::SourceKind::ALL {
            files.extend(self.source_files.get(kind).paths().map(str::to_string));
        }
        files.extend(self.script_files.iter().cloned());
        files
    }
}

/// Build the export dictionary for a model.
pub fn assemble(model: &ProjectModel, tool: &str) -> Result<ExportDictionary> {
    Ok(assemble_with_plan(model, tool, false)?.0)
}

/// Build the export dictionary, and with `copy` also the plan that copies
/// every referenced file into the output directory.
pub fn assemble_with_plan(
    model: &ProjectModel,
    tool: &str,
    copy: bool,
) -> Result<(ExportDictionary, Option<CopyPlan>)> {
    let collected = Collected::from_model(model);
    let (rel_path, rel_count) = output_dir_relation(&model.basepath, &model.output)?;

    let relative = |p: &str| -> String {
        let path = NormalizedPath::new(p);
        if path.is_absolute() {
            path.clean().as_str().to_string()
        } else {
            NormalizedPath::new(format!("{rel_path}{p}")).clean().as_str().to_string()
        }
    };
    let stripped = |p: &str| NormalizedPath::new(p).strip_parent_components().as_str().to_string();
    let place = |p: &str| if copy { stripped(p) } else { relative(p) };

    let mut include_files = collected.include_files.map_paths(place);
    include_files.sort_by_basename();

    let mut source_files = SourceFiles::default();
    for kind in pgen_meta::SourceKind::ALL {
        let mut groups = collected.source_files.get(kind).map_paths(place);
        groups.sort_by_basename();
        *source_files.get_mut(kind) = groups;
    }

    let mut include_paths = Vec::new();
    extend_unique(&mut include_paths, &collected.include_paths.iter().map(|p| place(p)).collect::<Vec<_>>());
    let mut source_paths = Vec::new();
    extend_unique(&mut source_paths, &collected.source_paths.iter().map(|p| place(p)).collect::<Vec<_>>());

    let linker = LinkerExport {
        flags: model.linker.flags.clone(),
        script_files: collected.script_files.iter().map(|p| place(p)).collect(),
        // search paths point at other projects' build output, never copied
        search_paths: model.linker.search_paths.iter().map(|p| relative(p)).collect(),
        libraries: model.linker.libraries.clone(),
    };

    if model.kind == ProjectType::Exe && linker.script_files.is_empty() {
        tracing::warn!(project = %model.name, tool, "Executable project has no linker script");
    }

    let plan = copy.then(|| CopyPlan {
        destination: model.output.clone(),
        files: collected
            .files()
            .iter()
            .map(|p| (model.basepath.join(p), model.output.join(stripped(p))))
            .collect(),
    });

    let (rel_path, rel_count) = if copy { (String::new(), 0) } else { (rel_path, rel_count) };
    let export = ExportDictionary {
        name: model.name.clone(),
        artifact: model.artifact.clone(),
        tool: tool.to_string(),
        output_type: model.kind,
        output_dir: OutputDir {
            path: model.location.as_str().to_string(),
            rel_path,
            rel_count,
            destination: model.output.as_str().to_string(),
        },
        build_dir: model.build_dir.clone(),
        debugger: model.debugger.clone(),
        macros: model.macros.clone(),
        flags: model.flags.clone(),
        linker,
        include_files,
        include_paths,
        source_files,
        source_paths,
        template: model.template.clone(),
        misc: model.misc.clone(),
        copied: copy,
    };
    Ok((export, plan))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgen_meta::{ProjectDeclaration, Settings};
    use pgen_test_utils::TestWorkspace;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(".", "aaa/bbb/cccc/ddd/eee/ffff/ggg", "../../../../../../../", 7)]
    #[case(".", "generated_projects/gcc_arm_app", "../../", 2)]
    #[case("/ws/app", "/ws/app", "", 0)]
    #[case("/ws/app", "/ws/app/out/x", "../../", 2)]
    #[case("/ws/app", "/ws/out", "../app/", 1)]
    fn output_relations(
        #[case] root: &str,
        #[case] output: &str,
        #[case] rel_path: &str,
        #[case] rel_count: usize,
    ) {
        let (path, count) =
            output_dir_relation(&NormalizedPath::new(root), &NormalizedPath::new(output)).unwrap();
        assert_eq!(path, rel_path);
        assert_eq!(count, rel_count);
    }

    fn model(ws: &TestWorkspace, yaml: &str) -> ProjectModel {
        let decl =
            ProjectDeclaration::from_value(serde_yaml::from_str(yaml).unwrap(), "app").unwrap();
        let mut model = ProjectModel::new(
            "app",
            NormalizedPath::new(ws.path("app")),
            &decl,
            &Settings::default(),
            "gcc_arm",
        );
        model.apply_overlay(&decl.overlay);
        model
    }

    #[test]
    fn classifies_and_relativizes_files() {
        let ws = TestWorkspace::new();
        ws.touch("app/src/b.cpp");
        ws.touch("app/src/a.cpp");
        ws.touch("app/src/readme.md");
        ws.touch("app/inc/app.h");
        ws.touch("app/inc/sub/deep.hpp");
        let m = model(
            &ws,
            "type: exe\nfiles:\n  includes: [inc]\n  sources: {app: [src, boot/startup.s, cfg/board.h, link/app.ld]}",
        );

        let export = assemble(&m, "gcc_arm").unwrap();

        assert_eq!(export.output_dir.rel_path, "../../");
        assert_eq!(export.output_dir.rel_count, 2);
        assert_eq!(
            export.source_files.cpp.get("app").unwrap(),
            &["../../src/a.cpp".to_string(), "../../src/b.cpp".to_string()]
        );
        assert_eq!(
            export.source_files.asm.get("app").unwrap(),
            &["../../boot/startup.s".to_string()]
        );
        assert_eq!(
            export.include_files.get("default").unwrap(),
            &["../../inc/app.h".to_string(), "../../inc/sub/deep.hpp".to_string()]
        );
        assert_eq!(export.include_files.get("app").unwrap(), &["../../cfg/board.h".to_string()]);
        assert_eq!(export.include_paths, vec!["../../inc", "../../cfg"]);
        assert_eq!(export.source_paths, vec!["../../src", "../../boot"]);
        assert_eq!(export.linker.script_files, vec!["../../link/app.ld"]);
    }

    #[test]
    fn groups_are_sorted_by_basename() {
        let ws = TestWorkspace::new();
        let m = model(&ws, "files:\n  sources: [z/b.cpp, y/a.cpp]");
        let export = assemble(&m, "gcc_arm").unwrap();
        assert_eq!(
            export.source_files.cpp.get("default").unwrap(),
            &["../../y/a.cpp".to_string(), "../../z/b.cpp".to_string()]
        );
    }

    #[test]
    fn copy_mode_strips_parents_and_plans_copies() {
        let ws = TestWorkspace::new();
        ws.write("app/src/main.c", "int main(void) { return 0; }\n");
        ws.touch("shared/util.c");
        let m = model(&ws, "files:\n  sources: [src/main.c, ../shared/util.c]");

        let (export, plan) = assemble_with_plan(&m, "gcc_arm", true).unwrap();
        let plan = plan.unwrap();

        assert!(export.copied);
        assert_eq!(export.output_dir.rel_path, "");
        assert_eq!(export.output_dir.rel_count, 0);
        assert_eq!(
            export.source_files.c.get("default").unwrap(),
            &["src/main.c".to_string(), "shared/util.c".to_string()]
        );

        plan.execute().unwrap();
        ws.assert_exists("app/generated_projects/gcc_arm_app/src/main.c");
        ws.assert_exists("app/generated_projects/gcc_arm_app/shared/util.c");
    }
}
