//! Eclipse CDT project files for the GNU MCU Eclipse plugin
//!
//! Produces `.project` (linked resources grouped into virtual folders) and
//! `.cproject` (managed build configuration). Files are not copied: every
//! linked resource points back at the project through `PARENT-<n>-PROJECT_LOC`.

pub mod options;

use std::collections::BTreeSet;

use pgen_fs::NormalizedPath;
use pgen_meta::{ExportDictionary, ProjectType, Settings, Stage};

use crate::error::{Error, Result};
use crate::integration::{GeneratedProject, ToolIntegration};

pub use options::{BOOL_OPTIONS, EclipseOptions};

const OPTION_PREFIX: &str = "ilg.gnuarmeclipse.managedbuild.cross.option";
const TOOL_PREFIX: &str = "ilg.gnuarmeclipse.managedbuild.cross.tool";

/// Linked resource kinds in `.project`.
const LINK_FILE: u8 = 1;
const LINK_FOLDER: u8 = 2;

#[derive(Debug, Default, Clone, Copy)]
pub struct EclipseGnuMcu;

impl EclipseGnuMcu {
    pub fn new() -> Self {
        Self
    }

    /// Render `.project`.
    pub fn render_project(&self, export: &ExportDictionary) -> String {
        let mut xml = Xml::new();
        xml.open("projectDescription", &[]);
        xml.text("name", &export.name);
        xml.text("comment", "");
        xml.empty("projects", &[]);

        xml.open("buildSpec", &[]);
        for (builder, triggers) in [
            ("org.eclipse.cdt.managedbuilder.core.genmakebuilder", "clean,full,incremental,"),
            ("org.eclipse.cdt.managedbuilder.core.ScannerConfigBuilder", "full,incremental,"),
        ] {
            xml.open("buildCommand", &[]);
            xml.text("name", builder);
            xml.text("triggers", triggers);
            xml.empty("arguments", &[]);
            xml.close("buildCommand");
        }
        xml.close("buildSpec");

        xml.open("natures", &[]);
        for nature in [
            "org.eclipse.cdt.core.cnature",
            "org.eclipse.cdt.core.ccnature",
            "org.eclipse.cdt.managedbuilder.core.managedBuildNature",
            "org.eclipse.cdt.managedbuilder.core.ScannerConfigNature",
        ] {
            xml.text("nature", nature);
        }
        xml.close("natures");

        xml.open("linkedResources", &[]);
        for group in group_names(export) {
            xml.open("link", &[]);
            xml.text("name", &group);
            xml.text("type", &LINK_FOLDER.to_string());
            xml.text("locationURI", "virtual:/virtual");
            xml.close("link");

            for file in group_files(export, &group) {
                let name = NormalizedPath::new(&file).file_name().unwrap_or(&file).to_string();
                xml.open("link", &[]);
                xml.text("name", &format!("{group}/{name}"));
                xml.text("type", &LINK_FILE.to_string());
                xml.text("locationURI", &linked_location(&file));
                xml.close("link");
            }
        }
        xml.close("linkedResources");

        xml.close("projectDescription");
        xml.finish()
    }

    /// Render `.cproject`: an executable (`elf`) or a static library configuration.
    pub fn render_cproject(&self, export: &ExportDictionary, settings: &Settings) -> String {
        let options = EclipseOptions::from_export(export);
        let target = match export.output_type {
            ProjectType::Exe => "elf",
            ProjectType::Lib | ProjectType::Src => "lib",
        };
        let config_id = format!("ilg.gnuarmeclipse.managedbuild.cross.config.{target}.debug");
        let include_paths = eclipse_paths(&export.include_paths);
        let search_paths = eclipse_paths(&export.linker.search_paths);

        let mut xml = Xml::new();
        xml.raw("<?fileVersion 4.0.0?>");
        xml.open(
            "cproject",
            &[("storage_type_id", "org.eclipse.cdt.core.XmlProjectDescriptionStorage")],
        );
        xml.open("storageModule", &[("moduleId", "org.eclipse.cdt.core.settings")]);
        xml.open("cconfiguration", &[("id", &config_id)]);

        xml.open(
            "storageModule",
            &[
                ("buildSystemId", "org.eclipse.cdt.managedbuilder.core.configurationDataProvider"),
                ("id", &config_id),
                ("moduleId", "org.eclipse.cdt.core.settings"),
                ("name", "Debug"),
            ],
        );
        xml.empty("externalSettings", &[]);
        xml.open("extensions", &[]);
        xml.empty(
            "extension",
            &[("id", "org.eclipse.cdt.core.ELF"), ("point", "org.eclipse.cdt.core.BinaryParser")],
        );
        for parser in ["GASErrorParser", "GmakeErrorParser", "GLDErrorParser", "CWDLocator", "GCCErrorParser"] {
            xml.empty(
                "extension",
                &[
                    ("id", &format!("org.eclipse.cdt.core.{parser}")),
                    ("point", "org.eclipse.cdt.core.ErrorParser"),
                ],
            );
        }
        xml.close("extensions");
        xml.close("storageModule");

        xml.open("storageModule", &[("moduleId", "cdtBuildSystem"), ("version", "4.0.0")]);
        let (artifact_extension, artefact_type) = match export.output_type {
            ProjectType::Exe => ("elf", "org.eclipse.cdt.build.core.buildArtefactType.exe"),
            ProjectType::Lib | ProjectType::Src => ("a", "org.eclipse.cdt.build.core.buildArtefactType.staticLib"),
        };
        xml.open(
            "configuration",
            &[
                ("artifactExtension", artifact_extension),
                ("artifactName", &export.artifact),
                ("buildArtefactType", artefact_type),
                ("id", &config_id),
                ("name", "Debug"),
                ("parent", &config_id),
            ],
        );
        xml.open(
            "folderInfo",
            &[("id", &format!("{config_id}.")), ("name", "/"), ("resourcePath", "")],
        );
        let toolchain = format!("ilg.gnuarmeclipse.managedbuild.cross.toolchain.{target}.debug");
        let toolchain_id = xml.next_id(&toolchain);
        xml.open(
            "toolChain",
            &[("id", &toolchain_id), ("name", "Cross ARM GCC"), ("superClass", &toolchain)],
        );

        xml.enum_option("optimization.level", options.optimization);
        xml.enum_option("debugging.level", options.debug);
        xml.enum_option("arm.target.family", options.mcu);
        xml.enum_option("arm.target.instructionset", options.instruction_set);
        xml.enum_option("arm.target.fpu.abi", options.fpu_abi);
        xml.enum_option("arm.target.fpu.unit", options.fpu);
        xml.enum_option("arm.target.unalignedaccess", options.unaligned_access);
        for (_, option) in BOOL_OPTIONS {
            if !option.starts_with("cpp.") && !option.starts_with("c.") {
                xml.bool_option(&format!("{OPTION_PREFIX}.{option}"), options.is_enabled(option));
            }
        }
        xml.string_option(&format!("{OPTION_PREFIX}.command.prefix"), "arm-none-eabi-");
        xml.string_option(
            &format!("{OPTION_PREFIX}.toolchain.path"),
            settings.tool_path("gcc").unwrap_or(""),
        );

        let platform_id = xml.next_id("ilg.gnuarmeclipse.managedbuild.cross.targetPlatform");
        xml.empty(
            "targetPlatform",
            &[
                ("archList", "all"),
                ("binaryParser", "org.eclipse.cdt.core.ELF"),
                ("id", &platform_id),
                ("osList", "all"),
                ("superClass", "ilg.gnuarmeclipse.managedbuild.cross.targetPlatform"),
            ],
        );
        let builder_id = xml.next_id("ilg.gnuarmeclipse.managedbuild.cross.builder");
        xml.empty(
            "builder",
            &[
                ("buildPath", &format!("${{workspace_loc:/{}}}/Debug", export.name)),
                ("id", &builder_id),
                ("managedBuildOn", "true"),
                ("name", "Gnu Make Builder"),
                ("superClass", "ilg.gnuarmeclipse.managedbuild.cross.builder"),
            ],
        );

        for (tool, stage, other) in [
            ("assembler", Stage::Asm, &options.other_asm_flags),
            ("c.compiler", Stage::C, &options.other_c_flags),
            ("cpp.compiler", Stage::Cxx, &options.other_cxx_flags),
        ] {
            xml.open_tool(tool);
            let mut defines = export.macros.common.clone();
            for m in export.macros.get(stage) {
                if !defines.contains(m) {
                    defines.push(m.clone());
                }
            }
            xml.list_option(&format!("{OPTION_PREFIX}.{tool}.defs"), "definedSymbols", &defines);
            xml.list_option(&format!("{OPTION_PREFIX}.{tool}.include.paths"), "includePath", &include_paths);
            if tool != "assembler" {
                let prefix = tool.trim_end_matches(".compiler");
                for (_, option) in BOOL_OPTIONS {
                    if option.starts_with(&format!("{prefix}.")) {
                        xml.bool_option(&format!("{OPTION_PREFIX}.{option}"), options.is_enabled(option));
                    }
                }
            }
            xml.string_option(&format!("{OPTION_PREFIX}.{tool}.other"), &other.join(" "));
            xml.close("tool");
        }

        match export.output_type {
            ProjectType::Exe => {
                xml.open_tool("cpp.linker");
                xml.bool_option(&format!("{OPTION_PREFIX}.cpp.linker.gcsections"), options.gc_sections);
                xml.list_option(
                    &format!("{OPTION_PREFIX}.cpp.linker.scriptfile"),
                    "stringList",
                    &eclipse_paths(&export.linker.script_files),
                );
                xml.list_option(&format!("{OPTION_PREFIX}.cpp.linker.paths"), "libPaths", &search_paths);
                xml.list_option(&format!("{OPTION_PREFIX}.cpp.linker.libs"), "libs", &export.linker.libraries);
                xml.string_option(
                    &format!("{OPTION_PREFIX}.cpp.linker.other"),
                    &options.other_ld_flags.join(" "),
                );
                xml.close("tool");
                for tool in ["createflash", "printsize"] {
                    xml.open_tool(tool);
                    xml.close("tool");
                }
            }
            ProjectType::Lib | ProjectType::Src => {
                xml.open_tool("archiver");
                xml.close("tool");
            }
        }

        xml.close("toolChain");
        xml.close("folderInfo");
        xml.close("configuration");
        xml.close("storageModule");
        xml.close("cconfiguration");
        xml.close("storageModule");

        xml.open("storageModule", &[("moduleId", "cdtBuildSystem"), ("version", "4.0.0")]);
        let project_type = format!("ilg.gnuarmeclipse.managedbuild.cross.target.{target}");
        let project_name = match export.output_type {
            ProjectType::Exe => "Executable",
            ProjectType::Lib | ProjectType::Src => "Static Library",
        };
        xml.empty(
            "project",
            &[
                ("id", &format!("{}.{project_type}", export.name)),
                ("name", project_name),
                ("projectType", &project_type),
            ],
        );
        xml.close("storageModule");
        xml.close("cproject");
        xml.finish()
    }
}

impl ToolIntegration for EclipseGnuMcu {
    fn name(&self) -> &str {
        "gnu_mcu_eclipse"
    }

    fn toolchain(&self) -> &str {
        "gcc_arm"
    }

    fn export_project(&self, export: &ExportDictionary, settings: &Settings) -> Result<GeneratedProject> {
        let mut generated = GeneratedProject::new(NormalizedPath::new(&export.output_dir.destination));
        generated.write("cproj", ".cproject", &self.render_cproject(export, settings))?;
        generated.write("proj_file", ".project", &self.render_project(export))?;
        tracing::info!(project = %export.name, path = %generated.path, "Generated Eclipse project");
        Ok(generated)
    }

    fn build_project(&self, _generated: &GeneratedProject, _settings: &Settings) -> Result<()> {
        Err(Error::BuildUnsupported {
            tool: self.name().to_string(),
        })
    }
}

/// Virtual folders: every include or source group holding files.
fn group_names(export: &ExportDictionary) -> Vec<String> {
    let mut names: BTreeSet<String> = export
        .include_files
        .groups()
        .filter(|(_, paths)| !paths.is_empty())
        .map(|(name, _)| name.to_string())
        .collect();
    names.extend(export.source_files.group_names());
    names.into_iter().collect()
}

/// Headers and sources of one group, sorted by lowercased basename.
fn group_files(export: &ExportDictionary, group: &str) -> Vec<String> {
    let mut files: Vec<String> = export.include_files.get(group).unwrap_or_default().to_vec();
    for kind in pgen_meta::SourceKind::ALL {
        if let Some(paths) = export.source_files.get(kind).get(group) {
            files.extend(paths.iter().cloned());
        }
    }
    files.sort_by_key(|f| {
        NormalizedPath::new(f)
            .file_name()
            .unwrap_or_default()
            .to_lowercase()
    });
    files
}

/// Location of a linked resource relative to the Eclipse project directory.
///
/// Leading `..` steps become the `PARENT-<n>-PROJECT_LOC` variable.
pub fn linked_location(path: &str) -> String {
    let path = NormalizedPath::new(path).clean();
    if path.is_absolute() {
        return path.as_str().to_string();
    }
    let components: Vec<&str> = path.components().collect();
    let count = components.iter().take_while(|c| **c == "..").count();
    let rest = components[count..].join("/");
    if count == 0 {
        format!("PROJECT_LOC/{rest}")
    } else {
        format!("PARENT-{count}-PROJECT_LOC/{rest}")
    }
}

/// Managed builds run one level below the project, in the configuration
/// directory, so relative paths gain a `../`.
fn eclipse_paths(paths: &[String]) -> Vec<String> {
    paths
        .iter()
        .map(|p| {
            if NormalizedPath::new(p).is_absolute() {
                p.clone()
            } else {
                format!("../{p}")
            }
        })
        .collect()
}

/// Escape text for XML attribute or element content.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Indented XML writer.
struct Xml {
    lines: Vec<String>,
    depth: usize,
    ids: usize,
}

impl Xml {
    fn new() -> Self {
        Self {
            lines: vec![r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#.to_string()],
            depth: 0,
            ids: 0,
        }
    }

    /// Unique id derived from a superclass id.
    fn next_id(&mut self, base: &str) -> String {
        self.ids += 1;
        format!("{base}.{}", self.ids)
    }

    fn push(&mut self, line: String) {
        self.lines.push(format!("{}{line}", "\t".repeat(self.depth)));
    }

    fn raw(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn tag(name: &str, attrs: &[(&str, &str)]) -> String {
        let mut tag = format!("<{name}");
        for (key, value) in attrs {
            tag.push_str(&format!(" {key}=\"{}\"", escape(value)));
        }
        tag
    }

    fn open(&mut self, name: &str, attrs: &[(&str, &str)]) {
        self.push(format!("{}>", Self::tag(name, attrs)));
        self.depth += 1;
    }

    fn close(&mut self, name: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.push(format!("</{name}>"));
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) {
        self.push(format!("{}/>", Self::tag(name, attrs)));
    }

    fn text(&mut self, name: &str, text: &str) {
        self.push(format!("<{name}>{}</{name}>", escape(text)));
    }

    fn open_tool(&mut self, tool: &str) {
        let super_class = format!("{TOOL_PREFIX}.{tool}");
        let id = self.next_id(&super_class);
        self.open("tool", &[("id", &id), ("superClass", &super_class)]);
    }

    fn enum_option(&mut self, option: &str, value: &str) {
        let super_class = format!("{OPTION_PREFIX}.{option}");
        let id = self.next_id(&super_class);
        self.empty(
            "option",
            &[
                ("id", &id),
                ("superClass", &super_class),
                ("value", &format!("{super_class}.{value}")),
                ("valueType", "enumerated"),
            ],
        );
    }

    fn bool_option(&mut self, super_class: &str, value: bool) {
        let id = self.next_id(super_class);
        self.empty(
            "option",
            &[
                ("id", &id),
                ("superClass", super_class),
                ("value", if value { "true" } else { "false" }),
                ("valueType", "boolean"),
            ],
        );
    }

    fn string_option(&mut self, super_class: &str, value: &str) {
        let id = self.next_id(super_class);
        self.empty(
            "option",
            &[("id", &id), ("superClass", super_class), ("value", value), ("valueType", "string")],
        );
    }

    fn list_option(&mut self, super_class: &str, value_type: &str, values: &[String]) {
        let id = self.next_id(super_class);
        self.open(
            "option",
            &[("id", &id), ("superClass", super_class), ("valueType", value_type)],
        );
        for value in values {
            self.empty("listOptionValue", &[("builtIn", "false"), ("value", value)]);
        }
        self.close("option");
    }

    fn finish(self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("../../src/main.c", "PARENT-2-PROJECT_LOC/src/main.c")]
    #[case("src/main.c", "PROJECT_LOC/src/main.c")]
    #[case("../a/../b/c.h", "PARENT-1-PROJECT_LOC/b/c.h")]
    #[case("/opt/sdk/startup.s", "/opt/sdk/startup.s")]
    fn linked_locations(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(linked_location(path), expected);
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape(r#"a<b & "c">"#), "a&lt;b &amp; &quot;c&quot;&gt;");
    }

    #[test]
    fn relative_paths_gain_parent_step() {
        let paths = vec!["../../inc".to_string(), "/abs/inc".to_string()];
        assert_eq!(eclipse_paths(&paths), vec!["../../../inc", "/abs/inc"]);
    }

    #[test]
    fn build_is_unsupported() {
        let err = EclipseGnuMcu::new()
            .build_project(&GeneratedProject::default(), &Settings::default())
            .unwrap_err();
        assert!(matches!(err, Error::BuildUnsupported { .. }));
    }
}
