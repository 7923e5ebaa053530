//! GNU Make renderer for the `arm-none-eabi` GCC toolchain

use std::process::Command;

use pgen_fs::NormalizedPath;
use pgen_meta::{ExportDictionary, ProjectType, Settings, SourceKind, Stage};

use crate::error::{Error, Result};
use crate::integration::{GeneratedProject, ToolIntegration};

const TOOLCHAIN_PREFIX: &str = "arm-none-eabi-";

/// Renders a standalone `Makefile` and builds it with `make`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MakefileGccArm;

impl MakefileGccArm {
    pub fn new() -> Self {
        Self
    }

    /// Produce the Makefile text for an export.
    pub fn render(&self, export: &ExportDictionary, settings: &Settings) -> String {
        let mut mk = Makefile::default();

        mk.comment(&format!(
            "Makefile for {} ({}), generated by pgen for {}",
            export.name, export.output_type, export.tool
        ));
        mk.blank();
        mk.assign("PROJECT", &export.artifact);
        mk.assign("BUILD_DIR", &export.build_dir);
        mk.assign("TOOLCHAIN", TOOLCHAIN_PREFIX);
        mk.assign("TOOLCHAIN_BIN_PATH", settings.tool_path("gcc").unwrap_or(""));
        mk.blank();
        mk.assign("CC", "$(TOOLCHAIN_BIN_PATH)$(TOOLCHAIN)gcc");
        mk.assign("CXX", "$(TOOLCHAIN_BIN_PATH)$(TOOLCHAIN)g++");
        mk.assign("AS", "$(TOOLCHAIN_BIN_PATH)$(TOOLCHAIN)gcc -x assembler-with-cpp");
        mk.assign("AR", "$(TOOLCHAIN_BIN_PATH)$(TOOLCHAIN)ar");
        mk.assign("LD", "$(TOOLCHAIN_BIN_PATH)$(TOOLCHAIN)g++");
        mk.assign("OBJCOPY", "$(TOOLCHAIN_BIN_PATH)$(TOOLCHAIN)objcopy");
        mk.assign("SIZE", "$(TOOLCHAIN_BIN_PATH)$(TOOLCHAIN)size");
        mk.blank();

        let sources = |kind: SourceKind| -> Vec<String> {
            export.source_files.get(kind).paths().map(str::to_string).collect()
        };
        let c_srcs = sources(SourceKind::C);
        let cpp_srcs = sources(SourceKind::Cpp);
        let asm_srcs = sources(SourceKind::Asm);

        mk.list("C_SRCS", &c_srcs);
        mk.list("CPP_SRCS", &cpp_srcs);
        mk.list("ASM_SRCS", &asm_srcs);
        mk.list("OBJ_FILES", &sources(SourceKind::Obj));
        mk.list("LIB_FILES", &sources(SourceKind::Lib));
        mk.blank();

        mk.list("INCLUDE_PATHS", &prefixed("-I", &export.include_paths));
        mk.list("LIBRARY_PATHS", &prefixed("-L", &export.linker.search_paths));
        let mut libraries = export.linker.libraries.clone();
        libraries.extend(misc_list(export, "standard_libraries"));
        mk.list("LIBRARIES", &prefixed("-l", &libraries));
        mk.assign(
            "LINKER_SCRIPT",
            export.linker.script_files.first().map(String::as_str).unwrap_or(""),
        );
        mk.blank();

        for stage in Stage::ALL {
            let name = stage_var(stage);
            mk.list(&format!("{name}_DEFINES"), &prefixed("-D", export.macros.get(stage)));
            mk.list(&format!("{name}_FLAGS"), export.flags.get(stage));
        }
        mk.list("LD_FLAGS", &export.linker.flags);
        mk.blank();

        let mut objects = Vec::new();
        let mut object_rules = Vec::new();
        for (srcs, compiler, stage) in [
            (&c_srcs, "$(CC)", Stage::C),
            (&cpp_srcs, "$(CXX)", Stage::Cxx),
            (&asm_srcs, "$(AS)", Stage::Asm),
        ] {
            let name = stage_var(stage);
            for src in srcs {
                let object = object_path(src);
                object_rules.push(vec![
                    format!("{object}: {src}"),
                    "\t@mkdir -p $(dir $@)".to_string(),
                    format!(
                        "\t{compiler} $(COMMON_FLAGS) $({name}_FLAGS) $(COMMON_DEFINES) $({name}_DEFINES) $(INCLUDE_PATHS) -c $< -o $@"
                    ),
                ]);
                objects.push(object);
            }
        }
        mk.list("OBJECTS", &objects);
        mk.blank();

        let target = match export.output_type {
            ProjectType::Exe => "$(BUILD_DIR)/$(PROJECT).elf",
            ProjectType::Lib | ProjectType::Src => "$(BUILD_DIR)/lib$(PROJECT).a",
        };
        mk.line(".PHONY: all clean");
        mk.blank();
        match export.output_type {
            ProjectType::Exe => {
                mk.line(&format!(
                    "all: {target} $(BUILD_DIR)/$(PROJECT).bin $(BUILD_DIR)/$(PROJECT).hex"
                ));
                mk.blank();
                let script = if export.linker.script_files.is_empty() {
                    ""
                } else {
                    " -T$(LINKER_SCRIPT)"
                };
                mk.line(&format!("{target}: $(OBJECTS) $(OBJ_FILES) $(LIB_FILES)"));
                mk.line(&format!(
                    "\t$(LD) $(COMMON_FLAGS) $(LD_FLAGS){script} $(LIBRARY_PATHS) -o $@ $(OBJECTS) $(OBJ_FILES) $(LIB_FILES) -Wl,--start-group $(LIBRARIES) -Wl,--end-group"
                ));
                mk.line("\t$(SIZE) $@");
                mk.blank();
                mk.line("$(BUILD_DIR)/$(PROJECT).bin: $(BUILD_DIR)/$(PROJECT).elf");
                mk.line("\t$(OBJCOPY) -O binary $< $@");
                mk.blank();
                mk.line("$(BUILD_DIR)/$(PROJECT).hex: $(BUILD_DIR)/$(PROJECT).elf");
                mk.line("\t$(OBJCOPY) -O ihex $< $@");
            }
            ProjectType::Lib | ProjectType::Src => {
                mk.line(&format!("all: {target}"));
                mk.blank();
                mk.line(&format!("{target}: $(OBJECTS) $(OBJ_FILES)"));
                mk.line("\t@mkdir -p $(dir $@)");
                mk.line("\t$(AR) rcs $@ $(OBJECTS) $(OBJ_FILES)");
            }
        }
        mk.blank();

        for rule in object_rules {
            for line in rule {
                mk.line(&line);
            }
            mk.blank();
        }

        mk.line("clean:");
        mk.line("\trm -rf $(BUILD_DIR)");

        mk.finish()
    }
}

impl ToolIntegration for MakefileGccArm {
    fn name(&self) -> &str {
        "gcc_arm"
    }

    fn toolchain(&self) -> &str {
        "gcc_arm"
    }

    fn toolnames(&self) -> Vec<&str> {
        vec!["gcc_arm", "make_gcc_arm"]
    }

    fn export_project(&self, export: &ExportDictionary, settings: &Settings) -> Result<GeneratedProject> {
        let mut generated = GeneratedProject::new(NormalizedPath::new(&export.output_dir.destination));
        generated.write("makefile", "Makefile", &self.render(export, settings))?;
        tracing::info!(project = %export.name, path = %generated.path, "Generated Makefile");
        Ok(generated)
    }

    fn build_project(&self, generated: &GeneratedProject, _settings: &Settings) -> Result<()> {
        tracing::debug!(path = %generated.path, "Running make");
        let status = Command::new("make")
            .arg("-C")
            .arg(generated.path.to_native())
            .status()
            .map_err(|_| Error::BuildFailed {
                tool: self.name().to_string(),
                path: generated.path.to_native(),
                exit_code: None,
            })?;

        if !status.success() {
            return Err(Error::BuildFailed {
                tool: self.name().to_string(),
                path: generated.path.to_native(),
                exit_code: status.code(),
            });
        }
        Ok(())
    }
}

/// Accumulates Makefile lines.
#[derive(Default)]
struct Makefile {
    lines: Vec<String>,
}

impl Makefile {
    fn line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }

    fn comment(&mut self, text: &str) {
        self.lines.push(format!("# {text}"));
    }

    fn assign(&mut self, name: &str, value: &str) {
        if value.is_empty() {
            self.lines.push(format!("{name} :="));
        } else {
            self.lines.push(format!("{name} := {value}"));
        }
    }

    /// One item per line, joined with continuations.
    fn list(&mut self, name: &str, items: &[String]) {
        if items.is_empty() {
            self.lines.push(format!("{name} :="));
            return;
        }
        self.lines.push(format!("{name} := \\"));
        let last = items.len() - 1;
        for (i, item) in items.iter().enumerate() {
            if i == last {
                self.lines.push(format!("\t{item}"));
            } else {
                self.lines.push(format!("\t{item} \\"));
            }
        }
    }

    fn finish(self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}

fn stage_var(stage: Stage) -> &'static str {
    match stage {
        Stage::Common => "COMMON",
        Stage::Asm => "ASM",
        Stage::C => "C",
        Stage::Cxx => "CXX",
    }
}

fn prefixed(prefix: &str, items: &[String]) -> Vec<String> {
    items.iter().map(|item| format!("{prefix}{item}")).collect()
}

/// Object file for a source, mirrored under the build directory.
fn object_path(source: &str) -> String {
    let stripped = NormalizedPath::new(source).strip_parent_components();
    let stem = match stripped.as_str().rfind('.') {
        Some(idx) if !stripped.as_str()[idx..].contains('/') => &stripped.as_str()[..idx],
        _ => stripped.as_str(),
    };
    format!("$(BUILD_DIR)/{stem}.o")
}

/// A string list stored under `misc.<key>`.
fn misc_list(export: &ExportDictionary, key: &str) -> Vec<String> {
    match export.misc.get(key) {
        Some(serde_yaml::Value::Sequence(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        Some(serde_yaml::Value::String(item)) => vec![item.clone()],
        _ => Vec::new(),
    }
}
