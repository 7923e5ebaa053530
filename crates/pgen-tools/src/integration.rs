//! ToolIntegration trait for rendering project files

use std::collections::BTreeMap;

use pgen_fs::{NormalizedPath, io};
use pgen_meta::{ExportDictionary, Settings};

use crate::error::Result;

/// Manifest of what a tool wrote for one project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedProject {
    /// Directory holding the generated files.
    pub path: NormalizedPath,
    /// Generated files keyed by role (e.g. `makefile`, `proj_file`).
    pub files: BTreeMap<String, NormalizedPath>,
}

impl GeneratedProject {
    pub fn new(path: NormalizedPath) -> Self {
        Self {
            path,
            files: BTreeMap::new(),
        }
    }

    /// Write `content` to `file_name` inside the output directory and record
    /// it under `role`.
    pub fn write(&mut self, role: &str, file_name: &str, content: &str) -> Result<()> {
        let target = self.path.join(file_name);
        io::write_text(&target, content)?;
        tracing::debug!(file = %target, role, "Wrote generated file");
        self.files.insert(role.to_string(), target);
        Ok(())
    }
}

/// Trait for tool integrations
pub trait ToolIntegration {
    /// Canonical tool name (e.g. `gcc_arm`); used for the `{tool}` token of
    /// output locations.
    fn name(&self) -> &str;

    /// Toolchain the tool drives (e.g. `gcc_arm`).
    fn toolchain(&self) -> &str;

    /// Names a declaration's `tool_specific` section may use for this tool.
    fn toolnames(&self) -> Vec<&str> {
        vec![self.name()]
    }

    /// The keyword set selecting `tool_specific` overlays: the toolchain
    /// followed by the tool names, without duplicates.
    fn keywords(&self) -> Vec<String> {
        let mut keywords = vec![self.toolchain().to_string()];
        for name in self.toolnames() {
            if !keywords.iter().any(|k| k == name) {
                keywords.push(name.to_string());
            }
        }
        keywords
    }

    /// Render the project files for an export.
    fn export_project(&self, export: &ExportDictionary, settings: &Settings) -> Result<GeneratedProject>;

    /// Build a previously generated project.
    fn build_project(&self, generated: &GeneratedProject, settings: &Settings) -> Result<()>;
}
