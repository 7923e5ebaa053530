//! Generator settings, read from the root document's `settings` section

use std::collections::BTreeMap;
use std::sync::LazyLock;

use pgen_fs::NormalizedPath;
use regex::{Captures, Regex};

use crate::schema::SettingsSection;

/// Location format used when neither the root document nor the project
/// names one.
pub const DEFAULT_EXPORT_LOCATION_FORMAT: &str = "generated_projects/{tool}_{project_name}";

/// Default directory, relative to the workspace, for portable files.
pub const DEFAULT_PORTABLE_DIR: &str = "portable";

#[cfg(unix)]
const DEFAULT_GCC_BIN_PATH: &str = "/usr/local/arm-none-eabi/bin/";
#[cfg(not(unix))]
const DEFAULT_GCC_BIN_PATH: &str = "";

static FORMAT_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("Invalid format token regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Output location template with `{tool}` and `{project_name}` tokens.
    pub export_location_format: String,
    /// Base of the output location, relative to each project's directory.
    pub root: String,
    /// Shared staging directory for portable files, relative to the workspace.
    pub portable_dir: String,
    tool_paths: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        let mut tool_paths = BTreeMap::new();
        tool_paths.insert("gcc".to_string(), DEFAULT_GCC_BIN_PATH.to_string());
        Self {
            export_location_format: DEFAULT_EXPORT_LOCATION_FORMAT.to_string(),
            root: ".".to_string(),
            portable_dir: DEFAULT_PORTABLE_DIR.to_string(),
            tool_paths,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a root document's `settings` section.
    pub fn update(&mut self, section: &SettingsSection) {
        if let Some(format) = section.export_dir.first() {
            self.export_location_format = format.clone();
        }
        if let Some(root) = &section.root {
            self.root = root.clone();
        }
        if let Some(dir) = &section.portable_dir {
            self.portable_dir = dir.clone();
        }
        for (tool, setting) in &section.tools {
            if let Some(path) = &setting.path {
                self.tool_paths.insert(tool.clone(), path.clone());
            }
        }
    }

    /// Binary directory configured for an external tool (e.g. `gcc`).
    pub fn tool_path(&self, tool: &str) -> Option<&str> {
        self.tool_paths.get(tool).map(String::as_str)
    }

    pub fn set_tool_path(&mut self, tool: impl Into<String>, path: impl Into<String>) {
        self.tool_paths.insert(tool.into(), path.into());
    }

    pub fn uses_default_location(&self) -> bool {
        self.export_location_format == DEFAULT_EXPORT_LOCATION_FORMAT
    }

    /// The location format for a project: the global format wins unless it
    /// is the default, in which case the project's own `export_dir` is used.
    pub fn location_format<'a>(&'a self, project_export_dir: Option<&'a str>) -> &'a str {
        match project_export_dir {
            Some(dir) if self.uses_default_location() && !dir.is_empty() => dir,
            _ => &self.export_location_format,
        }
    }

    /// Output location of a project for a tool, relative to [`Settings::root`].
    pub fn location(&self, tool: &str, project_name: &str, project_export_dir: Option<&str>) -> NormalizedPath {
        let formatted = format_location(self.location_format(project_export_dir), tool, project_name);
        NormalizedPath::new(formatted).clean()
    }
}

/// Replace `{project_name}` and `{tool}`; any other token stays literal.
pub fn format_location(format: &str, tool: &str, project_name: &str) -> String {
    FORMAT_TOKEN
        .replace_all(format, |caps: &Captures<'_>| match &caps[1] {
            "project_name" => project_name.to_string(),
            "tool" => tool.to_string(),
            _ => caps[0].to_string(),
        })
        .into_owned()
}
