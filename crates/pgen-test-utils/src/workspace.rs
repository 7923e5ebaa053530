//! [`TestWorkspace`] builder for generator test scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Name of the root document written by [`TestWorkspace::write_projects`].
pub const PROJECTS_FILE: &str = "projects.yaml";

/// A temporary workspace: a root document plus one directory per project.
///
/// # Example
///
/// ```rust,no_run
/// use pgen_test_utils::TestWorkspace;
///
/// let ws = TestWorkspace::new();
/// ws.write_projects("projects:\n  app:\n");
/// ws.write_module("app", "type: exe\nfiles:\n  sources: [main.c]\n");
/// ws.touch("app/main.c");
/// ```
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `relative` inside the workspace.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Path of the root document.
    pub fn projects_file(&self) -> PathBuf {
        self.path(PROJECTS_FILE)
    }

    /// Write `projects.yaml`.
    pub fn write_projects(&self, yaml: &str) -> PathBuf {
        self.write(PROJECTS_FILE, yaml)
    }

    /// Write `<project>/module.yaml`.
    pub fn write_module(&self, project: &str, yaml: &str) -> PathBuf {
        self.write(&format!("{project}/module.yaml"), yaml)
    }

    /// Write a file, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Create an empty file (e.g. a source the declaration lists).
    pub fn touch(&self, relative: &str) -> PathBuf {
        self.write(relative, "")
    }

    /// Read a file, panicking with its path if it cannot be read.
    pub fn read(&self, relative: &str) -> String {
        let path = self.path(relative);
        fs::read_to_string(&path).unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_exists(&self, relative: &str) {
        let path = self.path(relative);
        assert!(path.exists(), "Expected file to exist: {}", path.display());
    }

    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_not_exists(&self, relative: &str) {
        let path = self.path(relative);
        assert!(!path.exists(), "Expected file NOT to exist: {}", path.display());
    }
}
