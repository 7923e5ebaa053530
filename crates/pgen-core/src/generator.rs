//! Workspace generator: iterates the root document and drives the builder

use pgen_fs::{ConfigStore, NormalizedPath};
use pgen_meta::{Settings, WorkspaceDocument};
use pgen_tools::ToolIntegration;
use serde_yaml::{Mapping, Value};

use crate::builder::ModelBuilder;
use crate::error::{Error, Result};
use crate::merge::eliminate_none;
use crate::project::Project;
use crate::properties::PropertyScope;

/// Default root document name.
pub const DEFAULT_PROJECTS_FILE: &str = "projects.yaml";

/// A loaded root document together with the settings it defines.
#[derive(Debug)]
pub struct Generator {
    path: NormalizedPath,
    workspace_dir: NormalizedPath,
    document: WorkspaceDocument,
    settings: Settings,
    scope: PropertyScope,
}

impl Generator {
    /// Load a root document. Its `${..}` placeholders are resolved against
    /// its own `properties` before the document is validated.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = NormalizedPath::new(path.as_ref()).absolutize()?;
        if !path.is_file() {
            return Err(Error::MissingWorkspaceFile { path: path.to_native() });
        }

        let raw = eliminate_none(&ConfigStore::new().load_value(&path)?);
        let mut body = match raw {
            Value::Mapping(map) => map,
            Value::Null => Mapping::new(),
            _ => {
                return Err(Error::InvalidDeclaration {
                    project: path.to_string(),
                    message: "root document must be a mapping".to_string(),
                });
            }
        };
        let properties = match body.remove("properties") {
            Some(Value::Mapping(map)) => map,
            _ => Mapping::new(),
        };
        let scope = PropertyScope::root(&properties);
        let mut substituted = scope
            .substitute(&Value::Mapping(body), path.as_str())?
            .as_mapping()
            .cloned()
            .unwrap_or_default();
        substituted.insert(Value::String("properties".into()), Value::Mapping(properties));

        let document = WorkspaceDocument::from_value(Value::Mapping(substituted))?;
        let mut settings = Settings::default();
        settings.update(&document.settings);

        let workspace_dir = path.parent().unwrap_or_else(|| NormalizedPath::new("."));
        tracing::debug!(
            file = %path,
            projects = document.projects.len(),
            workspaces = document.workspaces.len(),
            "Loaded root document"
        );
        Ok(Self {
            path,
            workspace_dir,
            document,
            settings,
            scope,
        })
    }

    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    /// Directory holding the root document; project directories live here.
    pub fn workspace_dir(&self) -> &NormalizedPath {
        &self.workspace_dir
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn document(&self) -> &WorkspaceDocument {
        &self.document
    }

    /// Project names a request expands to, in sorted order: every project
    /// when `name` is `None`, the project itself, or the members of a
    /// workspace. Unknown names are logged and expand to nothing.
    pub fn targets(&self, name: Option<&str>) -> Vec<String> {
        match name {
            None => self.document.project_names().map(str::to_string).collect(),
            Some(name) if self.document.has_project(name) => vec![name.to_string()],
            Some(name) => match self.document.workspace_projects(name) {
                Some(projects) => projects,
                None => {
                    tracing::error!(name, file = %self.path, "No such project or workspace");
                    Vec::new()
                }
            },
        }
    }

    /// Resolve the requested projects for one tool. Each target yields
    /// itself followed by its buildable sub-projects.
    pub fn generate(&self, name: Option<&str>, tool: &dyn ToolIntegration) -> Result<Vec<Project>> {
        let keywords = tool.keywords();
        let builder = ModelBuilder::new(
            &self.workspace_dir,
            &self.settings,
            tool.name(),
            &keywords,
            &self.scope,
        );

        let mut projects = Vec::new();
        for target in self.targets(name) {
            let Some(record) = self.document.record(&target) else {
                tracing::error!(project = %target, "Workspace member is not a declared project");
                continue;
            };
            tracing::debug!(project = %target, tool = tool.name(), "Resolving project");
            let resolved = builder.build(&target, &record)?;
            projects.extend(
                resolved
                    .buildable()
                    .into_iter()
                    .map(|model| Project::new(model.clone(), tool.name(), self.settings.clone())),
            );
        }
        Ok(projects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgen_test_utils::TestWorkspace;
    use pgen_tools::MakefileGccArm;
    use pretty_assertions::assert_eq;

    fn workspace() -> TestWorkspace {
        let ws = TestWorkspace::new();
        ws.write_projects(
            r#"
properties:
  out: build_out
projects:
  zeta:
  alpha:
    properties: {led: red}
workspaces:
  demos:
    projects: [zeta, alpha]
settings:
  export_dir: ["${out}/{tool}/{project_name}"]
"#,
        );
        ws.write_module("alpha", "type: exe\n");
        ws.write_module("zeta", "type: exe\n");
        ws
    }

    #[test]
    fn missing_root_document() {
        let ws = TestWorkspace::new();
        let err = Generator::open(ws.projects_file()).unwrap_err();
        assert!(matches!(err, Error::MissingWorkspaceFile { .. }));
    }

    #[test]
    fn root_document_properties_are_substituted() {
        let ws = workspace();
        let generator = Generator::open(ws.projects_file()).unwrap();
        assert_eq!(
            generator.settings().export_location_format,
            "build_out/{tool}/{project_name}"
        );
        assert_eq!(generator.workspace_dir().as_str(), NormalizedPath::new(ws.root()).as_str());
    }

    #[test]
    fn targets_expand_projects_and_workspaces() {
        let ws = workspace();
        let generator = Generator::open(ws.projects_file()).unwrap();
        assert_eq!(generator.targets(None), vec!["alpha", "zeta"]);
        assert_eq!(generator.targets(Some("zeta")), vec!["zeta"]);
        assert_eq!(generator.targets(Some("demos")), vec!["alpha", "zeta"]);
        assert!(generator.targets(Some("missing")).is_empty());
    }

    #[test]
    fn generate_unknown_name_yields_nothing() {
        let ws = workspace();
        let generator = Generator::open(ws.projects_file()).unwrap();
        let projects = generator.generate(Some("missing"), &MakefileGccArm::new()).unwrap();
        assert!(projects.is_empty());
    }

    #[test]
    fn generate_uses_formatted_location() {
        let ws = workspace();
        let generator = Generator::open(ws.projects_file()).unwrap();
        let projects = generator.generate(Some("alpha"), &MakefileGccArm::new()).unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].model().location.as_str(), "build_out/gcc_arm/alpha");
    }
}
