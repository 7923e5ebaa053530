//! Root document schema - loaded from `projects.yaml`
//!
//! ```yaml
//! properties:
//!   board: k64f
//! projects:
//!   blinky:
//!     favor: { cpu: m4 }
//!     properties: { led: red }
//! workspaces:
//!   demos:
//!     projects: [blinky]
//! settings:
//!   export_dir: [generated/{tool}/{project_name}]
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use super::{nullable, one_or_many};
use crate::{Error, Result};

/// The root document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WorkspaceDocument {
    /// Project records keyed by project directory name.
    #[serde(default, deserialize_with = "nullable")]
    pub projects: BTreeMap<String, Option<Mapping>>,
    #[serde(default, deserialize_with = "nullable")]
    pub workspaces: BTreeMap<String, WorkspaceEntry>,
    #[serde(default, deserialize_with = "nullable")]
    pub settings: SettingsSection,
    #[serde(default, deserialize_with = "nullable")]
    pub properties: Mapping,
}

impl WorkspaceDocument {
    pub fn from_value(value: Value) -> Result<Self> {
        serde_yaml::from_value(value).map_err(|e| Error::invalid("root document", e))
    }

    pub fn has_project(&self, name: &str) -> bool {
        self.projects.contains_key(name)
    }

    /// A project's record; an empty record stands in for `name:`.
    pub fn record(&self, name: &str) -> Option<Mapping> {
        self.projects
            .get(name)
            .map(|record| record.clone().unwrap_or_default())
    }

    /// Project names in sorted order.
    pub fn project_names(&self) -> impl Iterator<Item = &str> {
        self.projects.keys().map(String::as_str)
    }

    /// The sorted project list of a workspace.
    pub fn workspace_projects(&self, name: &str) -> Option<Vec<String>> {
        self.workspaces.get(name).map(|ws| {
            let mut projects = ws.projects.clone();
            projects.sort();
            projects.dedup();
            projects
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WorkspaceEntry {
    #[serde(default, deserialize_with = "one_or_many")]
    pub projects: Vec<String>,
}

/// How a project is instantiated: favor selections and record properties.
///
/// Records come from the root document or from a parent's `required` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectRecord {
    #[serde(default, alias = "favors", deserialize_with = "nullable")]
    pub favor: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "nullable")]
    pub properties: Mapping,
}

impl ProjectRecord {
    pub fn from_mapping(record: &Mapping, project: &str) -> Result<Self> {
        serde_yaml::from_value(Value::Mapping(record.clone()))
            .map_err(|e| Error::invalid(format!("record of project '{project}'"), e))
    }
}

/// The `settings` section of the root document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SettingsSection {
    /// Location format; only the first entry of a list is used.
    #[serde(default, deserialize_with = "one_or_many")]
    pub export_dir: Vec<String>,
    #[serde(default)]
    pub root: Option<String>,
    #[serde(default)]
    pub portable_dir: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub tools: BTreeMap<String, ToolSetting>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSetting {
    #[serde(default)]
    pub path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_root_document() {
        let doc = WorkspaceDocument::from_value(
            serde_yaml::from_str(
                r#"
projects:
  project_1:
    favor: {dim_1: favor_1_2}
    properties: {prop_1: override_1}
  project_2:
workspaces:
  all:
    projects: [project_2, project_1]
settings:
  export_dir: ['projects/{tool}_{target}/{project_name}']
  tools:
    gcc: {path: /opt/gcc/bin/}
"#,
            )
            .unwrap(),
        )
        .unwrap();

        assert_eq!(doc.project_names().collect::<Vec<_>>(), vec!["project_1", "project_2"]);
        assert!(doc.record("project_2").unwrap().is_empty());
        assert_eq!(
            doc.workspace_projects("all").unwrap(),
            vec!["project_1".to_string(), "project_2".to_string()]
        );
        assert_eq!(doc.settings.export_dir, vec!["projects/{tool}_{target}/{project_name}"]);
        assert_eq!(doc.settings.tools["gcc"].path.as_deref(), Some("/opt/gcc/bin/"));

        let record = ProjectRecord::from_mapping(&doc.record("project_1").unwrap(), "project_1").unwrap();
        assert_eq!(record.favor["dim_1"], "favor_1_2");
    }

    #[test]
    fn record_accepts_favors_alias() {
        let map: Mapping = serde_yaml::from_str("favors: {cpu: m4}").unwrap();
        let record = ProjectRecord::from_mapping(&map, "p").unwrap();
        assert_eq!(record.favor["cpu"], "m4");
    }
}
