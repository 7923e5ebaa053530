//! Session driver for generate, clean and build
//!
//! Configuration errors abort the whole run. Tool failures (unknown tools,
//! renderer or build errors) are recorded per target in a [`SessionReport`]
//! and the run continues with the next target.

use std::fmt;
use std::path::Path;

use pgen_fs::NormalizedPath;
use pgen_tools::{ToolDispatcher, ToolIntegration};

use crate::error::Result;
use crate::generator::Generator;
use crate::project::Project;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Generate,
    Clean,
    Build,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Generate => "generate",
            Operation::Clean => "clean",
            Operation::Build => "build",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one operation on one (tool, project) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub tool: String,
    /// `None` when the failure happened before any project was known.
    pub project: Option<String>,
    pub success: bool,
    pub message: Option<String>,
    /// Output directory the operation worked on.
    pub output: Option<NormalizedPath>,
}

impl Outcome {
    fn ok(project: &Project, message: impl Into<String>) -> Self {
        Self {
            tool: project.tool().to_string(),
            project: Some(project.name().to_string()),
            success: true,
            message: Some(message.into()),
            output: Some(project.output_dir().clone()),
        }
    }

    fn failed(project: &Project, error: impl fmt::Display) -> Self {
        Self {
            tool: project.tool().to_string(),
            project: Some(project.name().to_string()),
            success: false,
            message: Some(error.to_string()),
            output: Some(project.output_dir().clone()),
        }
    }

    fn unknown_tool(tool: &str) -> Self {
        Self {
            tool: tool.to_string(),
            project: None,
            success: false,
            message: Some(pgen_tools::Error::UnknownTool { name: tool.to_string() }.to_string()),
            output: None,
        }
    }
}

/// Outcomes of a session operation, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub operation: Operation,
    pub outcomes: Vec<Outcome>,
}

impl SessionReport {
    fn new(operation: Operation) -> Self {
        Self {
            operation,
            outcomes: Vec::new(),
        }
    }

    /// Whether every recorded outcome succeeded.
    pub fn success(&self) -> bool {
        self.outcomes.iter().all(|o| o.success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| !o.success)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Project or workspace name; every project when `None`.
    pub project: Option<String>,
    /// Copy referenced files into the output directory (generate, build).
    pub copy: bool,
}

/// Runs operations for a set of tools against one root document.
#[derive(Debug)]
pub struct Session {
    generator: Generator,
    dispatcher: ToolDispatcher,
}

impl Session {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            generator: Generator::open(path)?,
            dispatcher: ToolDispatcher::new(),
        })
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn generate(&self, tools: &[String], options: &SessionOptions) -> Result<SessionReport> {
        self.run(Operation::Generate, tools, options)
    }

    pub fn clean(&self, tools: &[String], options: &SessionOptions) -> Result<SessionReport> {
        self.run(Operation::Clean, tools, options)
    }

    /// Generate, then build each target.
    pub fn build(&self, tools: &[String], options: &SessionOptions) -> Result<SessionReport> {
        self.run(Operation::Build, tools, options)
    }

    /// Declared project names, sorted.
    pub fn list_projects(&self) -> Vec<String> {
        self.generator.targets(None)
    }

    /// Declared workspace names with their members, sorted.
    pub fn list_workspaces(&self) -> Vec<(String, Vec<String>)> {
        let document = self.generator.document();
        document
            .workspaces
            .keys()
            .map(|name| (name.clone(), document.workspace_projects(name).unwrap_or_default()))
            .collect()
    }

    fn run(&self, operation: Operation, tools: &[String], options: &SessionOptions) -> Result<SessionReport> {
        let mut report = SessionReport::new(operation);
        for tool in tools {
            let Some(integration) = self.dispatcher.get_integration(tool) else {
                tracing::error!(tool = %tool, "Unknown tool");
                report.outcomes.push(Outcome::unknown_tool(tool));
                continue;
            };

            let projects = self
                .generator
                .generate(options.project.as_deref(), integration.as_ref())?;
            for project in &projects {
                report
                    .outcomes
                    .push(self.run_one(operation, project, integration.as_ref(), options));
            }
        }
        Ok(report)
    }

    fn run_one(
        &self,
        operation: Operation,
        project: &Project,
        integration: &dyn ToolIntegration,
        options: &SessionOptions,
    ) -> Outcome {
        let result = match operation {
            Operation::Generate => project
                .generate(integration, options.copy)
                .map(|generated| format!("generated {} file(s)", generated.files.len())),
            Operation::Build => project
                .build(integration, options.copy)
                .map(|_| "built".to_string()),
            Operation::Clean => project.clean().map(|removed| {
                let message = if removed { "removed" } else { "nothing to remove" };
                message.to_string()
            }),
        };
        match result {
            Ok(message) => Outcome::ok(project, message),
            Err(e) => {
                tracing::error!(
                    project = %project.name(),
                    tool = %project.tool(),
                    operation = %operation,
                    error = %e,
                    "Operation failed"
                );
                Outcome::failed(project, e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgen_test_utils::TestWorkspace;
    use pretty_assertions::assert_eq;

    fn workspace() -> TestWorkspace {
        let ws = TestWorkspace::new();
        ws.write_projects("projects:\n  app:\n");
        ws.write_module("app", "files:\n  sources: [main.c]\n");
        ws.touch("app/main.c");
        ws
    }

    fn tools(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn unknown_tool_is_recorded_not_raised() {
        let ws = workspace();
        let session = Session::open(ws.projects_file()).unwrap();
        let report = session
            .generate(&tools(&["iar_arm", "gcc_arm"]), &SessionOptions::default())
            .unwrap();

        assert_eq!(report.outcomes.len(), 2);
        assert!(!report.outcomes[0].success);
        assert_eq!(report.outcomes[0].project, None);
        assert!(report.outcomes[1].success);
        assert!(!report.success());
        ws.assert_exists("app/generated_projects/gcc_arm_app/Makefile");
    }

    #[test]
    fn alias_resolves_to_canonical_tool() {
        let ws = workspace();
        let session = Session::open(ws.projects_file()).unwrap();
        let report = session
            .generate(&tools(&["make_gcc_arm"]), &SessionOptions::default())
            .unwrap();
        assert!(report.success());
        assert_eq!(report.outcomes[0].tool, "gcc_arm");
    }

    #[test]
    fn eclipse_build_fails_as_outcome() {
        let ws = workspace();
        let session = Session::open(ws.projects_file()).unwrap();
        let report = session
            .build(&tools(&["gnu_mcu_eclipse"]), &SessionOptions::default())
            .unwrap();
        assert_eq!(report.failures().count(), 1);
        ws.assert_exists("app/generated_projects/gnu_mcu_eclipse_app/.project");
    }

    #[test]
    fn clean_removes_generated_output() {
        let ws = workspace();
        let session = Session::open(ws.projects_file()).unwrap();
        let gcc = tools(&["gcc_arm"]);
        session.generate(&gcc, &SessionOptions::default()).unwrap();
        let report = session.clean(&gcc, &SessionOptions::default()).unwrap();
        assert!(report.success());
        assert_eq!(report.outcomes[0].message.as_deref(), Some("removed"));
        ws.assert_not_exists("app/generated_projects/gcc_arm_app");
    }

    #[test]
    fn configuration_errors_abort() {
        let ws = TestWorkspace::new();
        ws.write_projects("projects:\n  ghost:\n");
        let session = Session::open(ws.projects_file()).unwrap();
        let err = session
            .generate(&tools(&["gcc_arm"]), &SessionOptions::default())
            .unwrap_err();
        assert!(matches!(err, crate::Error::MissingModule { .. }));
    }
}
