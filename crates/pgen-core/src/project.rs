//! A resolved project bound to one tool

use pgen_fs::{NormalizedPath, io};
use pgen_meta::{ExportDictionary, Settings};
use pgen_tools::{GeneratedProject, ToolIntegration};
use tracing::Level;

use crate::error::Result;
use crate::export::assemble_with_plan;
use crate::model::ProjectModel;

#[derive(Debug, Clone)]
pub struct Project {
    model: ProjectModel,
    tool: String,
    settings: Settings,
}

impl Project {
    pub fn new(model: ProjectModel, tool: impl Into<String>, settings: Settings) -> Self {
        Self {
            model,
            tool: tool.into(),
            settings,
        }
    }

    pub fn name(&self) -> &str {
        &self.model.name
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn model(&self) -> &ProjectModel {
        &self.model
    }

    pub fn output_dir(&self) -> &NormalizedPath {
        &self.model.output
    }

    /// The export dictionary, without touching the filesystem.
    pub fn export(&self) -> Result<ExportDictionary> {
        Ok(assemble_with_plan(&self.model, &self.tool, false)?.0)
    }

    /// Render the project files. With `copy`, the output directory is first
    /// recreated and filled with every referenced file.
    pub fn generate(&self, integration: &dyn ToolIntegration, copy: bool) -> Result<GeneratedProject> {
        let (export, plan) = assemble_with_plan(&self.model, &self.tool, copy)?;
        if let Some(plan) = plan {
            plan.execute()?;
        }
        if tracing::enabled!(Level::DEBUG) {
            match serde_yaml::to_string(&export) {
                Ok(dump) => tracing::debug!(project = %self.model.name, tool = %self.tool, "Export dictionary:\n{dump}"),
                Err(e) => tracing::debug!(error = %e, "Could not serialize export dictionary"),
            }
        }

        let generated = integration.export_project(&export, &self.settings)?;
        tracing::debug!(project = %self.model.name, tool = %self.tool, files = generated.files.len(), "Export rendered");
        Ok(generated)
    }

    /// Generate, then run the tool's build.
    pub fn build(&self, integration: &dyn ToolIntegration, copy: bool) -> Result<GeneratedProject> {
        let generated = self.generate(integration, copy)?;
        integration.build_project(&generated, &self.settings)?;
        tracing::info!(project = %self.model.name, tool = %self.tool, "Build finished");
        Ok(generated)
    }

    /// Remove the output directory. Returns whether anything was removed.
    pub fn clean(&self) -> Result<bool> {
        let removed = io::remove_dir_if_exists(&self.model.output)?;
        if removed {
            tracing::info!(project = %self.model.name, path = %self.model.output, "Removed generated project");
        } else {
            tracing::debug!(project = %self.model.name, path = %self.model.output, "Nothing to clean");
        }
        Ok(removed)
    }
}
