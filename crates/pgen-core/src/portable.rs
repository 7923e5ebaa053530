//! Staging of portable configuration and port files
//!
//! Files go to `<workspace>/<portable_dir>/<dest>/<project>/<basename>`. The
//! first project to stage a file wins; later runs leave it untouched so
//! local edits to a staged copy survive regeneration.

use pgen_fs::{NormalizedPath, io};
use pgen_meta::{PortableSpec, Settings};

use crate::error::{Error, Result};
use crate::model::ProjectModel;

/// Stage a project's portable files and register the staged copies in its
/// file groups: configuration files as includes, port files as sources,
/// both under the group `<dest>_<project>`.
pub fn stage(
    model: &mut ProjectModel,
    spec: &PortableSpec,
    workspace_dir: &NormalizedPath,
    settings: &Settings,
) -> Result<()> {
    let dest = spec.dest.clone().unwrap_or_else(|| model.name.clone());
    let target_dir = workspace_dir
        .join(&settings.portable_dir)
        .join(&dest)
        .join(&model.name);
    let group = format!("{dest}_{}", model.name);

    for file in &spec.config {
        let staged = stage_file(model, file, &target_dir)?;
        model.includes.add(&group, &staged);
    }
    for file in &spec.port {
        let staged = stage_file(model, file, &target_dir)?;
        model.sources.add(&group, &staged);
    }
    Ok(())
}

/// Copy one file unless already staged; returns the staged path relative to
/// the project directory.
fn stage_file(model: &ProjectModel, file: &str, target_dir: &NormalizedPath) -> Result<String> {
    let source = model.basepath.join(file);
    if !source.is_file() {
        return Err(Error::PortableFileMissing {
            project: model.name.clone(),
            path: source.to_native(),
        });
    }
    let file_name = source.file_name().unwrap_or(file);
    let target = target_dir.join(file_name);

    if io::copy_if_absent(&source, &target)? {
        tracing::debug!(project = %model.name, from = %source, to = %target, "Staged portable file");
    } else {
        tracing::warn!(
            project = %model.name,
            path = %target,
            "Portable file already staged, keeping existing copy"
        );
    }
    Ok(target.relative_to(&model.basepath).as_str().to_string())
}
