//! Atomic writes, skip-if-exists copies and best-effort directory listing

use std::fs::{self, OpenOptions};
use std::io::Write;

use fs2::FileExt;
use walkdir::WalkDir;

use crate::{Error, NormalizedPath, Result};

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename so a renderer never leaves a half-written
/// project file behind. Parent directories are created as needed.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
    }

    // Temp file in the same directory keeps the rename on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;
    temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;

    temp_file.unlock().map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;

    fs::rename(&temp_path, &native_path).map_err(|e| Error::io(&native_path, e))?;

    Ok(())
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Write text content to a file atomically.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}

/// Copy a file, creating the destination's parent directories.
pub fn copy_file(from: &NormalizedPath, to: &NormalizedPath) -> Result<()> {
    let dest = to.to_native();
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
    }
    fs::copy(from.to_native(), &dest).map_err(|e| Error::io(from.to_native(), e))?;
    Ok(())
}

/// Copy a file unless the destination already exists.
///
/// Returns `true` when the file was copied, `false` when an earlier writer
/// already put something there.
pub fn copy_if_absent(from: &NormalizedPath, to: &NormalizedPath) -> Result<bool> {
    if to.exists() {
        tracing::debug!(dest = %to, "Destination exists, not copying");
        return Ok(false);
    }
    copy_file(from, to)?;
    Ok(true)
}

/// Remove a directory tree. Missing directories are not an error.
pub fn remove_dir_if_exists(path: &NormalizedPath) -> Result<bool> {
    let native = path.to_native();
    match fs::remove_dir_all(&native) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(native, e)),
    }
}

/// Create a directory and its parents.
pub fn ensure_dir(path: &NormalizedPath) -> Result<()> {
    let native = path.to_native();
    fs::create_dir_all(&native).map_err(|e| Error::io(native, e))
}

/// List the regular files directly inside `dir`, sorted by name.
///
/// Best effort: a missing or unreadable directory is logged at debug level
/// and yields an empty list.
pub fn list_files(dir: &NormalizedPath) -> Vec<String> {
    let entries = match fs::read_dir(dir.to_native()) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(dir = %dir, error = %e, "Unable to list directory");
            return Vec::new();
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Recursively list the regular files under `dir` as forward-slash paths
/// relative to `dir`, sorted.
///
/// Best effort in the same way as [`list_files`]: unreadable entries are
/// logged at debug level and skipped.
pub fn walk_files(dir: &NormalizedPath) -> Vec<String> {
    let root = dir.to_native();
    if !root.is_dir() {
        tracing::debug!(dir = %dir, "Not a directory, nothing to walk");
        return Vec::new();
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(&root)
        .follow_links(false)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(dir = %dir, error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(rel) = entry.path().strip_prefix(&root) {
            files.push(NormalizedPath::new(rel).as_str().to_string());
        }
    }
    files.sort();
    files
}
