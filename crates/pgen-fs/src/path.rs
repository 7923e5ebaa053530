//! Normalized path handling for cross-platform compatibility

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// A path normalized to use forward slashes internally.
///
/// Generated project files reference sources with forward slashes on every
/// platform, so all path arithmetic happens on this representation and the
/// native form is produced only at I/O boundaries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    ///
    /// Converts backslashes to forward slashes for internal storage.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        Self {
            inner: path_str.replace('\\', "/"),
        }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Whether the path is rooted (`/x` or `C:/x`).
    pub fn is_absolute(&self) -> bool {
        !split_root(&self.inner).0.is_empty()
    }

    /// Join this path with a segment and normalize the result.
    ///
    /// An absolute segment replaces the base, as with [`PathBuf::push`].
    pub fn join(&self, segment: impl AsRef<str>) -> Self {
        let segment = segment.as_ref().replace('\\', "/");
        if !split_root(&segment).0.is_empty() {
            return Self {
                inner: clean_str(&segment),
            };
        }
        Self {
            inner: clean_str(&format!("{}/{}", self.inner, segment)),
        }
    }

    /// Lexically normalize the path: collapse `.`, `..` and repeated slashes.
    ///
    /// Leading `..` components of relative paths are kept. An empty result
    /// becomes `.`.
    pub fn clean(&self) -> Self {
        Self {
            inner: clean_str(&self.inner),
        }
    }

    /// Iterate over the path components, skipping empty and `.` segments.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        let (root, rest) = split_root(&self.inner);
        let drive = root.strip_suffix('/').filter(|r| !r.is_empty());
        drive
            .into_iter()
            .chain(rest.split('/').filter(|c| !c.is_empty() && *c != "."))
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        let cleaned = clean_str(&self.inner);
        if cleaned == "." || cleaned == "/" {
            return None;
        }
        match cleaned.rfind('/') {
            Some(0) => Some(Self {
                inner: "/".to_string(),
            }),
            Some(idx) => Some(Self {
                inner: cleaned[..idx].to_string(),
            }),
            None => Some(Self {
                inner: ".".to_string(),
            }),
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.inner.trim_end_matches('/');
        trimmed.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 {
                None
            } else {
                Some(&name[idx + 1..])
            }
        })
    }

    /// Check if this path exists on the filesystem.
    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.to_native().is_dir()
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }

    /// Drop the root and any leading `..` components.
    ///
    /// Used to place a referenced file inside an output tree, so the result
    /// never escapes the directory it is joined onto.
    pub fn strip_parent_components(&self) -> Self {
        let cleaned = self.clean();
        let (_, rest) = split_root(cleaned.as_str());
        let kept: Vec<&str> = rest
            .split('/')
            .filter(|c| !c.is_empty() && *c != ".")
            .skip_while(|c| *c == "..")
            .collect();
        if kept.is_empty() {
            Self::new(".")
        } else {
            Self::new(kept.join("/"))
        }
    }

    /// Express this path relative to `base`, lexically.
    ///
    /// Both paths must be of the same kind (both absolute, or both relative
    /// to the same directory without escaping it); otherwise the cleaned
    /// path is returned unchanged.
    pub fn relative_to(&self, base: &NormalizedPath) -> NormalizedPath {
        let target = self.clean();
        let base = base.clean();
        if target.is_absolute() != base.is_absolute() {
            return target;
        }

        let target_parts: Vec<&str> = target.components().collect();
        let base_parts: Vec<&str> = base.components().collect();
        let common = target_parts
            .iter()
            .zip(&base_parts)
            .take_while(|(a, b)| a == b)
            .count();

        let mut parts = vec![".."; base_parts.len() - common];
        parts.extend(&target_parts[common..]);
        if parts.is_empty() {
            NormalizedPath::new(".")
        } else {
            NormalizedPath::new(parts.join("/"))
        }
    }

    /// Resolve against the current working directory if relative.
    pub fn absolutize(&self) -> Result<NormalizedPath> {
        if self.is_absolute() {
            return Ok(self.clean());
        }
        let cwd = std::env::current_dir().map_err(|e| Error::io(".", e))?;
        Ok(NormalizedPath::new(cwd).join(self.as_str()))
    }
}

/// Split a forward-slash path into its root (`/`, `C:/`, `C:` or empty) and the rest.
fn split_root(path: &str) -> (&str, &str) {
    if let Some(rest) = path.strip_prefix('/') {
        return (&path[..1], rest);
    }
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        if bytes.len() >= 3 && bytes[2] == b'/' {
            return (&path[..3], &path[3..]);
        }
        return (&path[..2], &path[2..]);
    }
    ("", path)
}

fn clean_str(path: &str) -> String {
    let path = path.replace('\\', "/");
    let (root, rest) = split_root(&path);

    let mut parts: Vec<&str> = Vec::new();
    for component in rest.split('/') {
        match component {
            "" | "." => {}
            ".." => match parts.last() {
                Some(last) if *last != ".." => {
                    parts.pop();
                }
                _ if root.is_empty() => parts.push(".."),
                // `..` above a root stays at the root
                _ => {}
            },
            other => parts.push(other),
        }
    }

    let body = parts.join("/");
    if root.is_empty() && body.is_empty() {
        ".".to_string()
    } else {
        format!("{root}{body}")
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}
