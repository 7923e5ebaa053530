//! File classification tables and the grouped file container

use std::collections::BTreeMap;

use pgen_fs::NormalizedPath;
use serde::{Deserialize, Serialize};

/// Header extensions.
pub const INCLUDE_EXTENSIONS: &[&str] = &["h", "hpp", "inc"];
/// Assembly source extensions.
pub const ASM_EXTENSIONS: &[&str] = &["s"];
/// C source extensions.
pub const C_EXTENSIONS: &[&str] = &["c"];
/// C++ source extensions.
pub const CPP_EXTENSIONS: &[&str] = &["cpp", "cc"];
/// Prebuilt library extensions.
pub const LIB_EXTENSIONS: &[&str] = &["lib", "ar", "a"];
/// Object file extensions.
pub const OBJ_EXTENSIONS: &[&str] = &["o", "obj"];
/// Linker script extensions.
pub const LINKER_EXTENSIONS: &[&str] = &["sct", "ld", "lin", "icf"];

/// Buildable source categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    C,
    Cpp,
    Asm,
    Lib,
    Obj,
}

impl SourceKind {
    pub const ALL: [SourceKind; 5] = [
        SourceKind::C,
        SourceKind::Cpp,
        SourceKind::Asm,
        SourceKind::Lib,
        SourceKind::Obj,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::C => "c",
            SourceKind::Cpp => "cpp",
            SourceKind::Asm => "asm",
            SourceKind::Lib => "lib",
            SourceKind::Obj => "obj",
        }
    }
}

/// What a file is, judged by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Header,
    Source(SourceKind),
    LinkerScript,
}

impl FileKind {
    /// Classify a path by its (case-insensitive) extension.
    ///
    /// Returns `None` for unknown extensions; such files are intentionally
    /// left out of the build.
    pub fn classify(path: &NormalizedPath) -> Option<FileKind> {
        let ext = path.extension()?.to_lowercase();
        let ext = ext.as_str();
        if INCLUDE_EXTENSIONS.contains(&ext) {
            Some(FileKind::Header)
        } else if ASM_EXTENSIONS.contains(&ext) {
            Some(FileKind::Source(SourceKind::Asm))
        } else if C_EXTENSIONS.contains(&ext) {
            Some(FileKind::Source(SourceKind::C))
        } else if CPP_EXTENSIONS.contains(&ext) {
            Some(FileKind::Source(SourceKind::Cpp))
        } else if LIB_EXTENSIONS.contains(&ext) {
            Some(FileKind::Source(SourceKind::Lib))
        } else if OBJ_EXTENSIONS.contains(&ext) {
            Some(FileKind::Source(SourceKind::Obj))
        } else if LINKER_EXTENSIONS.contains(&ext) {
            Some(FileKind::LinkerScript)
        } else {
            None
        }
    }

    pub fn is_header(path: &NormalizedPath) -> bool {
        matches!(Self::classify(path), Some(FileKind::Header))
    }
}

/// Name of the group a bare file list lands in.
pub const DEFAULT_GROUP: &str = "default";

/// Files keyed by group name, each group an ordered list without duplicates.
///
/// Paths are stored cleaned, so `src/./a.c` and `src/a.c` are the same entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileGroups(BTreeMap<String, Vec<String>>);

impl FileGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a path to a group unless the group already holds it.
    pub fn add(&mut self, group: &str, path: &str) {
        let cleaned = NormalizedPath::new(path).clean().as_str().to_string();
        let entries = self.0.entry(group.to_string()).or_default();
        if !entries.contains(&cleaned) {
            entries.push(cleaned);
        }
    }

    /// Append several paths to a group, keeping first occurrences.
    pub fn extend<I, S>(&mut self, group: &str, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for path in paths {
            self.add(group, path.as_ref());
        }
    }

    /// Make sure a group exists, even if empty.
    pub fn ensure_group(&mut self, group: &str) {
        self.0.entry(group.to_string()).or_default();
    }

    /// Merge another container into this one, group by group.
    ///
    /// Merging the same container twice leaves the result unchanged.
    pub fn merge(&mut self, other: &FileGroups) {
        for (group, paths) in &other.0 {
            self.extend(group, paths);
        }
    }

    /// Return a copy with every path passed through `f`.
    pub fn map_paths(&self, mut f: impl FnMut(&str) -> String) -> FileGroups {
        let mut mapped = FileGroups::new();
        for (group, paths) in &self.0 {
            mapped.ensure_group(group);
            for path in paths {
                mapped.add(group, &f(path));
            }
        }
        mapped
    }

    /// Sort every group by file basename. The sort is stable, so equal
    /// basenames keep their insertion order.
    pub fn sort_by_basename(&mut self) {
        for paths in self.0.values_mut() {
            paths.sort_by(|a, b| basename(a).cmp(basename(b)));
        }
    }

    pub fn get(&self, group: &str) -> Option<&[String]> {
        self.0.get(group).map(Vec::as_slice)
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Every path across all groups, in group order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.values().flatten().map(String::as_str)
    }

    /// True when no group holds a path.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn classify_known_extensions() {
        let kind = |p: &str| FileKind::classify(&NormalizedPath::new(p));
        assert_eq!(kind("inc/a.H"), Some(FileKind::Header));
        assert_eq!(kind("startup.S"), Some(FileKind::Source(SourceKind::Asm)));
        assert_eq!(kind("main.cc"), Some(FileKind::Source(SourceKind::Cpp)));
        assert_eq!(kind("libfoo.a"), Some(FileKind::Source(SourceKind::Lib)));
        assert_eq!(kind("board.ld"), Some(FileKind::LinkerScript));
        assert_eq!(kind("README.md"), None);
        assert_eq!(kind("Makefile"), None);
    }

    #[test]
    fn add_deduplicates_cleaned_paths() {
        let mut groups = FileGroups::new();
        groups.add("default", "src/a.c");
        groups.add("default", "src/./a.c");
        groups.add("default", "src/b.c");
        assert_eq!(groups.get("default").unwrap(), &["src/a.c".to_string(), "src/b.c".to_string()]);
    }

    #[test]
    fn sort_by_basename_ignores_directories() {
        let mut groups = FileGroups::new();
        groups.extend("default", ["z/b.cpp", "y/a.cpp", "a/c.cpp"]);
        groups.sort_by_basename();
        assert_eq!(
            groups.get("default").unwrap(),
            &["y/a.cpp".to_string(), "z/b.cpp".to_string(), "a/c.cpp".to_string()]
        );
    }

    #[test]
    fn map_paths_keeps_empty_groups() {
        let mut groups = FileGroups::new();
        groups.ensure_group("empty");
        groups.add("src", "main.c");
        let mapped = groups.map_paths(|p| format!("../{p}"));
        assert_eq!(mapped.get("empty").unwrap().len(), 0);
        assert_eq!(mapped.get("src").unwrap(), &["../main.c".to_string()]);
    }
}
