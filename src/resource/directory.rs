use camino::{Utf8Path, Utf8PathBuf};

use crate::error::Error;
use crate::resource::pattern;

/// A glob-filtered directory tree.
///
/// A path is excluded if any exclude pattern matches; otherwise it is included
/// if the include list is empty, contains the universal pattern, or any
/// include pattern matches.
#[derive(Debug)]
pub(crate) struct DirectorySet {
    pub(crate) root: Utf8PathBuf,
    includes: Vec<String>,
    excludes: Vec<String>,
}

pub(crate) const UNIVERSAL_PATTERN: &str = "**/*";

impl DirectorySet {
    pub(crate) fn new(
        root: Utf8PathBuf,
        includes: Vec<String>,
        excludes: Vec<String>,
    ) -> Result<Self, Error> {
        for pattern in includes.iter().chain(excludes.iter()) {
            pattern::compile(pattern)?;
        }
        Ok(Self {
            root,
            includes,
            excludes,
        })
    }

    pub(crate) fn is_member(&self, path: &str) -> bool {
        if self.excludes.iter().any(|p| pattern::matches(p, path)) {
            return false;
        }
        if self.includes.is_empty() || self.includes.iter().any(|p| p == UNIVERSAL_PATTERN) {
            return true;
        }
        self.includes.iter().any(|p| pattern::matches(p, path))
    }

    /// Enumerates member files as root-relative paths, in sorted traversal
    /// order so repeated iteration is stable.
    pub(crate) fn walk(&self) -> Vec<String> {
        let mut found = Vec::new();
        walk_rec(&self.root, &self.root, &mut found);
        found.retain(|rel| self.is_member(rel));
        found
    }
}

fn walk_rec(root: &Utf8Path, dir: &Utf8Path, found: &mut Vec<String>) {
    let entries = match dir.read_dir_utf8() {
        Ok(entries) => entries,
        Err(_) => return,
    };

    let mut entries: Vec<_> = entries.flatten().collect();
    entries.sort_by(|a, b| a.path().cmp(b.path()));

    for entry in entries {
        let path = entry.path();
        match entry.file_type() {
            Ok(ft) if ft.is_dir() => walk_rec(root, path, found),
            Ok(ft) if ft.is_file() => {
                if let Ok(rel) = path.strip_prefix(root) {
                    found.push(rel.as_str().to_string());
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture() -> (tempfile::TempDir, DirectorySet) {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        fs::write(root.join("a.tmpl"), "a").unwrap();
        fs::create_dir(root.join("draft")).unwrap();
        fs::write(root.join("draft/b.tmpl"), "b").unwrap();
        fs::write(root.join("c.txt"), "c").unwrap();
        let set = DirectorySet::new(
            root,
            vec!["**/*.tmpl".to_string()],
            vec!["draft/**".to_string()],
        )
        .unwrap();
        (dir, set)
    }

    #[test]
    fn include_exclude_enumeration() {
        let (_dir, set) = fixture();
        assert_eq!(set.walk(), vec!["a.tmpl".to_string()]);
    }

    #[test]
    fn membership_tests() {
        let (_dir, set) = fixture();
        assert!(set.is_member("a.tmpl"));
        assert!(!set.is_member("draft/b.tmpl"));
        assert!(!set.is_member("c.txt"));
    }

    #[test]
    fn empty_includes_accepts_everything_not_excluded() {
        let set = DirectorySet::new(
            Utf8PathBuf::from("/tmp"),
            vec![],
            vec!["draft/**".to_string()],
        )
        .unwrap();
        assert!(set.is_member("anything/goes.txt"));
        assert!(!set.is_member("draft/no.txt"));
    }

    #[test]
    fn universal_include_accepts_everything() {
        let set = DirectorySet::new(
            Utf8PathBuf::from("/tmp"),
            vec![UNIVERSAL_PATTERN.to_string(), "*.rs".to_string()],
            vec![],
        )
        .unwrap();
        assert!(set.is_member("deep/tree/file.bin"));
    }
}
