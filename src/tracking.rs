//! Incremental build support.
//!
//! The library is not a file watcher: the host supplies a list of changes
//! observed since the last successful run, and each [`ResourceSet`] answers
//! which of its resources are affected. Resources without a physical-file
//! mapping cannot be observed directly, so any trackable change conservatively
//! re-processes all of them.

use std::collections::HashSet;

use camino::{Utf8Path, Utf8PathBuf};

use crate::resource::{Resource, ResourceSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

/// One entry of the host-supplied change list.
#[derive(Debug, Clone)]
pub struct FileChange {
    pub path: Utf8PathBuf,
    pub kind: ChangeKind,
}

impl FileChange {
    pub fn new(path: impl Into<Utf8PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

impl ResourceSet {
    /// `true` iff every member resource maps to a physical local file.
    ///
    /// Directory and file-list sets always do; string sets never do; bundle
    /// sets only when every declared entry resolves against a base; URI sets
    /// only when every member resolves to a `file:` URI.
    pub fn fully_trackable(&self) -> bool {
        if self.is_strings() {
            return false;
        }
        if self.local_root().is_some() {
            return true;
        }
        self.iter().all(|r| r.physical_file().is_some())
    }

    /// The physical files a file-watching host should observe on behalf of
    /// this set. Bundle entries are declared separately through
    /// [`bundle_entries`](Self::bundle_entries).
    pub fn source_files(&self) -> Vec<Utf8PathBuf> {
        if self.is_bundle() {
            return Vec::new();
        }
        self.iter().filter_map(|r| r.physical_file()).collect()
    }

    /// The resolved bundle entries backing a search-path set, for hosts that
    /// track bundle/classpath inputs with dedicated semantics.
    pub fn bundle_entries(&self) -> Vec<Utf8PathBuf> {
        if !self.is_bundle() {
            return Vec::new();
        }
        self.iter().filter_map(|r| r.physical_file()).collect()
    }

    /// Computes the resources affected by the given change list.
    ///
    /// Deletions are excluded from consideration. Filesystem-backed sets map
    /// changed files directly back to member resources; sets with mixed
    /// origins return every resource whose physical file changed plus,
    /// unconditionally, every resource with no physical mapping. A set with
    /// no tracking information at all treats everything as changed.
    pub fn changed(&self, changes: &[FileChange]) -> Vec<Resource<'_>> {
        if self.is_strings() {
            return self.iter().collect();
        }

        if let Some(root) = self.local_root() {
            return changes
                .iter()
                .filter(|c| c.kind != ChangeKind::Removed)
                .filter_map(|c| c.path.strip_prefix(root).ok())
                .filter_map(|rel| self.get(rel.as_str()).ok())
                .collect();
        }

        let changed: HashSet<&Utf8Path> = changes
            .iter()
            .filter(|c| c.kind != ChangeKind::Removed)
            .map(|c| c.path.as_path())
            .collect();

        self.iter()
            .filter(|resource| match resource.physical_file() {
                Some(file) => changed.contains(file.as_path()),
                None => true,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn utf8(dir: &tempfile::TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn string_sets_are_never_trackable() {
        let set = ResourceSet::from_string("data");
        assert!(!set.fully_trackable());
        assert!(set.source_files().is_empty());

        // No tracking information: the full iterator is the changed set.
        let changed = set.changed(&[]);
        assert_eq!(changed.len(), 1);
    }

    #[test]
    fn filesystem_sets_are_fully_trackable() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8(&dir);
        fs::write(root.join("a.tmpl"), "a").unwrap();

        let set = ResourceSet::directory(root.clone(), ["**/*.tmpl"], Vec::<&str>::new()).unwrap();
        assert!(set.fully_trackable());
        assert_eq!(set.source_files(), vec![root.join("a.tmpl")]);
    }

    #[test]
    fn uri_set_trackable_only_when_all_members_are_files() {
        let local = ResourceSet::uris("file:///opt/t/", ["a.tmpl", "b.tmpl"]).unwrap();
        assert!(local.fully_trackable());

        let mixed = ResourceSet::uris("https://example.com/t/", ["a.tmpl"]).unwrap();
        assert!(!mixed.fully_trackable());
    }

    #[test]
    fn directory_changes_map_to_member_resources() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8(&dir);
        fs::write(root.join("a.tmpl"), "a").unwrap();
        fs::write(root.join("b.tmpl"), "b").unwrap();
        fs::write(root.join("c.txt"), "c").unwrap();

        let set = ResourceSet::directory(root.clone(), ["**/*.tmpl"], Vec::<&str>::new()).unwrap();
        let changes = [
            FileChange::new(root.join("a.tmpl"), ChangeKind::Modified),
            // Not a member: filtered out, not an error.
            FileChange::new(root.join("c.txt"), ChangeKind::Modified),
            // Removed entries are excluded from consideration.
            FileChange::new(root.join("b.tmpl"), ChangeKind::Removed),
        ];

        let changed: Vec<_> = set
            .changed(&changes)
            .iter()
            .map(|r| r.relative_path().to_string())
            .collect();
        assert_eq!(changed, vec!["a.tmpl"]);
    }

    #[test]
    fn untrackable_resources_are_always_considered_changed() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8(&dir);
        fs::write(root.join("a.tmpl"), "a").unwrap();

        // One member with a physical mapping, one without.
        let set = ResourceSet::bundle([root.clone()], ["a.tmpl", "unresolved.tmpl"]);
        assert!(!set.fully_trackable());

        let changes = [FileChange::new(root.join("a.tmpl"), ChangeKind::Modified)];
        let changed: Vec<_> = set
            .changed(&changes)
            .iter()
            .map(|r| r.relative_path().to_string())
            .collect();
        assert_eq!(changed, vec!["a.tmpl", "unresolved.tmpl"]);

        // With no physical change at all, the untrackable member still
        // comes back.
        let changed: Vec<_> = set
            .changed(&[])
            .iter()
            .map(|r| r.relative_path().to_string())
            .collect();
        assert_eq!(changed, vec!["unresolved.tmpl"]);
    }

    #[test]
    fn bundle_entries_reported_separately() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8(&dir);
        fs::write(root.join("x.tmpl"), "x").unwrap();

        let set = ResourceSet::bundle([root.clone()], ["x.tmpl"]);
        assert!(set.fully_trackable());
        assert!(set.source_files().is_empty());
        assert_eq!(set.bundle_entries(), vec![root.join("x.tmpl")]);
    }

    #[test]
    fn bundle_changed_matches_resolved_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8(&dir);
        fs::write(root.join("x.tmpl"), "x").unwrap();
        fs::write(root.join("y.tmpl"), "y").unwrap();

        let set = ResourceSet::bundle([root.clone()], ["x.tmpl", "y.tmpl"]);
        let changes = [FileChange::new(root.join("x.tmpl"), ChangeKind::Modified)];
        let changed: Vec<_> = set
            .changed(&changes)
            .iter()
            .map(|r| r.relative_path().to_string())
            .collect();
        assert_eq!(changed, vec!["x.tmpl"]);
    }
}
