use camino::Utf8PathBuf;

/// A search-path bundle: an ordered list of base directories probed in order
/// for each declared relative path. This is the local analog of a
/// classpath-style resource bundle; every entry that resolves maps to a
/// physical file and is therefore always trackable.
#[derive(Debug)]
pub(crate) struct BundleSet {
    bases: Vec<Utf8PathBuf>,
    paths: Vec<String>,
}

impl BundleSet {
    pub(crate) fn new(bases: Vec<Utf8PathBuf>, paths: Vec<String>) -> Self {
        Self { bases, paths }
    }

    /// Resolves a relative path against the first base that contains it.
    pub(crate) fn resolve(&self, path: &str) -> Option<Utf8PathBuf> {
        self.bases
            .iter()
            .map(|base| base.join(path))
            .find(|candidate| candidate.is_file())
    }

    pub(crate) fn paths(&self) -> &[String] {
        &self.paths
    }
}
