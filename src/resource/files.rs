use camino::{Utf8Path, Utf8PathBuf};

use crate::error::Error;

/// An explicit list of files under a declared root.
///
/// Construction validates every member stays inside the root; membership of
/// `get` is exactly the declared key set.
#[derive(Debug)]
pub(crate) struct FileListSet {
    pub(crate) root: Utf8PathBuf,
    paths: Vec<String>,
}

impl FileListSet {
    pub(crate) fn new(root: Utf8PathBuf, specs: Vec<String>) -> Result<Self, Error> {
        let mut paths = Vec::with_capacity(specs.len());
        for spec in specs {
            if spec.is_empty() {
                return Err(Error::Configuration("file path cannot be empty".into()));
            }
            let rel = relativize(&root, &spec)?;
            if !paths.contains(&rel) {
                paths.push(rel);
            }
        }
        Ok(Self { root, paths })
    }

    pub(crate) fn contains(&self, path: &str) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    pub(crate) fn paths(&self) -> &[String] {
        &self.paths
    }
}

/// Accepts either a root-relative path or an absolute path under the root,
/// and yields the root-relative form. Escaping the root is a configuration
/// error, not a runtime resource error.
fn relativize(root: &Utf8Path, spec: &str) -> Result<String, Error> {
    let path = Utf8Path::new(spec);
    let rel = if path.is_absolute() {
        path.strip_prefix(root)
            .map_err(|_| {
                Error::Configuration(format!("file '{spec}' is not under root directory '{root}'"))
            })?
            .to_owned()
    } else {
        path.to_owned()
    };

    if rel.components().any(|c| c.as_str() == "..") {
        return Err(Error::Configuration(format!(
            "file '{spec}' is not under root directory '{root}'"
        )));
    }
    Ok(rel.as_str().to_string())
}
