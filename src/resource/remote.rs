use std::fs::File;
use std::io::Read;

use camino::Utf8PathBuf;

use crate::charset::Charset;
use crate::error::Error;

/// A list of resources under a common root URI.
///
/// Membership is provisional: `get` performs no validation and absence is
/// only detected when the resource is opened. A single failed attempt
/// surfaces immediately; there is no retry or caching.
#[derive(Debug)]
pub(crate) struct RemoteSet {
    /// Normalized to end with `/` so identity is root + relative path.
    root: String,
    paths: Vec<String>,
}

impl RemoteSet {
    pub(crate) fn new(root: &str, members: Vec<String>) -> Result<Self, Error> {
        let root = if root.ends_with('/') {
            root.to_string()
        } else {
            format!("{root}/")
        };

        let mut paths = Vec::with_capacity(members.len());
        for member in members {
            if member.is_empty() {
                return Err(Error::Configuration("URI cannot be empty".into()));
            }
            let rel = if member.contains("://") {
                member
                    .strip_prefix(&root)
                    .ok_or_else(|| {
                        Error::Configuration(format!(
                            "URI '{member}' is not relative to root '{root}'"
                        ))
                    })?
                    .to_string()
            } else {
                member
            };
            if !paths.contains(&rel) {
                paths.push(rel);
            }
        }
        Ok(Self { root, paths })
    }

    pub(crate) fn root(&self) -> &str {
        &self.root
    }

    pub(crate) fn paths(&self) -> &[String] {
        &self.paths
    }

    pub(crate) fn uri(&self, path: &str) -> String {
        format!("{}{path}", self.root)
    }

    /// The backing local file, when the member resolves to a `file:` URI.
    /// Remote schemes have no physical mapping and cannot be tracked.
    pub(crate) fn physical_file(&self, path: &str) -> Option<Utf8PathBuf> {
        let uri = self.uri(path);
        uri.strip_prefix("file://").map(Utf8PathBuf::from)
    }

    /// Opens a member, returning its byte stream and the charset detected
    /// from the response `Content-Type`, if any.
    pub(crate) fn open(&self, path: &str) -> Result<(Box<dyn Read>, Option<Charset>), Error> {
        let uri = self.uri(path);

        if let Some(local) = self.physical_file(path) {
            let file = File::open(&local).map_err(|e| Error::from_io(uri, e))?;
            return Ok((Box::new(file), None));
        }

        if !uri.starts_with("http://") && !uri.starts_with("https://") {
            return Err(Error::Configuration(format!(
                "unsupported URI scheme: {uri}"
            )));
        }

        match ureq::get(&uri).call() {
            Ok(response) => {
                let charset = response
                    .header("Content-Type")
                    .and_then(Charset::from_content_type);
                Ok((Box::new(response.into_reader()), charset))
            }
            Err(ureq::Error::Status(404, _)) => Err(Error::NotFound(uri)),
            Err(ureq::Error::Status(401 | 403, _)) => Err(Error::AccessDenied(uri)),
            Err(ureq::Error::Status(code, _)) => Err(Error::access(
                uri,
                anyhow::anyhow!("HTTP status {code}"),
            )),
            Err(e) => Err(Error::access(uri, e)),
        }
    }
}
