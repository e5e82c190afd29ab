mod bundle;
mod directory;
mod files;
pub(crate) mod pattern;
mod remote;
mod strings;

use std::fs;
use std::io::{Cursor, Read};

use camino::Utf8PathBuf;

use crate::charset::Charset;
use crate::error::Error;
use bundle::BundleSet;
use directory::DirectorySet;
use files::FileListSet;
use remote::RemoteSet;
use strings::StringSet;

/// An iterable, addressable collection of readable resources sharing a common
/// root and default charset.
///
/// Five origins are supported: in-memory strings, glob-filtered directory
/// trees, explicit file lists, search-path bundles and remote URI lists. All
/// of them satisfy the same contract: every relative path yielded by
/// iteration resolves through [`get`](Self::get), and concatenating the root
/// URI with a relative path gives the resource's absolute identity.
///
/// Sets are constructed once per generation run and immutable afterwards.
#[derive(Debug)]
pub struct ResourceSet {
    kind: SetKind,
    charset: Charset,
}

#[derive(Debug)]
enum SetKind {
    Strings(StringSet),
    Directory(DirectorySet),
    Files(FileListSet),
    Bundle(BundleSet),
    Remote(RemoteSet),
}

impl ResourceSet {
    /// A set holding a single in-memory string under the key `index`.
    pub fn from_string(data: impl Into<String>) -> Self {
        Self::from_strings([(strings::INDEX_KEY.to_string(), data.into())])
    }

    /// A set of in-memory strings keyed by relative path, iterated in
    /// declaration order.
    pub fn from_strings<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            kind: SetKind::Strings(StringSet::new(entries)),
            charset: Charset::default(),
        }
    }

    /// A glob-filtered directory tree. Invalid patterns fail here, before any
    /// I/O happens.
    pub fn directory<I, E>(
        root: impl Into<Utf8PathBuf>,
        includes: I,
        excludes: E,
    ) -> Result<Self, Error>
    where
        I: IntoIterator<Item: Into<String>>,
        E: IntoIterator<Item: Into<String>>,
    {
        let set = DirectorySet::new(
            root.into(),
            includes.into_iter().map(Into::into).collect(),
            excludes.into_iter().map(Into::into).collect(),
        )?;
        Ok(Self {
            kind: SetKind::Directory(set),
            charset: Charset::default(),
        })
    }

    /// An explicit file list under a declared root. Members may be given
    /// root-relative or absolute; a member outside the root is a
    /// configuration error.
    pub fn files<I>(root: impl Into<Utf8PathBuf>, members: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item: Into<String>>,
    {
        let set = FileListSet::new(root.into(), members.into_iter().map(Into::into).collect())?;
        Ok(Self {
            kind: SetKind::Files(set),
            charset: Charset::default(),
        })
    }

    /// A search-path bundle: each relative path is resolved against the first
    /// base directory that contains it.
    pub fn bundle<B, I>(bases: B, members: I) -> Self
    where
        B: IntoIterator<Item: Into<Utf8PathBuf>>,
        I: IntoIterator<Item: Into<String>>,
    {
        let set = BundleSet::new(
            bases.into_iter().map(Into::into).collect(),
            members.into_iter().map(Into::into).collect(),
        );
        Self {
            kind: SetKind::Bundle(set),
            charset: Charset::default(),
        }
    }

    /// A set of URIs under a common root. The root is normalized to end with
    /// a separator; absolute members that do not share the root prefix are a
    /// configuration error.
    pub fn uris<I>(root: impl AsRef<str>, members: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item: Into<String>>,
    {
        let set = RemoteSet::new(
            root.as_ref(),
            members.into_iter().map(Into::into).collect(),
        )?;
        Ok(Self {
            kind: SetKind::Remote(set),
            charset: Charset::default(),
        })
    }

    /// Replaces the default charset used to decode member content.
    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    pub fn default_charset(&self) -> Charset {
        self.charset
    }

    /// The root identity of this set. Every resource's absolute identity is
    /// this value concatenated with its relative path.
    pub fn root_uri(&self) -> String {
        match &self.kind {
            SetKind::Strings(_) => "string:/".to_string(),
            SetKind::Directory(set) => format!("file://{}/", set.root),
            SetKind::Files(set) => format!("file://{}/", set.root),
            SetKind::Bundle(_) => "bundle:/".to_string(),
            SetKind::Remote(set) => set.root().to_string(),
        }
    }

    /// Looks up a resource by relative path, failing with
    /// [`Kind::NotFound`](crate::Kind::NotFound) when the path is outside the
    /// set's membership. URI sets perform no validation here; their absence
    /// is only detected on open.
    pub fn get(&self, path: &str) -> Result<Resource<'_>, Error> {
        let origin = match &self.kind {
            SetKind::Strings(set) => match set.get(path) {
                Some(data) => Origin::Memory { data },
                None => return Err(Error::NotFound(path.to_string())),
            },
            SetKind::Directory(set) => {
                if !set.is_member(path) {
                    return Err(Error::NotFound(format!(
                        "{path} does not match includes/excludes patterns"
                    )));
                }
                let file = set.root.join(path);
                if !file.is_file() {
                    return Err(Error::NotFound(file.to_string()));
                }
                Origin::File { file }
            }
            SetKind::Files(set) => {
                if !set.contains(path) {
                    return Err(Error::NotFound(path.to_string()));
                }
                Origin::File {
                    file: set.root.join(path),
                }
            }
            SetKind::Bundle(set) => match set.resolve(path) {
                Some(file) => Origin::Bundle { file: Some(file) },
                None => return Err(Error::NotFound(path.to_string())),
            },
            SetKind::Remote(_) => Origin::Remote,
        };
        Ok(Resource {
            set: self,
            rel: path.to_string(),
            origin,
        })
    }

    /// Same as [`get`](Self::get), but absence yields `None`.
    pub fn find(&self, path: &str) -> Option<Resource<'_>> {
        self.get(path).ok()
    }

    /// Enumerates the member resources. The sequence is finite and stable per
    /// invocation; calling again re-enumerates. Directory sets follow sorted
    /// filesystem traversal order, the list-backed sets declaration order.
    pub fn iter(&self) -> Box<dyn Iterator<Item = Resource<'_>> + '_> {
        match &self.kind {
            SetKind::Strings(set) => {
                Box::new(set.entries().iter().map(|(rel, data)| Resource {
                    set: self,
                    rel: rel.clone(),
                    origin: Origin::Memory { data },
                }))
            }
            SetKind::Directory(set) => Box::new(set.walk().into_iter().map(|rel| {
                let file = set.root.join(&rel);
                Resource {
                    set: self,
                    rel,
                    origin: Origin::File { file },
                }
            })),
            SetKind::Files(set) => Box::new(set.paths().iter().map(|rel| Resource {
                set: self,
                rel: rel.clone(),
                origin: Origin::File {
                    file: set.root.join(rel),
                },
            })),
            SetKind::Bundle(set) => Box::new(set.paths().iter().map(|rel| Resource {
                set: self,
                rel: rel.clone(),
                origin: Origin::Bundle {
                    file: set.resolve(rel),
                },
            })),
            SetKind::Remote(set) => Box::new(set.paths().iter().map(|rel| Resource {
                set: self,
                rel: rel.clone(),
                origin: Origin::Remote,
            })),
        }
    }

    pub(crate) fn remote(&self) -> Option<&RemoteSet> {
        match &self.kind {
            SetKind::Remote(set) => Some(set),
            _ => None,
        }
    }

    pub(crate) fn is_strings(&self) -> bool {
        matches!(self.kind, SetKind::Strings(_))
    }

    pub(crate) fn local_root(&self) -> Option<&camino::Utf8Path> {
        match &self.kind {
            SetKind::Directory(set) => Some(&set.root),
            SetKind::Files(set) => Some(&set.root),
            _ => None,
        }
    }

    pub(crate) fn is_bundle(&self) -> bool {
        matches!(self.kind, SetKind::Bundle(_))
    }
}

/// A single readable unit within a [`ResourceSet`].
///
/// Resources are views recreated on each lookup or iteration step; they hold
/// no state beyond their identity within the owning set.
#[derive(Debug)]
pub struct Resource<'a> {
    set: &'a ResourceSet,
    rel: String,
    origin: Origin<'a>,
}

#[derive(Debug)]
enum Origin<'a> {
    Memory { data: &'a str },
    File { file: Utf8PathBuf },
    /// `file` is the resolved base entry; a declared path no base contains
    /// stays unresolved and has no physical mapping.
    Bundle { file: Option<Utf8PathBuf> },
    Remote,
}

impl<'a> Resource<'a> {
    /// The key of this resource within its set.
    pub fn relative_path(&self) -> &str {
        &self.rel
    }

    /// The resolved identity: a filesystem path for local origins, the full
    /// URI otherwise.
    pub fn absolute_path(&self) -> String {
        match &self.origin {
            Origin::Memory { .. } => self.set.root_uri(),
            Origin::File { file } => file.to_string(),
            Origin::Bundle { .. } | Origin::Remote => self.uri(),
        }
    }

    pub fn uri(&self) -> String {
        match &self.origin {
            Origin::Memory { .. } => format!("string:/{}", self.rel),
            Origin::File { file } => format!("file://{file}"),
            Origin::Bundle { .. } => format!("bundle:/{}", self.rel),
            Origin::Remote => self.set.remote().expect("remote origin").uri(&self.rel),
        }
    }

    /// The charset this resource is declared to use. Remote origins may
    /// override it at open time through the response `Content-Type`.
    pub fn charset(&self) -> Charset {
        self.set.default_charset()
    }

    /// The local file backing this resource, when one exists. Resources
    /// without a physical mapping cannot be tracked for incremental builds.
    pub fn physical_file(&self) -> Option<Utf8PathBuf> {
        match &self.origin {
            Origin::Memory { .. } => None,
            Origin::File { file } => Some(file.clone()),
            Origin::Bundle { file } => file.clone(),
            Origin::Remote => self.set.remote().expect("remote origin").physical_file(&self.rel),
        }
    }

    /// Opens the resource for reading.
    pub fn open(&self) -> Result<ResourceReader<'a>, Error> {
        let default = self.charset();
        match &self.origin {
            Origin::Memory { data } => Ok(ResourceReader {
                inner: Box::new(Cursor::new(data.as_bytes())),
                charset: default,
            }),
            Origin::File { file } => open_file(file, default),
            Origin::Bundle { file } => match file {
                Some(file) => open_file(file, default),
                None => Err(Error::NotFound(self.uri())),
            },
            Origin::Remote => {
                let (inner, detected) = self.set.remote().expect("remote origin").open(&self.rel)?;
                Ok(ResourceReader {
                    inner,
                    charset: detected.unwrap_or(default),
                })
            }
        }
    }

    /// Reads and decodes the full content using the effective charset.
    pub fn read_to_string(&self) -> Result<String, Error> {
        let mut reader = self.open()?;
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| Error::access(self.absolute_path(), e))?;
        Ok(reader.charset().decode(&bytes))
    }
}

fn open_file<'a>(file: &Utf8PathBuf, charset: Charset) -> Result<ResourceReader<'a>, Error> {
    if !file.is_file() {
        return Err(Error::NotFound(file.to_string()));
    }
    let handle = fs::File::open(file).map_err(|e| Error::from_io(file.to_string(), e))?;
    Ok(ResourceReader {
        inner: Box::new(handle),
        charset,
    })
}

/// A byte stream over a resource plus the charset in effect for it.
pub struct ResourceReader<'a> {
    inner: Box<dyn Read + 'a>,
    charset: Charset,
}

impl ResourceReader<'_> {
    pub fn charset(&self) -> Charset {
        self.charset
    }
}

impl Read for ResourceReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}
