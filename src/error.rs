use std::io;

use thiserror::Error;

/// The broad category of a failure, usable for host-side dispatch without
/// matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// The requested resource is absent from its set, or a remote origin
    /// answered 404.
    NotFound,
    /// Local permission failure, or a remote origin answered 401/403.
    AccessDenied,
    /// Any other I/O or network failure.
    Access,
    /// Invalid static configuration, detected before any I/O begins.
    Configuration,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("failed to access '{path}'")]
    Access {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl Error {
    pub fn kind(&self) -> Kind {
        match self {
            Error::NotFound(..) => Kind::NotFound,
            Error::AccessDenied(..) => Kind::AccessDenied,
            Error::Access { .. } => Kind::Access,
            Error::Configuration(..) => Kind::Configuration,
        }
    }

    pub(crate) fn access(path: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Error::Access {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Maps an I/O failure to the error taxonomy, preserving the cause.
    pub(crate) fn from_io(path: impl Into<String>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound => Error::NotFound(path),
            io::ErrorKind::PermissionDenied => Error::AccessDenied(path),
            _ => Error::access(path, source),
        }
    }
}
