#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

mod charset;
mod comment;
mod error;
mod generate;
mod io;
mod resource;
mod template;
mod tracking;

pub use charset::Charset;
pub use comment::CommentStyle;
pub use error::{Error, Kind};
pub use generate::Generator;
pub use resource::{Resource, ResourceReader, ResourceSet};
#[cfg(feature = "minijinja")]
pub use template::jinja::JinjaProcessor;
pub use template::simple::SimpleTemplateProcessor;
pub use template::{TemplateContext, TemplateLanguage, TemplateProcessor, Value};
pub use tracking::{ChangeKind, FileChange};

/// Installs a `tracing` subscriber configured from `RUST_LOG`, for hosts
/// that do not bring their own. Calling it again is a no-op.
#[cfg(feature = "logging")]
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
