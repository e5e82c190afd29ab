pub(crate) mod format;
#[cfg(feature = "minijinja")]
pub mod jinja;
pub mod simple;

use std::collections::HashMap;
use std::fmt;
use std::io::{BufRead, Cursor, Write};

use chrono::{DateTime, Local, Utc};

use crate::error::Error;

/// A named value visible to variable substitution.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// A point in time rendered in UTC.
    Instant(DateTime<Utc>),
    /// A point in time rendered in the local zone.
    Local(DateTime<Local>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(v) => v.fmt(f),
            Value::Int(v) => v.fmt(f),
            Value::Float(v) => v.fmt(f),
            Value::Bool(v) => v.fmt(f),
            Value::Instant(v) => v.to_rfc3339().fmt(f),
            Value::Local(v) => v.to_rfc3339().fmt(f),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Instant(v)
    }
}

impl From<DateTime<Local>> for Value {
    fn from(v: DateTime<Local>) -> Self {
        Value::Local(v)
    }
}

/// The model and options for one generation unit. A fresh context is derived
/// per template resource by merging generation-time metadata with the
/// task-level defaults.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    pub model: HashMap<String, Value>,
    pub options: HashMap<String, String>,
}

impl TemplateContext {
    pub fn new(model: HashMap<String, Value>, options: HashMap<String, String>) -> Self {
        Self { model, options }
    }

    pub fn with_model(model: HashMap<String, Value>) -> Self {
        Self {
            model,
            options: HashMap::new(),
        }
    }
}

/// Identifier and default file suffix of a template language.
///
/// Only [`Simple`](Self::Simple) has a fully specified engine in this crate;
/// `Jinja` delegates to an external engine behind the `minijinja` feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateLanguage {
    Simple,
    Jinja,
}

impl TemplateLanguage {
    pub fn id(&self) -> &'static str {
        match self {
            TemplateLanguage::Simple => "simple",
            TemplateLanguage::Jinja => "jinja",
        }
    }

    pub fn default_suffix(&self) -> &'static str {
        match self {
            TemplateLanguage::Simple => "tmpl",
            TemplateLanguage::Jinja => "jinja",
        }
    }

    pub fn from_id(id: &str) -> Result<Self, Error> {
        match id.to_ascii_lowercase().as_str() {
            "simple" => Ok(TemplateLanguage::Simple),
            "jinja" => Ok(TemplateLanguage::Jinja),
            other => Err(Error::Configuration(format!(
                "unsupported template language: {other}"
            ))),
        }
    }

    pub fn from_suffix(suffix: &str) -> Result<Self, Error> {
        match suffix.to_ascii_lowercase().as_str() {
            "tmpl" => Ok(TemplateLanguage::Simple),
            "jinja" => Ok(TemplateLanguage::Jinja),
            other => Err(Error::Configuration(format!(
                "unsupported template suffix: {other}"
            ))),
        }
    }
}

/// A pluggable template backend.
///
/// `process` must fully consume the reader and flush the writer on every exit
/// path, normal or failing, before propagating an error.
pub trait TemplateProcessor {
    fn language(&self) -> TemplateLanguage;

    fn process(
        &self,
        context: &TemplateContext,
        template: &mut dyn BufRead,
        output: &mut dyn Write,
    ) -> Result<(), Error>;

    /// Convenience wrapper processing an in-memory template to a string.
    fn process_str(&self, context: &TemplateContext, template: &str) -> Result<String, Error> {
        let mut output = Vec::new();
        self.process(context, &mut Cursor::new(template.as_bytes()), &mut output)?;
        Ok(String::from_utf8_lossy(&output).into_owned())
    }
}
