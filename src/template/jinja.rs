//! Jinja-syntax template backend, available behind the `minijinja` feature.

use std::collections::HashMap;
use std::io::{BufRead, Read, Write};

use minijinja::Environment;

use crate::error::Error;
use crate::template::{TemplateContext, TemplateLanguage, TemplateProcessor, Value};

/// Renders templates with [`minijinja`], exposing the context model as
/// top-level variables. Unknown variables render as empty, following the
/// engine's default semantics rather than the verbatim-token rule of the
/// simple engine.
#[derive(Debug, Default)]
pub struct JinjaProcessor;

impl JinjaProcessor {
    pub fn new() -> Self {
        Self
    }

    fn run(
        &self,
        context: &TemplateContext,
        template: &mut dyn BufRead,
        output: &mut dyn Write,
    ) -> Result<(), Error> {
        let mut source = String::new();
        template
            .read_to_string(&mut source)
            .map_err(|e| Error::access("template input", e))?;

        let mut env = Environment::new();
        env.add_template("template", &source)
            .map_err(|e| Error::access("template input", e))?;

        let model: HashMap<&str, minijinja::Value> = context
            .model
            .iter()
            .map(|(name, value)| (name.as_str(), to_engine_value(value)))
            .collect();

        let rendered = env
            .get_template("template")
            .and_then(|t| t.render(&model))
            .map_err(|e| Error::access("template input", e))?;

        output
            .write_all(rendered.as_bytes())
            .map_err(|e| Error::access("template output", e))
    }
}

fn to_engine_value(value: &Value) -> minijinja::Value {
    match value {
        Value::Str(v) => minijinja::Value::from(v.as_str()),
        Value::Int(v) => minijinja::Value::from(*v),
        Value::Float(v) => minijinja::Value::from(*v),
        Value::Bool(v) => minijinja::Value::from(*v),
        Value::Instant(v) => minijinja::Value::from(v.to_rfc3339()),
        Value::Local(v) => minijinja::Value::from(v.to_rfc3339()),
    }
}

impl TemplateProcessor for JinjaProcessor {
    fn language(&self) -> TemplateLanguage {
        TemplateLanguage::Jinja
    }

    fn process(
        &self,
        context: &TemplateContext,
        template: &mut dyn BufRead,
        output: &mut dyn Write,
    ) -> Result<(), Error> {
        let result = self.run(context, template, output);
        let flushed = output.flush();
        result?;
        flushed.map_err(|e| Error::access("template output", e))?;
        Ok(())
    }
}
