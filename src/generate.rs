//! The generation orchestrator tying resources, templates and output
//! together.

use std::collections::HashMap;
use std::fs;
use std::io::{BufReader, BufWriter, Cursor, Read};

use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;

use crate::charset::Charset;
use crate::comment::CommentStyle;
use crate::error::Error;
use crate::resource::{Resource, ResourceSet};
use crate::template::simple::SimpleTemplateProcessor;
use crate::template::{TemplateContext, TemplateProcessor, Value};

/// Runs one generation pass: every resource in a [`ResourceSet`] is processed
/// through a template engine and written below an output root, with the
/// template suffix stripped from the output path.
///
/// ```no_run
/// # use stencil::{Generator, ResourceSet, Value};
/// # fn main() -> Result<(), stencil::Error> {
/// let templates = ResourceSet::directory("src/templates", ["**/*.tmpl"], ["draft/**"])?;
/// Generator::new(templates, "build/generated")
///     .header("Generated file, do not edit.")
///     .model_value("name", Value::from("World"))
///     .run()?;
/// # Ok(())
/// # }
/// ```
pub struct Generator {
    resources: ResourceSet,
    output_dir: Utf8PathBuf,
    processor: Box<dyn TemplateProcessor>,
    template_suffix: Option<String>,
    header: Option<String>,
    footer: Option<String>,
    styles: HashMap<String, CommentStyle>,
    model: HashMap<String, Value>,
    task_name: String,
}

impl Generator {
    pub fn new(resources: ResourceSet, output_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            resources,
            output_dir: output_dir.into(),
            processor: Box::new(SimpleTemplateProcessor::new()),
            template_suffix: None,
            header: None,
            footer: None,
            styles: HashMap::new(),
            model: HashMap::new(),
            task_name: "generate".to_string(),
        }
    }

    /// Replaces the default simple engine.
    pub fn processor(mut self, processor: impl TemplateProcessor + 'static) -> Self {
        self.processor = Box::new(processor);
        self
    }

    /// Overrides the suffix stripped from output paths. Defaults to the
    /// processor language's suffix.
    pub fn template_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.template_suffix = Some(suffix.into());
        self
    }

    /// A banner template rendered and comment-wrapped ahead of each output.
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// A banner template rendered and comment-wrapped after each output.
    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Overrides the comment style for one output extension.
    pub fn style(mut self, extension: impl Into<String>, style: CommentStyle) -> Self {
        self.styles.insert(extension.into().to_lowercase(), style);
        self
    }

    /// Replaces the whole task model.
    pub fn model(mut self, model: HashMap<String, Value>) -> Self {
        self.model = model;
        self
    }

    /// Adds one model entry.
    pub fn model_value(mut self, name: impl Into<String>, value: Value) -> Self {
        self.model.insert(name.into(), value);
        self
    }

    /// Declares the charset used to decode template content.
    pub fn charset(mut self, charset: Charset) -> Self {
        self.resources = self.resources.with_charset(charset);
        self
    }

    /// Names this generation run in metadata and logs.
    pub fn task_name(mut self, name: impl Into<String>) -> Self {
        self.task_name = name.into();
        self
    }

    /// Processes every resource, aborting on the first failure. Returns the
    /// generated output paths in processing order.
    pub fn run(&self) -> Result<Vec<Utf8PathBuf>, Error> {
        let suffix = match &self.template_suffix {
            Some(suffix) => suffix.clone(),
            None => self.processor.language().default_suffix().to_string(),
        };

        tracing::info!(
            task = %self.task_name,
            root = %self.resources.root_uri(),
            output = %self.output_dir,
            "generating from templates"
        );

        let mut generated = Vec::new();
        for resource in self.resources.iter() {
            let relative = strip_template_suffix(resource.relative_path(), &suffix);
            let output_path = self.output_dir.join(relative);
            self.process_resource(&resource, &output_path)?;
            generated.push(output_path);
        }

        tracing::info!(task = %self.task_name, count = generated.len(), "generation complete");
        Ok(generated)
    }

    fn process_resource(&self, resource: &Resource<'_>, output_path: &Utf8Path) -> Result<(), Error> {
        tracing::debug!(
            template = resource.relative_path(),
            output = %output_path,
            "processing template"
        );

        let context = self.context_for(resource);
        let header = self.banner(&context, self.header.as_deref(), output_path)?;
        let footer = self.banner(&context, self.footer.as_deref(), output_path)?;

        let body = resource.open()?;
        // The generated output is always UTF-8; a non-UTF-8 input charset
        // only affects decoding.
        let body: Box<dyn Read + '_> = if body.charset() == Charset::Utf8 {
            Box::new(body)
        } else {
            Box::new(Cursor::new(resource.read_to_string()?.into_bytes()))
        };

        // Banners and body form one stream processed in a single pass.
        let chained = Cursor::new(header.into_bytes())
            .chain(body)
            .chain(Cursor::new(footer.into_bytes()));
        let mut input = BufReader::new(chained);

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::from_io(parent.to_string(), e))?;
        }
        let file = fs::File::create(output_path)
            .map_err(|e| Error::from_io(output_path.to_string(), e))?;
        let mut output = BufWriter::new(file);

        self.processor.process(&context, &mut input, &mut output)
    }

    /// Derives the per-resource context: generation metadata merged under the
    /// task model, so explicit model entries win over metadata.
    fn context_for(&self, resource: &Resource<'_>) -> TemplateContext {
        let now = Utc::now();
        let mut model = HashMap::from([
            (
                "template.filename".to_string(),
                Value::from(resource.relative_path()),
            ),
            ("template.generated".to_string(), Value::Instant(now)),
            (
                "template.generated.local".to_string(),
                Value::Local(now.with_timezone(&chrono::Local)),
            ),
            ("template.task".to_string(), Value::from(self.task_name.as_str())),
            (
                "template.language".to_string(),
                Value::from(self.processor.language().id()),
            ),
        ]);
        model.extend(self.model.iter().map(|(k, v)| (k.clone(), v.clone())));

        let options = HashMap::from([(
            "charset".to_string(),
            self.resources.default_charset().label().to_string(),
        )]);
        TemplateContext::new(model, options)
    }

    /// Renders a banner template and wraps it in the comment style of the
    /// output extension. Outputs without an extension must have a style
    /// configured through [`style`](Self::style) under the empty string.
    fn banner(
        &self,
        context: &TemplateContext,
        text: Option<&str>,
        output_path: &Utf8Path,
    ) -> Result<String, Error> {
        let Some(text) = text else {
            return Ok(String::new());
        };
        let rendered = self.processor.process_str(context, text)?;
        let extension = output_path.extension().unwrap_or("");
        let style = CommentStyle::for_extension(extension, Some(&self.styles))?;
        Ok(style.comment_block(&rendered))
    }
}

fn strip_template_suffix<'a>(relative: &'a str, suffix: &str) -> &'a str {
    let dotted = format!(".{suffix}");
    relative.strip_suffix(dotted.as_str()).unwrap_or(relative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::LINE_SEPARATOR;

    fn utf8(dir: &tempfile::TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn generates_into_output_tree() {
        let templates = tempfile::tempdir().unwrap();
        let root = utf8(&templates);
        fs::create_dir(root.join("pkg")).unwrap();
        fs::write(
            root.join("pkg/Version.java.tmpl"),
            "# internal note\npackage ${package};\n",
        )
        .unwrap();

        let out = tempfile::tempdir().unwrap();
        let out_root = utf8(&out);

        let set = ResourceSet::directory(root, ["**/*.tmpl"], Vec::<&str>::new()).unwrap();
        let generated = Generator::new(set, out_root.clone())
            .model_value("package", Value::from("com.example"))
            .run()
            .unwrap();

        assert_eq!(generated, vec![out_root.join("pkg/Version.java")]);
        let content = fs::read_to_string(&generated[0]).unwrap();
        assert_eq!(content, format!("package com.example;{LINE_SEPARATOR}"));
    }

    #[test]
    fn header_is_wrapped_in_output_comment_style() {
        let templates = tempfile::tempdir().unwrap();
        let root = utf8(&templates);
        fs::write(root.join("Main.java.tmpl"), "class Main {}\n").unwrap();

        let out = tempfile::tempdir().unwrap();
        let out_root = utf8(&out);

        let set = ResourceSet::directory(root, ["**/*.tmpl"], Vec::<&str>::new()).unwrap();
        Generator::new(set, out_root.clone())
            .header("Generated by ${template.task}, do not edit.")
            .task_name("codegen")
            .run()
            .unwrap();

        let content = fs::read_to_string(out_root.join("Main.java")).unwrap();
        assert_eq!(
            content,
            format!(
                "// Generated by codegen, do not edit.{LINE_SEPARATOR}class Main {{}}{LINE_SEPARATOR}"
            )
        );
    }

    #[test]
    fn footer_follows_the_body() {
        let set = ResourceSet::from_strings([("note.md.tmpl", "body\n")]);
        let out = tempfile::tempdir().unwrap();
        let out_root = utf8(&out);

        Generator::new(set, out_root.clone())
            .footer("end of file")
            .run()
            .unwrap();

        let content = fs::read_to_string(out_root.join("note.md")).unwrap();
        assert_eq!(
            content,
            format!("body{LINE_SEPARATOR}<!-- end of file -->{LINE_SEPARATOR}")
        );
    }

    #[test]
    fn metadata_is_visible_but_task_model_wins() {
        let set = ResourceSet::from_strings([(
            "info.txt.tmpl",
            "file=${template.filename} lang=${template.language}\n",
        )]);
        let out = tempfile::tempdir().unwrap();
        let out_root = utf8(&out);

        Generator::new(set, out_root.clone())
            .model_value("template.language", Value::from("overridden"))
            .run()
            .unwrap();

        let content = fs::read_to_string(out_root.join("info.txt")).unwrap();
        assert_eq!(
            content,
            format!("file=info.txt.tmpl lang=overridden{LINE_SEPARATOR}")
        );
    }

    #[test]
    fn custom_suffix_and_style_override() {
        let set = ResourceSet::from_strings([("conf.sql.in", "select 1;\n")]);
        let out = tempfile::tempdir().unwrap();
        let out_root = utf8(&out);

        Generator::new(set, out_root.clone())
            .template_suffix("in")
            .header("banner")
            .style("sql", CommentStyle::Hash)
            .run()
            .unwrap();

        let content = fs::read_to_string(out_root.join("conf.sql")).unwrap();
        assert_eq!(
            content,
            format!("select 1;{LINE_SEPARATOR}")
        );
        // Hash banners are template comments to the simple engine, so they
        // are consumed by the second pass. The default SQL style survives.
        let out2 = tempfile::tempdir().unwrap();
        let out2_root = utf8(&out2);
        let set = ResourceSet::from_strings([("conf.sql.in", "select 1;\n")]);
        Generator::new(set, out2_root.clone())
            .template_suffix("in")
            .header("banner")
            .run()
            .unwrap();
        let content = fs::read_to_string(out2_root.join("conf.sql")).unwrap();
        assert_eq!(
            content,
            format!("-- banner{LINE_SEPARATOR}select 1;{LINE_SEPARATOR}")
        );
    }

    #[test]
    fn missing_style_mapping_fails_generation() {
        let set = ResourceSet::from_strings([("data.xyz.tmpl", "x\n")]);
        let out = tempfile::tempdir().unwrap();

        let err = Generator::new(set, utf8(&out))
            .header("banner")
            .run()
            .unwrap_err();
        assert_eq!(err.kind(), crate::Kind::Configuration);
    }

    #[test]
    fn unsuffixed_templates_keep_their_path() {
        let set = ResourceSet::from_strings([("as-is.txt", "plain\n")]);
        let out = tempfile::tempdir().unwrap();
        let out_root = utf8(&out);

        let generated = Generator::new(set, out_root.clone()).run().unwrap();
        assert_eq!(generated, vec![out_root.join("as-is.txt")]);
    }
}
