//! The built-in line-oriented substitution engine.

use std::collections::HashMap;
use std::io::{BufRead, Write};

use crate::error::Error;
use crate::io::LineReader;
use crate::template::{format, TemplateContext, TemplateLanguage, TemplateProcessor, Value};

/// Processes templates line by line, expanding `${name}` and `${name:format}`
/// tokens from the context model.
///
/// Lines whose first non-whitespace content is the comment prefix are dropped
/// from the output entirely. `\${` passes the token through literally, with
/// the backslash retained so the output can itself serve as a template. A
/// token naming an absent model entry is left verbatim, format and all, and
/// an unclosed `${` emits just those two characters.
pub struct SimpleTemplateProcessor {
    comment_prefix: String,
}

impl SimpleTemplateProcessor {
    pub fn new() -> Self {
        Self {
            comment_prefix: "#".to_string(),
        }
    }

    /// Uses `prefix` instead of `#` to mark template-internal comment lines.
    pub fn with_comment_prefix(prefix: impl Into<String>) -> Self {
        Self {
            comment_prefix: prefix.into(),
        }
    }

    fn run(
        &self,
        context: &TemplateContext,
        template: &mut dyn BufRead,
        output: &mut dyn Write,
    ) -> Result<(), Error> {
        let mut lines = LineReader::new(template);
        while let Some(line) = lines
            .next_line()
            .map_err(|e| Error::access("template input", e))?
        {
            if line.trim_start().starts_with(&self.comment_prefix) {
                continue;
            }
            let expanded = replace_variables(&line, &context.model);
            output
                .write_all(expanded.as_bytes())
                .map_err(|e| Error::access("template output", e))?;
        }
        Ok(())
    }
}

impl Default for SimpleTemplateProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateProcessor for SimpleTemplateProcessor {
    fn language(&self) -> TemplateLanguage {
        TemplateLanguage::Simple
    }

    fn process(
        &self,
        context: &TemplateContext,
        template: &mut dyn BufRead,
        output: &mut dyn Write,
    ) -> Result<(), Error> {
        let result = self.run(context, template, output);
        // The writer is flushed even when processing failed, so partial
        // output is observable and buffered bytes are never silently lost.
        let flushed = output.flush();
        result?;
        flushed.map_err(|e| Error::access("template output", e))?;
        Ok(())
    }
}

fn replace_variables(line: &str, model: &HashMap<String, Value>) -> String {
    if model.is_empty() {
        return line.to_string();
    }

    let mut out = String::new();
    let mut current = 0;

    while let Some(offset) = line[current..].find("${") {
        let start = current + offset;

        if line[..start].ends_with('\\') {
            // Escaped token: copy through the "${" and keep scanning after
            // it, leaving the token body untouched.
            out.push_str(&line[current..start + 2]);
            current = start + 2;
            continue;
        }

        out.push_str(&line[current..start]);
        match line[start + 2..].find('}') {
            None => {
                // Unclosed token: the marker passes through as plain text.
                out.push_str("${");
                current = start + 2;
            }
            Some(close) => {
                let end = start + 2 + close;
                let key = &line[start + 2..end];
                let (name, format_spec) = match key.split_once(':') {
                    Some((name, spec)) => (name, Some(spec)),
                    None => (key, None),
                };

                match model.get(name) {
                    Some(value) => match format_spec {
                        Some(spec) if !spec.is_empty() => {
                            out.push_str(&format::format_value(value, spec));
                        }
                        _ => out.push_str(&value.to_string()),
                    },
                    // Unknown name: the whole token stays verbatim.
                    None => out.push_str(&line[start..=end]),
                }
                current = end + 1;
            }
        }
    }

    out.push_str(&line[current..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::LINE_SEPARATOR;

    fn process(template: &str, model: &[(&str, Value)]) -> String {
        let model = model
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        let context = TemplateContext::with_model(model);
        SimpleTemplateProcessor::new()
            .process_str(&context, template)
            .unwrap()
    }

    #[test]
    fn substitutes_model_values() {
        let got = process(
            "# template comment\nHello ${name}!\n",
            &[("name", Value::from("World"))],
        );
        assert_eq!(got, format!("Hello World!{LINE_SEPARATOR}"));
    }

    #[test]
    fn applies_format_specifications() {
        let got = process(
            "id = ${id:%05d}\n",
            &[("id", Value::Int(7))],
        );
        assert_eq!(got, format!("id = 00007{LINE_SEPARATOR}"));
    }

    #[test]
    fn escaped_tokens_pass_through_with_backslash() {
        let got = process(
            "literal \\${name} here\n",
            &[("name", Value::from("x"))],
        );
        assert_eq!(got, format!("literal \\${{name}} here{LINE_SEPARATOR}"));
    }

    #[test]
    fn unknown_names_stay_verbatim() {
        let got = process("${missing} and ${missing:%d}\n", &[("other", Value::Int(1))]);
        assert_eq!(
            got,
            format!("${{missing}} and ${{missing:%d}}{LINE_SEPARATOR}")
        );
    }

    #[test]
    fn unclosed_token_emits_marker_only() {
        let got = process("broken ${name\n", &[("name", Value::from("x"))]);
        assert_eq!(got, format!("broken ${{name{LINE_SEPARATOR}"));
    }

    #[test]
    fn empty_model_leaves_lines_untouched() {
        let got = process("still ${here}\n", &[]);
        assert_eq!(got, format!("still ${{here}}{LINE_SEPARATOR}"));
    }

    #[test]
    fn comment_lines_are_dropped() {
        let got = process(
            "  # indented comment\nbody\n",
            &[("unused", Value::Int(0))],
        );
        assert_eq!(got, format!("body{LINE_SEPARATOR}"));

        let custom = SimpleTemplateProcessor::with_comment_prefix("//");
        let context = TemplateContext::with_model(
            [("v".to_string(), Value::Int(1))].into_iter().collect(),
        );
        let got = custom.process_str(&context, "// note\n${v}\n").unwrap();
        assert_eq!(got, format!("1{LINE_SEPARATOR}"));
    }

    #[test]
    fn final_unterminated_line_keeps_no_terminator() {
        let got = process("a=${a}", &[("a", Value::Int(2))]);
        assert_eq!(got, "a=2");
    }

    #[test]
    fn multiple_tokens_on_one_line() {
        let got = process(
            "${a}-${b}-${a}\n",
            &[("a", Value::from("x")), ("b", Value::from("y"))],
        );
        assert_eq!(got, format!("x-y-x{LINE_SEPARATOR}"));
    }
}
