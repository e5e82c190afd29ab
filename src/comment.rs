use std::collections::HashMap;
use std::sync::LazyLock;

use crate::error::Error;

/// Host line separator used when assembling comment banners.
pub(crate) const LINE_SEPARATOR: &str = if cfg!(windows) { "\r\n" } else { "\n" };

/// A strategy for wrapping banner text in an output format's comment syntax.
///
/// Styles are selected by lowercase output-file extension, with an optional
/// per-task override map consulted before the built-in table. An extension
/// with no mapping at all is a configuration error so missing coverage
/// surfaces early instead of producing uncommented banners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    /// Emit the content unchanged. Used when a target format has no safe
    /// comment syntax, or banners are disabled.
    None,
    /// `//` line comments: java, js, kt, rs, go, ...
    Slash,
    /// `#` line comments: sh, toml, yaml, txt, ...
    Hash,
    /// `/* ... */` block comments: c, h.
    CBlock,
    /// `--` line comments: sql dialects.
    Sql,
    /// `;` line comments: ini, properties.
    Ini,
    /// `<!-- ... -->` block comments: xml, html, md, ...
    Markup,
    /// `#` single line, `"""` block: python.
    Python,
    /// `'` line comments: basic family.
    Basic,
    /// `%` line comments: matlab.
    Matlab,
    /// `--` single line, `--[[ ... ]]` block: lua.
    Lua,
    /// `#` single line, `<# ... #>` block: powershell.
    PowerShell,
    /// `REM` line comments: bat, cmd.
    Batch,
    /// `<%-- ... --%>` block comments: jsp family.
    Jsp,
}

static DEFAULT_TABLE: LazyLock<HashMap<&'static str, CommentStyle>> = LazyLock::new(|| {
    let families: &[(CommentStyle, &[&str])] = &[
        (
            CommentStyle::Slash,
            &[
                "java", "js", "kt", "kts", "cs", "cpp", "cxx", "c++", "gradle", "php", "go", "rs",
                "scala", "swift", "ts", "tsx",
            ],
        ),
        (
            CommentStyle::Hash,
            &[
                "txt", "text", "sh", "bash", "rb", "csh", "pl", "pm", "perl", "zsh", "fish", "ksh",
                "tcsh", "toml", "yaml", "yml",
            ],
        ),
        (CommentStyle::CBlock, &["c", "h"]),
        (
            CommentStyle::Sql,
            &["sql", "plsql", "pgsql", "mysql", "sqlite", "hive", "db2", "mssql"],
        ),
        (CommentStyle::Ini, &["ini", "properties"]),
        (
            CommentStyle::Markup,
            &["xml", "html", "xhtml", "htm", "svg", "xsl", "xslt", "md", "markdown"],
        ),
        (CommentStyle::Python, &["py", "pyi", "pyx", "pyo", "pyd"]),
        (CommentStyle::Basic, &["bas", "vb", "vba", "vbs"]),
        (CommentStyle::Matlab, &["matlab", "m", "mlx"]),
        (CommentStyle::Lua, &["lua", "luac", "luau"]),
        (CommentStyle::PowerShell, &["ps1", "psm1", "psd1"]),
        (CommentStyle::Batch, &["bat", "cmd"]),
        (
            CommentStyle::Jsp,
            &["jsp", "jspx", "jspf", "tag", "tagx", "aspx", "ascx"],
        ),
    ];

    let mut table = HashMap::new();
    for (style, suffixes) in families {
        for suffix in *suffixes {
            table.insert(*suffix, *style);
        }
    }
    table
});

impl CommentStyle {
    /// Resolves the style for an output extension. The override map wins over
    /// the built-in table.
    pub fn for_extension(
        extension: &str,
        overrides: Option<&HashMap<String, CommentStyle>>,
    ) -> Result<CommentStyle, Error> {
        let lower = extension.to_ascii_lowercase();
        if let Some(style) = overrides.and_then(|map| map.get(&lower)) {
            return Ok(*style);
        }
        DEFAULT_TABLE.get(lower.as_str()).copied().ok_or_else(|| {
            Error::Configuration(format!(
                "no comment style mapped for extension '{extension}'"
            ))
        })
    }

    /// Wraps content as a comment banner.
    ///
    /// Trailing whitespace is trimmed; content without an internal newline
    /// uses the style's single-line form, anything else the multi-line form.
    pub fn comment_block(&self, content: &str) -> String {
        if *self == CommentStyle::None {
            return content.to_string();
        }

        let content = content.trim_end();
        match self {
            CommentStyle::None => unreachable!(),
            CommentStyle::Slash => prefixed_lines("// ", content),
            CommentStyle::Hash => prefixed_lines("# ", content),
            CommentStyle::Sql => prefixed_lines("-- ", content),
            CommentStyle::Ini => prefixed_lines("; ", content),
            CommentStyle::Basic => prefixed_lines("' ", content),
            CommentStyle::Matlab => prefixed_lines("% ", content),
            CommentStyle::Batch => prefixed_lines("REM ", content),
            CommentStyle::CBlock => block(
                content,
                |c| format!("/* {c} */{LINE_SEPARATOR}"),
                |c| {
                    format!(
                        "/*{LINE_SEPARATOR}{} */{LINE_SEPARATOR}",
                        prefixed_lines(" * ", c)
                    )
                },
            ),
            CommentStyle::Markup => block(
                content,
                |c| format!("<!-- {c} -->{LINE_SEPARATOR}"),
                |c| {
                    format!(
                        "<!--{LINE_SEPARATOR}{}  -->{LINE_SEPARATOR}",
                        prefixed_lines("  -- ", c)
                    )
                },
            ),
            CommentStyle::Python => block(
                content,
                |c| format!("# {c}{LINE_SEPARATOR}"),
                |c| format!("\"\"\"{LINE_SEPARATOR}{c}{LINE_SEPARATOR}\"\"\"{LINE_SEPARATOR}"),
            ),
            CommentStyle::Lua => block(
                content,
                |c| format!("-- {c}{LINE_SEPARATOR}"),
                |c| format!("--[[{LINE_SEPARATOR}{c}{LINE_SEPARATOR}]]{LINE_SEPARATOR}"),
            ),
            CommentStyle::PowerShell => block(
                content,
                |c| format!("# {c}{LINE_SEPARATOR}"),
                |c| {
                    format!(
                        "<#{LINE_SEPARATOR}{} #>{LINE_SEPARATOR}",
                        prefixed_lines(" # ", c)
                    )
                },
            ),
            CommentStyle::Jsp => block(
                content,
                |c| format!("<%-- {c} --%>{LINE_SEPARATOR}"),
                |c| {
                    format!(
                        "<%--{LINE_SEPARATOR}{}  --%>{LINE_SEPARATOR}",
                        prefixed_lines("  -- ", c)
                    )
                },
            ),
        }
    }
}

fn block(
    content: &str,
    single: impl Fn(&str) -> String,
    multi: impl Fn(&str) -> String,
) -> String {
    if content.contains('\n') {
        multi(content)
    } else {
        single(content)
    }
}

/// Prefixes every non-blank line; blank lines are dropped.
fn prefixed_lines(prefix: &str, content: &str) -> String {
    let mut out = String::new();
    for line in content.lines() {
        if !line.trim().is_empty() {
            out.push_str(prefix);
            out.push_str(line);
            out.push_str(LINE_SEPARATOR);
        }
    }
    out
}
