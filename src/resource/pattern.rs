use std::collections::HashMap;
use std::sync::{LazyLock, Mutex};

use glob::{MatchOptions, Pattern};

use crate::error::Error;

/// `*` matches within one path segment, `**` crosses segments, `?` matches a
/// single non-separator character.
const OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Compiled patterns shared across all resource sets, keyed by the pattern
/// string. Population is computed-if-absent, so concurrent callers are fine.
static CACHE: LazyLock<Mutex<HashMap<String, Pattern>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Compiles a pattern through the shared cache. Invalid patterns are a
/// configuration error, surfaced at resource-set construction.
pub(crate) fn compile(pattern: &str) -> Result<(), Error> {
    let mut cache = CACHE.lock().unwrap();
    if cache.contains_key(pattern) {
        return Ok(());
    }
    let compiled = Pattern::new(pattern)
        .map_err(|e| Error::Configuration(format!("invalid glob pattern '{pattern}': {e}")))?;
    cache.insert(pattern.to_string(), compiled);
    Ok(())
}

/// Tests a path against a pattern already validated by [`compile`].
pub(crate) fn matches(pattern: &str, path: &str) -> bool {
    let mut cache = CACHE.lock().unwrap();
    let compiled = match cache.get(pattern) {
        Some(p) => p,
        None => match Pattern::new(pattern) {
            Ok(p) => cache.entry(pattern.to_string()).or_insert(p),
            Err(_) => return false,
        },
    };
    compiled.matches_with(path, OPTIONS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_stays_within_segment() {
        assert!(matches("*.tmpl", "a.tmpl"));
        assert!(!matches("*.tmpl", "dir/a.tmpl"));
        assert!(matches("src/*.rs", "src/lib.rs"));
        assert!(!matches("src/*.rs", "src/nested/lib.rs"));
    }

    #[test]
    fn double_star_crosses_segments() {
        assert!(matches("**/*.tmpl", "a/b/c.tmpl"));
        assert!(matches("**/*.tmpl", "dir/a.tmpl"));
        assert!(matches("draft/**", "draft/x/y.txt"));
        assert!(!matches("draft/**", "published/x.txt"));
    }

    #[test]
    fn question_mark_matches_one_character() {
        assert!(matches("a?.txt", "ab.txt"));
        assert!(!matches("a?.txt", "a.txt"));
        assert!(!matches("a?.txt", "abc.txt"));
        assert!(!matches("a?c", "a/c"));
    }

    #[test]
    fn glob_engine_agrees_with_reference_semantics() {
        // (pattern, path, expected) pairs covering the documented semantics.
        let cases = [
            ("**/*", "deep/tree/file.txt", true),
            ("*", "file.txt", true),
            ("*", "dir/file.txt", false),
            ("**", "dir/file.txt", true),
            ("*.java", "Foo.java", true),
            ("*.java", "pkg/Foo.java", false),
            ("pkg/**/Foo.java", "pkg/a/b/Foo.java", true),
            ("???", "abc", true),
            ("???", "ab", false),
        ];
        for (pattern, path, expected) in cases {
            assert_eq!(
                matches(pattern, path),
                expected,
                "pattern {pattern} against {path}"
            );
        }
    }

    #[test]
    fn invalid_pattern_is_configuration_error() {
        let err = compile("[unclosed").unwrap_err();
        assert_eq!(err.kind(), crate::Kind::Configuration);
    }
}
