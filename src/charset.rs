/// Character set used to decode resource content.
///
/// The default is UTF-8. Latin-1 and US-ASCII labels are recognized because
/// remote origins still declare them in `Content-Type` headers; anything else
/// falls back to lossy UTF-8 decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
    #[default]
    Utf8,
    Latin1,
    Ascii,
}

impl Charset {
    pub fn label(&self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::Latin1 => "ISO-8859-1",
            Charset::Ascii => "US-ASCII",
        }
    }

    pub fn from_label(label: &str) -> Option<Charset> {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(Charset::Utf8),
            "iso-8859-1" | "iso8859-1" | "latin1" | "latin-1" => Some(Charset::Latin1),
            "us-ascii" | "ascii" => Some(Charset::Ascii),
            _ => None,
        }
    }

    /// Extracts the `charset` parameter from a `Content-Type` header value.
    ///
    /// Unknown or malformed charset names yield `None`, leaving the set's
    /// default in effect.
    pub(crate) fn from_content_type(value: &str) -> Option<Charset> {
        let lower = value.to_ascii_lowercase();
        let start = lower.find("charset")?;
        let rest = lower[start + "charset".len()..].trim_start();
        let rest = rest.strip_prefix('=')?.trim_start();
        let rest = rest.trim_start_matches(['"', '\'']);
        let end = rest
            .find([';', '"', '\'', ' '])
            .unwrap_or(rest.len());
        Charset::from_label(&rest[..end])
    }

    pub(crate) fn decode(&self, bytes: &[u8]) -> String {
        match self {
            Charset::Utf8 | Charset::Ascii => String::from_utf8_lossy(bytes).into_owned(),
            Charset::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_parsing() {
        assert_eq!(
            Charset::from_content_type("text/plain; charset=utf-8"),
            Some(Charset::Utf8)
        );
        assert_eq!(
            Charset::from_content_type("text/html; charset=\"ISO-8859-1\""),
            Some(Charset::Latin1)
        );
        assert_eq!(
            Charset::from_content_type("text/html; Charset = latin1 ; boundary=x"),
            Some(Charset::Latin1)
        );
        assert_eq!(Charset::from_content_type("text/plain"), None);
        assert_eq!(
            Charset::from_content_type("text/plain; charset=klingon"),
            None
        );
    }

    #[test]
    fn latin1_decoding() {
        let bytes = [b'c', b'a', b'f', 0xE9];
        assert_eq!(Charset::Latin1.decode(&bytes), "café");
        assert_eq!(Charset::Utf8.decode("café".as_bytes()), "café");
    }
}
