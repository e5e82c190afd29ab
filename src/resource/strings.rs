/// An in-memory resource set. Iteration follows declaration order.
#[derive(Debug)]
pub(crate) struct StringSet {
    entries: Vec<(String, String)>,
}

/// Key used when a set is built from a single unnamed string.
pub(crate) const INDEX_KEY: &str = "index";

impl StringSet {
    pub(crate) fn new(entries: Vec<(String, String)>) -> Self {
        Self { entries }
    }

    pub(crate) fn get(&self, path: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == path)
            .map(|(_, data)| data.as_str())
    }

    pub(crate) fn entries(&self) -> &[(String, String)] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_and_declaration_order() {
        let set = StringSet::new(vec![
            ("z.tmpl".to_string(), "zed".to_string()),
            ("a.tmpl".to_string(), "ay".to_string()),
        ]);
        assert_eq!(set.get("z.tmpl"), Some("zed"));
        assert_eq!(set.get("missing"), None);

        let keys: Vec<_> = set.entries().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["z.tmpl", "a.tmpl"]);
    }
}
