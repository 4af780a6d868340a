use std::collections::BTreeMap;

/// Maps the short codes offered to the user onto server locale tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageTable {
    tags: BTreeMap<String, String>,
}

impl Default for LanguageTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.insert("en", "en-US");
        table.insert("sp", "es-ES");
        table.insert("pt", "pt-PT");
        table
    }
}

impl LanguageTable {
    pub fn empty() -> Self {
        Self {
            tags: BTreeMap::new(),
        }
    }

    /// Adds or replaces a mapping. Codes are matched case-insensitively.
    pub fn insert(&mut self, code: impl AsRef<str>, tag: impl Into<String>) {
        self.tags
            .insert(code.as_ref().trim().to_ascii_lowercase(), tag.into());
    }

    pub fn resolve(&self, code: &str) -> Option<&str> {
        self.tags
            .get(&code.trim().to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }
}
