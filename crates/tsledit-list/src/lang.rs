#![forbid(unsafe_code)]

//! Per-language values (`xml:lang` tagged names, URIs and notices).

/// One `xml:lang` tagged value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LangString {
    pub lang: String,
    pub value: String,
}

/// An ordered list of language-tagged values.
///
/// Lookups compare language tags case-insensitively. [`get`](Self::get)
/// falls back to the English entry and then to the first entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LangStrings {
    entries: Vec<LangString>,
}

impl LangStrings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for `lang`, else the `en` value, else the first value.
    pub fn get(&self, lang: &str) -> Option<&str> {
        self.find(lang)
            .or_else(|| self.find("en"))
            .or_else(|| self.entries.first().map(|e| e.value.as_str()))
    }

    /// Value for `lang` only, without fallback.
    pub fn find(&self, lang: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.lang.eq_ignore_ascii_case(lang))
            .map(|e| e.value.as_str())
    }

    /// Replace the value for `lang` in place, or append a new entry.
    ///
    /// New entries keep the tag in lower case.
    pub fn set(&mut self, lang: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|e| e.lang.eq_ignore_ascii_case(lang))
        {
            Some(entry) => entry.value = value,
            None => self.entries.push(LangString {
                lang: lang.to_ascii_lowercase(),
                value,
            }),
        }
    }

    /// Append an entry even if the language is already present.
    ///
    /// URI lists and legal notices carry upper-case tags.
    pub fn add(&mut self, lang: &str, value: impl Into<String>) {
        self.entries.push(LangString {
            lang: lang.to_ascii_uppercase(),
            value: value.into(),
        });
    }

    /// Append an entry exactly as read from a document.
    pub(crate) fn push_raw(&mut self, lang: String, value: String) {
        self.entries.push(LangString { lang, value });
    }

    pub fn iter(&self) -> impl Iterator<Item = &LangString> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
