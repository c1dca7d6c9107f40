//! Per-locale text maps.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Locale code to text, e.g. `{"en": "Red shoe", "sl": "Rdeč čevelj"}`.
///
/// Lookups fall back from the requested locale to the default locale.
/// Empty strings count as absent so a cleared translation falls through.
///
/// ```
/// use catalogue_core::LocalizedText;
///
/// let mut name = LocalizedText::default();
/// name.set("en", "Front view");
/// assert_eq!(name.resolve("de", "en"), Some("Front view"));
/// assert_eq!(name.resolve("de", "fr"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<String, String>);

impl LocalizedText {
    /// Empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact lookup, no fallback.
    pub fn get(&self, locale: &str) -> Option<&str> {
        self.0.get(locale).map(String::as_str)
    }

    /// Set one locale, leaving the others untouched.
    pub fn set(&mut self, locale: impl Into<String>, text: impl Into<String>) {
        self.0.insert(locale.into(), text.into());
    }

    /// Requested locale, then default locale.
    pub fn resolve<'a>(&'a self, locale: &str, default_locale: &str) -> Option<&'a str> {
        self.non_empty(locale)
            .or_else(|| self.non_empty(default_locale))
    }

    /// Locales that have an entry.
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// True when no locale has an entry.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn non_empty(&self, locale: &str) -> Option<&str> {
        self.get(locale).filter(|text| !text.is_empty())
    }
}

impl<K, V> FromIterator<(K, V)> for LocalizedText
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
