//! Ordered key/value pairs decoded from a urlencoded body or query string.
//!
//! Keys may repeat (`pk=..&pk=..`, `provider=a&provider=b`), so a plain map
//! is not enough. Use it directly as an axum extractor payload:
//! `Form(data): Form<FormData>` or `Query(params): Query<FormData>`.

use indexmap::IndexMap;
use serde::Deserialize;

const TRUTHY: &[&str] = &["on", "true", "1", "yes"];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "Vec<(String, String)>")]
pub struct FormData {
    pairs: Vec<(String, String)>,
}

impl From<Vec<(String, String)>> for FormData {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }
}

impl FormData {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// First non-blank value for `key`, trimmed.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.trim())
            .find(|v| !v.is_empty())
    }

    /// Every non-blank value for `key`, in submission order.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
            .collect()
    }

    /// Whether the key was submitted at all, even with an empty value.
    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Checkbox semantics: `on`, `true`, `1`, `yes`.
    pub fn is_checked(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| TRUTHY.contains(&v.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
    }

    /// Raw first value per key, for re-rendering a bound form.
    pub fn values(&self) -> IndexMap<String, String> {
        let mut values = IndexMap::new();
        for (k, v) in &self.pairs {
            values.entry(k.clone()).or_insert_with(|| v.clone());
        }
        values
    }

    /// Re-encode as a query string, skipping `exclude` keys.
    ///
    /// Used by list pages to build pager links that keep the active filter.
    pub fn to_query_string(&self, exclude: &[&str]) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in &self.pairs {
            if !exclude.contains(&k.as_str()) && !v.is_empty() {
                serializer.append_pair(k, v);
            }
        }
        serializer.finish()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
