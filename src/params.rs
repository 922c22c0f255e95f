//! Query-parameter set and its query-string codec.
//!
//! A [`ParameterSet`] is the decoded form of a URL query string: string keys
//! to string values, keys unique, serialized in ascending key order so two
//! equal sets always print the same way. Parsing is best-effort — query
//! strings arrive from the outside world and a mangled pair is skipped, not
//! an error.

use std::collections::BTreeMap;
use std::fmt;

use url::form_urlencoded;

/// A key-unique set of query parameters with deterministic serialization.
///
/// ```rust
/// use ripple::ParameterSet;
///
/// let mut params = ParameterSet::parse("query=vikram");
/// params.set("page", "1");
/// assert_eq!(params.serialize(), "page=1&query=vikram");
///
/// params.remove("page");
/// assert_eq!(params.serialize(), "query=vikram");
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ParameterSet {
    entries: BTreeMap<String, String>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a query string (a leading `?` is tolerated).
    ///
    /// Pairs without a `=` carry no value and are dropped. The last
    /// occurrence of a repeated key wins. Percent-escapes and `+` decode per
    /// `application/x-www-form-urlencoded`; anything undecodable is skipped.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut entries = BTreeMap::new();
        for segment in query.split('&') {
            if segment.is_empty() || !segment.contains('=') {
                continue;
            }
            if let Some((key, value)) = form_urlencoded::parse(segment.as_bytes()).next() {
                entries.insert(key.into_owned(), value.into_owned());
            }
        }
        Self { entries }
    }

    /// Encodes the set as a query string, keys ascending.
    ///
    /// An empty set serializes to the empty string. `parse(serialize(p))`
    /// always equals `p`.
    pub fn serialize(&self) -> String {
        let mut out = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.entries {
            out.append_pair(key, value);
        }
        out.finish()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Sets `key` to `value`, overwriting any existing entry.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Removes `key`, returning the previous value if there was one.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    /// Applies a batch of changes: `Some` overwrites, `None` deletes.
    /// Unrelated keys are untouched.
    pub fn merge<K, V, C>(&mut self, changes: C)
    where
        C: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in changes {
            match value {
                Some(value) => {
                    self.entries.insert(key.into(), value.into());
                }
                None => {
                    self.entries.remove(&key.into());
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParameterSet {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for ParameterSet {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        self.entries
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}
