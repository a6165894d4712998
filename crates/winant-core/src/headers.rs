//! Request and response header map.

use std::collections::BTreeMap;
use std::collections::btree_map;

/// A header map with unique keys, iterated in ascending key order.
///
/// Keys are stored exactly as given; `Content-Type` and `content-type` are
/// two different entries. Setting an existing key overwrites its value.
///
/// # Example
///
/// ```
/// use winant_core::Headers;
///
/// let mut headers = Headers::from([("key1", "value1"), ("key2", "")]);
/// headers.set_header("key3", "value3");
/// assert_eq!(
///     headers.to_wire_string(),
///     "key1: value1\r\nkey2:\r\nkey3: value3\r\n\r\n"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    inner: BTreeMap<String, String>,
}

impl Headers {
    /// Create an empty header map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the map holds no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Remove every header.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Returns true if a header with exactly this key exists.
    #[must_use]
    pub fn has_header(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    /// Get the value stored under `key`.
    #[must_use]
    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.inner.get(key).map(String::as_str)
    }

    /// Insert a header, replacing any previous value for the same key.
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(key.into(), value.into());
    }

    /// Remove a header. Does nothing if the key is absent.
    pub fn remove_header(&mut self, key: &str) {
        self.inner.remove(key);
    }

    /// Iterate over `(key, value)` pairs in ascending key order.
    pub fn iter(&self) -> HeaderIter<'_> {
        HeaderIter {
            inner: self.inner.iter(),
        }
    }

    /// Serialize as an HTTP header block.
    ///
    /// Each entry becomes `"<key>: <value>\r\n"` (or `"<key>:\r\n"` when the
    /// value is empty), followed by one terminating `"\r\n"`.
    #[must_use]
    pub fn to_wire_string(&self) -> String {
        let capacity = self
            .inner
            .iter()
            .map(|(k, v)| k.len() + v.len() + 4)
            .sum::<usize>()
            + 2;
        let mut out = String::with_capacity(capacity);
        for (key, value) in &self.inner {
            out.push_str(key);
            out.push(':');
            if !value.is_empty() {
                out.push(' ');
                out.push_str(value);
            }
            out.push_str("\r\n");
        }
        out.push_str("\r\n");
        out
    }
}

impl std::fmt::Display for Headers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_wire_string())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        headers.extend(iter);
        headers
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Headers {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set_header(key, value);
        }
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Headers {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Borrowing iterator over `(name, value)` pairs in key order.
#[derive(Debug, Clone)]
pub struct HeaderIter<'a> {
    inner: btree_map::Iter<'a, String, String>,
}

impl<'a> Iterator for HeaderIter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for HeaderIter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl ExactSizeIterator for HeaderIter<'_> {}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a str, &'a str);
    type IntoIter = HeaderIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for Headers {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}
