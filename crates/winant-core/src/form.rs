//! Form-urlencoded encoders: query strings and form bodies.
//!
//! [`Parameters`] and [`Payload`] share one encoding rule. Every byte
//! outside the unreserved set `A-Z a-z 0-9 - _ . ~` is written as `%XX`
//! with uppercase hex, so a space becomes `%20` (never `+`), `&` becomes
//! `%26` and `=` becomes `%3D`. Pairs are joined as `key=value` with `&`
//! in insertion order.
//!
//! # Example
//!
//! ```
//! use winant_core::Parameters;
//!
//! let mut params = Parameters::new();
//! params.add(("uid", "789")).add(("appkey", "winant http"));
//! assert_eq!(params.to_query_string(), "uid=789&appkey=winant%20http");
//! ```

use crate::content::RequestContent;

/// Content type line produced by [`Payload::to_content`].
pub const FORM_CONTENT_TYPE: &str = "Content-Type: application/x-www-form-urlencoded\r\n";

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// Percent-encode a string for use in a query string or form body.
///
/// # Example
///
/// ```
/// use winant_core::percent_encode;
///
/// assert_eq!(percent_encode("backup&winant"), "backup%26winant");
/// assert_eq!(percent_encode("a=b c"), "a%3Db%20c");
/// assert_eq!(percent_encode("kcno.1"), "kcno.1");
/// ```
#[must_use]
pub fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    encode_into(&mut out, s);
    out
}

fn encode_into(out: &mut String, s: &str) {
    for &b in s.as_bytes() {
        if is_unreserved(b) {
            out.push(char::from(b));
        } else {
            out.push('%');
            out.push(char::from(HEX_UPPER[usize::from(b >> 4)]));
            out.push(char::from(HEX_UPPER[usize::from(b & 0x0F)]));
        }
    }
}

fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~')
}

/// Encode pairs as `key=value&...`.
///
/// A pair whose key and value are both empty adds nothing, so a sequence
/// made only of such pairs encodes to the empty string.
fn encode_pairs(pairs: &[(String, String)]) -> String {
    let mut out = String::new();
    for (key, value) in pairs {
        if key.is_empty() && value.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push('&');
        }
        encode_into(&mut out, key);
        out.push('=');
        encode_into(&mut out, value);
    }
    out
}

// ============================================================================
// Parameters
// ============================================================================

/// Query string parameters.
///
/// An ordered list of pairs; duplicate keys are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    params: Vec<(String, String)>,
}

impl Parameters {
    /// Create an empty parameter list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no pair was added.
    ///
    /// This only looks at the number of pairs: a list holding one pair of
    /// two empty strings is not empty, even though it encodes to `""`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns the number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Append a pair.
    pub fn add<K: Into<String>, V: Into<String>>(&mut self, (key, value): (K, V)) -> &mut Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Iterate over the pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Encode as a query string, without the leading `?`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        encode_pairs(&self.params)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Parameters {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

// ============================================================================
// Payload
// ============================================================================

/// A form-urlencoded request body.
///
/// # Example
///
/// ```
/// use winant_core::Payload;
///
/// let mut payload = Payload::from([("token", "token123")]);
/// payload.add(("app", "winant http"));
/// let content = payload.to_content();
/// assert_eq!(
///     content.content_type(),
///     "Content-Type: application/x-www-form-urlencoded\r\n"
/// );
/// assert_eq!(content.body(), b"token=token123&app=winant%20http");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload {
    data: Vec<(String, String)>,
}

impl Payload {
    /// Create an empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no pair was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Append a pair.
    pub fn add<K: Into<String>, V: Into<String>>(&mut self, (key, value): (K, V)) -> &mut Self {
        self.data.push((key.into(), value.into()));
        self
    }

    /// Iterate over the pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.data.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Encode as a form body with its content type line.
    #[must_use]
    pub fn to_content(&self) -> RequestContent {
        RequestContent::new(FORM_CONTENT_TYPE, encode_pairs(&self.data).into_bytes())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Payload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            data: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Payload {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}
