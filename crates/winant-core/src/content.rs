//! Encoded request bodies.

use crate::error::ConfigError;
use serde::Serialize;

/// Content type line produced by [`JsonContent::to_content`].
pub const JSON_CONTENT_TYPE: &str = "Content-Type: application/json\r\n";

/// An encoded request body together with the header line naming its type.
///
/// The content type is the whole header line, `"Content-Type: ...\r\n"`,
/// ready to be pushed onto a request handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContent {
    content_type: String,
    body: Vec<u8>,
}

impl RequestContent {
    /// Pair a content type line with body bytes.
    #[must_use]
    pub fn new(content_type: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            content_type: content_type.into(),
            body,
        }
    }

    /// The `Content-Type` header line, including the trailing CRLF.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// The media type alone, e.g. `application/json`.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        let line = self.content_type.trim_end_matches("\r\n");
        line.split_once(':').map_or(line, |(_, value)| value.trim())
    }

    /// The encoded body.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Split into `(content type line, body)`.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<u8>) {
        (self.content_type, self.body)
    }
}

/// A JSON request body.
///
/// The string is sent exactly as stored; it is not checked for being
/// well-formed JSON.
///
/// # Example
///
/// ```
/// use winant_core::JsonContent;
///
/// let json = JsonContent::new(r#"{"code": 0, "msg": "success"}"#);
/// let content = json.to_content();
/// assert_eq!(content.content_type(), "Content-Type: application/json\r\n");
/// assert_eq!(content.body(), br#"{"code": 0, "msg": "success"}"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonContent {
    data: String,
}

impl JsonContent {
    /// Wrap a JSON string.
    #[must_use]
    pub fn new(json: impl Into<String>) -> Self {
        Self { data: json.into() }
    }

    /// Serialize a value into a JSON body.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, ConfigError> {
        Ok(Self {
            data: serde_json::to_string(value)?,
        })
    }

    /// Returns true if the stored string is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The stored string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.data
    }

    /// Encode with the JSON content type line.
    #[must_use]
    pub fn to_content(&self) -> RequestContent {
        RequestContent::new(JSON_CONTENT_TYPE, self.data.clone().into_bytes())
    }
}

impl From<&str> for JsonContent {
    fn from(json: &str) -> Self {
        Self::new(json)
    }
}

impl From<String> for JsonContent {
    fn from(json: String) -> Self {
        Self::new(json)
    }
}
