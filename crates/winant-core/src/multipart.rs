//! Multipart form data encoder.
//!
//! Builds `multipart/form-data` request bodies for file uploads. Files and
//! plain values are kept in two separate lists and every file part is
//! written before every value part, whatever order they were added in.
//!
//! # Example
//!
//! ```
//! use winant_core::{Multipart, MultipartFile};
//!
//! let mut upload = Multipart::new();
//! upload
//!     .add_file(MultipartFile::new("file", "test.txt", "hello, world!"))
//!     .add_value(("file_size", "unknown"));
//!
//! let content = upload.to_content_with_boundary("XyZ");
//! assert_eq!(
//!     content.content_type(),
//!     "Content-Type: multipart/form-data; boundary=XyZ\r\n"
//! );
//! assert!(content.body().ends_with(b"--XyZ--\r\n"));
//! ```

use crate::content::RequestContent;
use rand::Rng;
use std::path::Path;

/// Mime type used for file parts that do not name one.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Length of generated boundary tokens.
///
/// RFC 2046 caps boundaries at 70 characters.
pub const BOUNDARY_LEN: usize = 32;

/// A file part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartFile {
    /// Form field name.
    pub name: String,
    /// File name reported to the server.
    pub filename: String,
    /// Mime type; [`DEFAULT_MIME_TYPE`] when empty.
    pub mime_type: String,
    /// Raw file contents.
    pub data: Vec<u8>,
}

impl MultipartFile {
    /// Create a file part with the default mime type.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        filename: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            filename: filename.into(),
            mime_type: DEFAULT_MIME_TYPE.to_string(),
            data: data.into(),
        }
    }

    /// Set the mime type.
    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Read a file from disk.
    ///
    /// The file name is taken from the last path component and the mime
    /// type is guessed from its extension.
    pub fn from_path(name: impl Into<String>, path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = mime_guess::from_path(path).first_or_octet_stream();

        Ok(Self {
            name: name.into(),
            filename,
            mime_type: mime_type.to_string(),
            data,
        })
    }

    fn effective_mime_type(&self) -> &str {
        if self.mime_type.is_empty() {
            DEFAULT_MIME_TYPE
        } else {
            &self.mime_type
        }
    }
}

/// Generate a fresh random boundary token.
#[must_use]
pub fn generate_boundary() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(BOUNDARY_LEN)
        .map(char::from)
        .collect()
}

/// A `multipart/form-data` request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Multipart {
    files: Vec<MultipartFile>,
    values: Vec<(String, String)>,
}

impl Multipart {
    /// Create an empty multipart body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are neither files nor values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.values.is_empty()
    }

    /// Append a file part.
    pub fn add_file(&mut self, file: MultipartFile) -> &mut Self {
        self.files.push(file);
        self
    }

    /// Append a `(name, value)` part.
    pub fn add_value<K: Into<String>, V: Into<String>>(
        &mut self,
        (name, value): (K, V),
    ) -> &mut Self {
        self.values.push((name.into(), value.into()));
        self
    }

    /// The file parts, in insertion order.
    #[must_use]
    pub fn files(&self) -> &[MultipartFile] {
        &self.files
    }

    /// The value parts, in insertion order.
    #[must_use]
    pub fn values(&self) -> &[(String, String)] {
        &self.values
    }

    /// Encode with a newly generated boundary.
    ///
    /// Each call picks a new boundary, so two calls on the same data give
    /// different bytes.
    #[must_use]
    pub fn to_content(&self) -> RequestContent {
        self.to_content_with_boundary(&generate_boundary())
    }

    /// Encode with the given boundary.
    #[must_use]
    pub fn to_content_with_boundary(&self, boundary: &str) -> RequestContent {
        let content_type = format!("Content-Type: multipart/form-data; boundary={boundary}\r\n");
        RequestContent::new(content_type, self.encode_body(boundary))
    }

    fn encode_body(&self, boundary: &str) -> Vec<u8> {
        let mut body = Vec::with_capacity(self.estimated_len(boundary));

        for file in &self.files {
            body.extend_from_slice(b"--");
            body.extend_from_slice(boundary.as_bytes());
            body.extend_from_slice(b"\r\n");
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    file.name, file.filename
                )
                .as_bytes(),
            );
            body.extend_from_slice(b"Content-Type: ");
            body.extend_from_slice(file.effective_mime_type().as_bytes());
            body.extend_from_slice(b"\r\n\r\n");
            body.extend_from_slice(&file.data);
            body.extend_from_slice(b"\r\n");
        }

        for (name, value) in &self.values {
            body.extend_from_slice(b"--");
            body.extend_from_slice(boundary.as_bytes());
            body.extend_from_slice(b"\r\n");
            body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            );
            body.extend_from_slice(value.as_bytes());
            body.extend_from_slice(b"\r\n");
        }

        body.extend_from_slice(b"--");
        body.extend_from_slice(boundary.as_bytes());
        body.extend_from_slice(b"--\r\n");
        body
    }

    fn estimated_len(&self, boundary: &str) -> usize {
        let per_part = boundary.len() + 96;
        let files: usize = self
            .files
            .iter()
            .map(|f| per_part + f.name.len() + f.filename.len() + f.mime_type.len() + f.data.len())
            .sum();
        let values: usize = self
            .values
            .iter()
            .map(|(n, v)| per_part + n.len() + v.len())
            .sum();
        files + values + boundary.len() + 6
    }
}
