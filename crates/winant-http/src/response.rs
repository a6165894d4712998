//! HTTP response value.

use crate::error::Error;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use winant_core::Headers;

/// A completed response.
///
/// The body is whatever was accumulated while streaming. It is empty when
/// the request was loaded with
/// [`LoadFlags::DO_NOT_SAVE_RESPONSE_BODY`](winant_core::LoadFlags::DO_NOT_SAVE_RESPONSE_BODY),
/// even if the server sent data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    status_code: u16,
    headers: Headers,
    body: Vec<u8>,
}

impl HttpResponse {
    /// Assemble a response.
    #[must_use]
    pub fn new(status_code: u16, headers: Headers, body: Vec<u8>) -> Self {
        Self {
            status_code,
            headers,
            body,
        }
    }

    /// The numeric status code.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Returns true for a 2xx status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// The response headers.
    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// The accumulated body bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// The body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_slice(&self.body).map_err(|e| Error::Decode {
            detail: e.to_string(),
        })
    }

    /// Consume the response, returning the body.
    #[must_use]
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Consume the response, returning `(status, headers, body)`.
    #[must_use]
    pub fn into_parts(self) -> (u16, Headers, Vec<u8>) {
        (self.status_code, self.headers, self.body)
    }
}
