//! HTTP request methods.

use crate::error::ConfigError;
use std::str::FromStr;

/// The request verbs this client can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `HEAD`
    Head,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
    /// `PATCH`
    Patch,
    /// `OPTIONS`
    Options,
}

/// Indexed by discriminant; keep in declaration order.
const VERB_TABLE: [(Method, &str); 7] = [
    (Method::Get, "GET"),
    (Method::Post, "POST"),
    (Method::Head, "HEAD"),
    (Method::Put, "PUT"),
    (Method::Delete, "DELETE"),
    (Method::Patch, "PATCH"),
    (Method::Options, "OPTIONS"),
];

impl Method {
    /// The verb as it appears on the request line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        VERB_TABLE[self as usize].1
    }

    /// Returns true for methods whose requests conventionally carry a body.
    #[must_use]
    pub fn expects_body(self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }
}

impl FromStr for Method {
    type Err = ConfigError;

    /// Parse a verb. Matching is exact: verbs are case-sensitive on the wire.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VERB_TABLE
            .iter()
            .find(|(_, verb)| *verb == s)
            .map(|(method, _)| *method)
            .ok_or_else(|| ConfigError::UnsupportedMethod {
                method: s.to_string(),
            })
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
