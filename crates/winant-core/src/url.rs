//! Raw request address.

/// An unvalidated request address.
///
/// `Url` only carries the string it was built from. Splitting it into
/// scheme, host, port and path happens when a request is opened, and that
/// is where a malformed address is reported.
///
/// # Example
///
/// ```
/// use winant_core::Url;
///
/// let url = Url::new("http://example.com/get");
/// assert!(!url.is_empty());
/// assert_eq!(url.as_str(), "http://example.com/get");
/// assert!(Url::default().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Url {
    raw: String,
}

impl Url {
    /// Wrap a raw address.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// Returns true if no address was given.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// The address exactly as given.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Consume the wrapper, returning the raw address.
    #[must_use]
    pub fn into_string(self) -> String {
        self.raw
    }
}

impl From<&str> for Url {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Url {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl std::fmt::Display for Url {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
