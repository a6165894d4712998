//! Configuration errors.
//!
//! Everything that can be wrong with a request before any transport handle
//! is opened lands here: unusable addresses, unknown verbs, and JSON bodies
//! that fail to serialize.

/// An error in how a request was configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No URL was supplied.
    EmptyUrl,
    /// The URL could not be decomposed into scheme, host, port and path.
    InvalidUrl {
        /// The raw address as given.
        url: String,
        /// Parser diagnostic.
        detail: String,
    },
    /// The URL scheme is neither `http` nor `https`.
    UnsupportedScheme {
        /// The scheme found in the URL.
        scheme: String,
    },
    /// The URL has no host component.
    MissingHost,
    /// The request method is not one of the supported verbs.
    UnsupportedMethod {
        /// The verb as given.
        method: String,
    },
    /// A value could not be serialized to JSON.
    Json {
        /// Serializer diagnostic.
        detail: String,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "request URL is empty"),
            Self::InvalidUrl { url, detail } => write!(f, "invalid URL '{url}': {detail}"),
            Self::UnsupportedScheme { scheme } => {
                write!(f, "unsupported URL scheme '{scheme}' (expected http or https)")
            }
            Self::MissingHost => write!(f, "URL has no host"),
            Self::UnsupportedMethod { method } => write!(f, "unsupported HTTP method '{method}'"),
            Self::Json { detail } => write!(f, "JSON serialization failed: {detail}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json {
            detail: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(ConfigError::EmptyUrl.to_string(), "request URL is empty");
        assert_eq!(
            ConfigError::UnsupportedScheme {
                scheme: "ftp".into()
            }
            .to_string(),
            "unsupported URL scheme 'ftp' (expected http or https)"
        );
        assert_eq!(
            ConfigError::UnsupportedMethod {
                method: "BREW".into()
            }
            .to_string(),
            "unsupported HTTP method 'BREW'"
        );
    }

    #[test]
    fn json_error_converts() {
        let err = serde_json::from_str::<u32>("nope").unwrap_err();
        let config: ConfigError = err.into();
        assert!(matches!(config, ConfigError::Json { .. }));
    }
}
