//! URL resolution: splitting a raw address into what the transport needs.

use winant_core::{ConfigError, Url};

/// A URL decomposed into connection and request parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUrl {
    host: String,
    port: u16,
    path: String,
    secure: bool,
}

impl ResolvedUrl {
    /// Host name or address literal (IPv6 literals keep their brackets).
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port, defaulting to 80 for `http` and 443 for `https`.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Path plus `?query`, as sent on the request line.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns true for `https`.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// The scheme name.
    #[must_use]
    pub fn scheme(&self) -> &'static str {
        if self.secure { "https" } else { "http" }
    }
}

/// Split a URL into host, port, path and security.
///
/// # Errors
///
/// - [`ConfigError::EmptyUrl`] for an empty address
/// - [`ConfigError::InvalidUrl`] if the address does not parse
/// - [`ConfigError::UnsupportedScheme`] for anything but `http` / `https`
/// - [`ConfigError::MissingHost`] if no host is present
pub fn resolve(url: &Url) -> Result<ResolvedUrl, ConfigError> {
    if url.is_empty() {
        return Err(ConfigError::EmptyUrl);
    }

    let parsed = url::Url::parse(url.as_str()).map_err(|e| ConfigError::InvalidUrl {
        url: url.as_str().to_string(),
        detail: e.to_string(),
    })?;

    let secure = match parsed.scheme() {
        "http" => false,
        "https" => true,
        other => {
            return Err(ConfigError::UnsupportedScheme {
                scheme: other.to_string(),
            });
        }
    };

    let host = parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or(ConfigError::MissingHost)?
        .to_string();
    let port = parsed
        .port_or_known_default()
        .unwrap_or(if secure { 443 } else { 80 });

    let mut path = parsed.path().to_string();
    if let Some(query) = parsed.query() {
        path.push('?');
        path.push_str(query);
    }

    Ok(ResolvedUrl {
        host,
        port,
        path,
        secure,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_http_defaults() {
        let resolved = resolve(&Url::from("http://example.com")).unwrap();
        assert_eq!(resolved.host(), "example.com");
        assert_eq!(resolved.port(), 80);
        assert_eq!(resolved.path(), "/");
        assert!(!resolved.is_secure());
        assert_eq!(resolved.scheme(), "http");
    }

    #[test]
    fn resolves_https_with_port_path_and_query() {
        let resolved = resolve(&Url::from("https://api.example.com:8443/v1/items?id=7&x=a%20b")).unwrap();
        assert_eq!(resolved.host(), "api.example.com");
        assert_eq!(resolved.port(), 8443);
        assert_eq!(resolved.path(), "/v1/items?id=7&x=a%20b");
        assert!(resolved.is_secure());
    }

    #[test]
    fn https_default_port() {
        let resolved = resolve(&Url::from("https://httpbin.org/get")).unwrap();
        assert_eq!(resolved.port(), 443);
    }

    #[test]
    fn ipv6_literal_keeps_brackets() {
        let resolved = resolve(&Url::from("http://[::1]:8080/x")).unwrap();
        assert_eq!(resolved.host(), "[::1]");
        assert_eq!(resolved.port(), 8080);
    }

    #[test]
    fn fragment_is_not_sent() {
        let resolved = resolve(&Url::from("http://example.com/a?b=1#frag")).unwrap();
        assert_eq!(resolved.path(), "/a?b=1");
    }

    #[test]
    fn empty_url_is_rejected() {
        assert_eq!(resolve(&Url::default()), Err(ConfigError::EmptyUrl));
    }

    #[test]
    fn garbage_is_rejected() {
        let err = resolve(&Url::from("not a url")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn unsupported_scheme_is_rejected() {
        let err = resolve(&Url::from("ftp://example.com/file")).unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnsupportedScheme {
                scheme: "ftp".into()
            }
        );
    }

    #[test]
    fn missing_host_is_rejected() {
        // Special schemes require a host, so the parser itself refuses.
        let err = resolve(&Url::from("http://")).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidUrl { .. } | ConfigError::MissingHost
        ));
    }
}
