//! Request builder and typed request options.
//!
//! A [`RequestBuilder`] collects [`RequestOption`]s in the order they are
//! applied and produces a [`RequestDescriptor`]:
//!
//! ```
//! use winant_http::{RequestBuilder, RequestOption};
//! use winant_core::{Method, Parameters, Payload, Url};
//!
//! let descriptor = RequestBuilder::new(Method::Post)
//!     .option(Url::from("http://example.com/submit"))
//!     .option(Parameters::from([("uid", "789")]))
//!     .option(Payload::from([("token", "abc")]))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(descriptor.url().as_str(), "http://example.com/submit?uid=789");
//! ```

use crate::request::{ReadEvent, ReadResponseHandler};
use winant_core::{
    ConfigError, Headers, JsonContent, LoadFlags, Method, Multipart, Parameters, Payload, Url,
};

// =============================================================================
// Options
// =============================================================================

/// One piece of request configuration.
///
/// Options are applied in order. The three body options (`Payload`, `Json`,
/// `Multipart`) overwrite each other, so only the last one applied is sent.
/// A repeated `Url`, `Headers`, `Parameters` or `LoadFlags` option replaces
/// the earlier value.
pub enum RequestOption<'h> {
    /// Target address.
    Url(Url),
    /// Request headers.
    Headers(Headers),
    /// Query string parameters.
    Parameters(Parameters),
    /// Form-urlencoded body.
    Payload(Payload),
    /// JSON body.
    Json(JsonContent),
    /// Multipart body.
    Multipart(Multipart),
    /// Load flags for this request.
    LoadFlags(LoadFlags),
    /// Streaming body callback.
    ReadHandler(ReadResponseHandler<'h>),
}

impl std::fmt::Debug for RequestOption<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => f.debug_tuple("Url").field(url).finish(),
            Self::Headers(headers) => f.debug_tuple("Headers").field(headers).finish(),
            Self::Parameters(params) => f.debug_tuple("Parameters").field(params).finish(),
            Self::Payload(payload) => f.debug_tuple("Payload").field(payload).finish(),
            Self::Json(json) => f.debug_tuple("Json").field(json).finish(),
            Self::Multipart(multipart) => f.debug_tuple("Multipart").field(multipart).finish(),
            Self::LoadFlags(flags) => f.debug_tuple("LoadFlags").field(flags).finish(),
            Self::ReadHandler(_) => f.write_str("ReadHandler(..)"),
        }
    }
}

macro_rules! impl_from_option {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for RequestOption<'_> {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from_option! {
    Url => Url,
    Headers => Headers,
    Parameters => Parameters,
    Payload => Payload,
    JsonContent => Json,
    Multipart => Multipart,
    LoadFlags => LoadFlags,
}

impl<'h> From<ReadResponseHandler<'h>> for RequestOption<'h> {
    fn from(handler: ReadResponseHandler<'h>) -> Self {
        Self::ReadHandler(handler)
    }
}

/// Wrap a closure as a read handler option.
pub fn read_handler<'h, F>(handler: F) -> RequestOption<'h>
where
    F: FnMut(ReadEvent<'_>) + 'h,
{
    RequestOption::ReadHandler(Box::new(handler))
}

// =============================================================================
// Descriptor
// =============================================================================

/// The body selected for a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Content {
    /// No body.
    #[default]
    None,
    /// Form-urlencoded body.
    Payload(Payload),
    /// JSON body.
    Json(JsonContent),
    /// Multipart body.
    Multipart(Multipart),
}

impl Content {
    /// Returns true if no body was selected.
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// A fully configured request, ready to be opened on a transport.
pub struct RequestDescriptor<'h> {
    pub(crate) method: Method,
    pub(crate) url: Url,
    pub(crate) headers: Headers,
    pub(crate) content: Content,
    pub(crate) load_flags: Option<LoadFlags>,
    pub(crate) read_handler: Option<ReadResponseHandler<'h>>,
}

impl RequestDescriptor<'_> {
    /// The request method.
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    /// The final URL, query string included.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The caller's headers.
    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// The selected body.
    #[must_use]
    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Load flags, if the request set its own.
    #[must_use]
    pub fn load_flags(&self) -> Option<LoadFlags> {
        self.load_flags
    }

    /// Returns true if a read handler was supplied.
    #[must_use]
    pub fn has_read_handler(&self) -> bool {
        self.read_handler.is_some()
    }
}

impl std::fmt::Debug for RequestDescriptor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestDescriptor")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("content", &self.content)
            .field("load_flags", &self.load_flags)
            .field("has_read_handler", &self.read_handler.is_some())
            .finish()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Accumulates options for one request.
pub struct RequestBuilder<'h> {
    method: Method,
    url: Url,
    headers: Headers,
    parameters: Parameters,
    content: Content,
    load_flags: Option<LoadFlags>,
    read_handler: Option<ReadResponseHandler<'h>>,
}

impl std::fmt::Debug for RequestBuilder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("parameters", &self.parameters)
            .field("content", &self.content)
            .field("load_flags", &self.load_flags)
            .field("has_read_handler", &self.read_handler.is_some())
            .finish()
    }
}

impl<'h> RequestBuilder<'h> {
    /// Start a request with `method`.
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self {
            method,
            url: Url::default(),
            headers: Headers::new(),
            parameters: Parameters::new(),
            content: Content::None,
            load_flags: None,
            read_handler: None,
        }
    }

    /// The request method.
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    /// Apply one option.
    pub fn set_option(&mut self, option: impl Into<RequestOption<'h>>) -> &mut Self {
        match option.into() {
            RequestOption::Url(url) => self.url = url,
            RequestOption::Headers(headers) => self.headers = headers,
            RequestOption::Parameters(parameters) => self.parameters = parameters,
            RequestOption::Payload(payload) => self.content = Content::Payload(payload),
            RequestOption::Json(json) => self.content = Content::Json(json),
            RequestOption::Multipart(multipart) => self.content = Content::Multipart(multipart),
            RequestOption::LoadFlags(flags) => self.load_flags = Some(flags),
            RequestOption::ReadHandler(handler) => self.read_handler = Some(handler),
        }
        self
    }

    /// Apply one option, by value.
    #[must_use]
    pub fn option(mut self, option: impl Into<RequestOption<'h>>) -> Self {
        self.set_option(option);
        self
    }

    /// Apply several options in order.
    #[must_use]
    pub fn options<I>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = RequestOption<'h>>,
    {
        for option in options {
            self.set_option(option);
        }
        self
    }

    /// Produce the request descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyUrl`] if no URL was set.
    pub fn build(self) -> Result<RequestDescriptor<'h>, ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::EmptyUrl);
        }

        let query = self.parameters.to_query_string();
        let url = append_query(self.url, &query);

        Ok(RequestDescriptor {
            method: self.method,
            url,
            headers: self.headers,
            content: self.content,
            load_flags: self.load_flags,
            read_handler: self.read_handler,
        })
    }
}

/// Append an encoded query string to `base`, ahead of any fragment.
fn append_query(base: Url, query: &str) -> Url {
    if query.is_empty() {
        return base;
    }

    let raw = base.into_string();
    let (head, fragment) = match raw.find('#') {
        Some(pos) => raw.split_at(pos),
        None => (raw.as_str(), ""),
    };
    let separator = if head.contains('?') { '&' } else { '?' };

    let mut out = String::with_capacity(raw.len() + query.len() + 1);
    out.push_str(head);
    out.push(separator);
    out.push_str(query);
    out.push_str(fragment);
    Url::new(out)
}
