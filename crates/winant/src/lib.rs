//! Small blocking HTTP client.
//!
//! winant sends one request at a time and hands back the whole response:
//!
//! - **Typed options** — URL, headers, query parameters and a body are
//!   passed as [`RequestOption`]s; the last body option wins
//! - **Wire-exact encoders** — form, JSON and multipart bodies are encoded
//!   by `winant-core` and can be inspected before sending
//! - **Streaming** — a read handler sees every body chunk as it arrives
//! - **Pluggable transport** — plain TCP by default, an in-memory mock for
//!   tests
//!
//! # Quick Start
//!
//! ```no_run
//! use winant::{Parameters, Url, options};
//!
//! let response = winant::get(options![
//!     Url::from("http://httpbin.org/get"),
//!     Parameters::from([("access_key", "token123"), ("uid", "789")]),
//! ])?;
//!
//! println!("{} {}", response.status_code(), response.text());
//! # Ok::<(), winant::Error>(())
//! ```
//!
//! # Crate Structure
//!
//! - [`winant_core`] — request content model and encoders
//! - [`winant_http`] — request engine, transports and response

#![forbid(unsafe_code)]

mod client;

pub use winant_core as core;
pub use winant_http as http;

pub use client::{Client, get, head, post, request, request_with};

pub use winant_core::{
    ConfigError, Headers, JsonContent, LoadFlags, Method, Multipart, MultipartFile, Parameters,
    Payload, RequestContent, Url,
};
pub use winant_http::{
    ClientConfig, Error, HttpRequest, HttpResponse, ReadEvent, ReadResponseHandler,
    RequestBuilder, RequestOption, TcpTransport, read_handler,
};

/// Build a list of [`RequestOption`]s from values convertible into them.
///
/// ```
/// use winant::{Headers, Url, options};
///
/// let opts = options![
///     Url::from("http://example.com/"),
///     Headers::from([("Accept", "application/json")]),
/// ];
/// assert_eq!(opts.len(), 2);
/// ```
#[macro_export]
macro_rules! options {
    ($($option:expr),* $(,)?) => {{
        let options: ::std::vec::Vec<$crate::RequestOption<'_>> =
            ::std::vec![$($crate::RequestOption::from($option)),*];
        options
    }};
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        Client, ClientConfig, Error, Headers, HttpResponse, JsonContent, LoadFlags, Method,
        Multipart, MultipartFile, Parameters, Payload, ReadEvent, RequestOption, Url, options,
        read_handler,
    };
}

/// Testing utilities module.
pub mod testing {
    pub use winant_http::testing::{Call, CallLog, HandleKind, MockResponse, MockTransport};
}
