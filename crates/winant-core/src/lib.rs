//! Request content types for winant.
//!
//! This crate holds the data model of an HTTP request and the encoders that
//! turn it into wire bytes:
//! - [`Url`], [`Method`] and [`LoadFlags`]
//! - [`Headers`], serialized as a CRLF header block
//! - [`Parameters`] for query strings and [`Payload`] for form bodies
//! - [`JsonContent`] and [`Multipart`] bodies
//!
//! Every body encoder produces a [`RequestContent`]: the `Content-Type`
//! header line paired with the encoded bytes.
//!
//! Nothing here performs I/O on the network; see `winant-http` for the
//! request engine.

#![forbid(unsafe_code)]

mod content;
pub mod error;
mod flags;
mod form;
mod headers;
mod method;
pub mod multipart;
mod url;

pub use content::{JSON_CONTENT_TYPE, JsonContent, RequestContent};
pub use error::ConfigError;
pub use flags::LoadFlags;
pub use form::{FORM_CONTENT_TYPE, Parameters, Payload, percent_encode};
pub use headers::{HeaderIter, Headers};
pub use method::Method;
pub use multipart::{DEFAULT_MIME_TYPE, Multipart, MultipartFile};
pub use url::Url;
