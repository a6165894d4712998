//! Blocking request engine for winant.
//!
//! This crate turns the content model of `winant-core` into HTTP exchanges:
//!
//! - [`RequestBuilder`] collects [`RequestOption`]s into a
//!   [`RequestDescriptor`]
//! - [`HttpRequest`] resolves the URL, opens transport handles, applies
//!   headers and content, and runs the send / status / headers / body
//!   sequence
//! - [`HttpResponse`] carries the status, headers and accumulated body
//!
//! The engine talks to the network only through the [`transport`] traits.
//! [`TcpTransport`] implements them over plain TCP; [`testing::MockTransport`]
//! implements them in memory.
//!
//! # Streaming
//!
//! A read handler sees each body chunk as it arrives, then exactly one
//! terminal event:
//!
//! ```
//! use winant_http::testing::{MockResponse, MockTransport};
//! use winant_http::{ClientConfig, HttpRequest, ReadEvent, RequestBuilder, read_handler};
//! use winant_core::{LoadFlags, Method, Url};
//!
//! let transport = MockTransport::new(
//!     MockResponse::new(200).with_chunk("abc").with_chunk("de"),
//! );
//! let mut sizes = Vec::new();
//! let descriptor = RequestBuilder::new(Method::Get)
//!     .option(Url::from("http://example.com/stream"))
//!     .option(LoadFlags::DO_NOT_SAVE_RESPONSE_BODY)
//!     .option(read_handler(|event: ReadEvent<'_>| sizes.push(event.bytes_read())))
//!     .build()
//!     .unwrap();
//!
//! let mut request =
//!     HttpRequest::from_descriptor(&transport, &ClientConfig::default(), descriptor).unwrap();
//! let response = request.start().unwrap();
//! drop(request);
//!
//! assert!(response.bytes().is_empty());
//! assert_eq!(sizes, vec![3, 2, 0]);
//! ```

#![forbid(unsafe_code)]

mod builder;
pub mod chunked;
mod config;
pub mod error;
mod request;
mod resolve;
mod response;
pub mod tcp;
pub mod testing;
pub mod transport;

pub use builder::{Content, RequestBuilder, RequestDescriptor, RequestOption, read_handler};
pub use config::{ClientConfig, DEFAULT_READ_CHUNK_SIZE, DEFAULT_USER_AGENT};
pub use error::{Error, ProtocolError, TransportError, TransportOp};
pub use request::{HttpRequest, ReadEvent, ReadResponseHandler, RequestState, parse_raw_headers};
pub use resolve::{ResolvedUrl, resolve};
pub use response::HttpResponse;
pub use tcp::TcpTransport;
pub use transport::{AddHeadersMode, Connection, RequestHandle, Session, Transport};
