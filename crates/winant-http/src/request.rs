//! The request engine.
//!
//! [`HttpRequest`] owns the transport handles for one request, applies
//! headers and body content to them, and drives the blocking
//! send / status / headers / body sequence in [`HttpRequest::start`].
//!
//! # Lifecycle
//!
//! ```text
//! Created ─▶ Configured ─▶ Sent ─▶ HeadersReceived ─▶ BodyStreaming ─▶ Complete
//!                            │            │                  │
//!                            └────────────┴──────────────────┴──▶ Failed
//! ```
//!
//! A request is single use. Once `start` has been called, further setters
//! and a second `start` return [`Error::Misuse`].

use crate::builder::{Content, RequestDescriptor};
use crate::config::ClientConfig;
use crate::error::{Error, ProtocolError, TransportError};
use crate::resolve::{ResolvedUrl, resolve};
use crate::response::HttpResponse;
use crate::transport::{
    AddHeadersMode, Connection, ConnectionOf, RequestHandle, RequestOf, Session, Transport,
};
use log::{debug, trace, warn};
use winant_core::{Headers, JsonContent, LoadFlags, Method, Multipart, Payload, RequestContent, Url};

/// One step of response body delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadEvent<'a> {
    /// A chunk of body bytes.
    Chunk(&'a [u8]),
    /// The body is complete. Delivered once, after the last chunk.
    EndOfStream,
    /// Reading failed. Delivered once; no further events follow.
    Error(&'a TransportError),
}

impl ReadEvent<'_> {
    /// The event as a byte count: the chunk length, `0` at end of stream,
    /// `-1` on error.
    #[must_use]
    pub fn bytes_read(&self) -> isize {
        match self {
            Self::Chunk(data) => isize::try_from(data.len()).unwrap_or(isize::MAX),
            Self::EndOfStream => 0,
            Self::Error(_) => -1,
        }
    }
}

/// Callback invoked on the caller's thread for every [`ReadEvent`].
pub type ReadResponseHandler<'h> = Box<dyn FnMut(ReadEvent<'_>) + 'h>;

/// Where a request is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestState {
    /// Handles are open; nothing has been configured.
    Created,
    /// Headers or content have been applied.
    Configured,
    /// The request has been sent.
    Sent,
    /// Status and headers have been read.
    HeadersReceived,
    /// The body is being read.
    BodyStreaming,
    /// The response was fully received.
    Complete,
    /// The request failed after it was started.
    Failed,
}

impl RequestState {
    /// Returns true if the request has not been started.
    #[must_use]
    pub fn is_configurable(self) -> bool {
        matches!(self, Self::Created | Self::Configured)
    }
}

/// A single HTTP request bound to open transport handles.
///
/// The handles are acquired in session, connection, request order when the
/// request is opened, and released in the reverse order when it is dropped.
pub struct HttpRequest<'h, T: Transport> {
    // Fields drop in declaration order: request handle, connection, session.
    handle: RequestOf<T>,
    connection: ConnectionOf<T>,
    session: T::Session,
    method: Method,
    target: ResolvedUrl,
    body: Vec<u8>,
    load_flags: LoadFlags,
    read_handler: Option<ReadResponseHandler<'h>>,
    read_chunk_size: usize,
    state: RequestState,
}

impl<'h, T: Transport> HttpRequest<'h, T> {
    /// Resolve `url` and open the session, connection and request handles.
    ///
    /// If any step fails, the handles opened so far are released before
    /// the error is returned.
    pub fn open(
        transport: &T,
        config: &ClientConfig,
        method: Method,
        url: &Url,
    ) -> Result<Self, Error> {
        let target = resolve(url)?;

        let mut session = transport.open_session(config.user_agent())?;
        debug!("opened session, user agent {:?}", config.user_agent());

        let mut connection = session.open_connection(target.host(), target.port())?;
        debug!("opened connection to {}:{}", target.host(), target.port());

        let handle = connection.open_request(method, target.path(), target.is_secure())?;
        debug!(
            "opened {} request for {}://{}{}",
            method,
            target.scheme(),
            target.host(),
            target.path()
        );

        Ok(Self {
            handle,
            connection,
            session,
            method,
            target,
            body: Vec::new(),
            load_flags: config.default_load_flags(),
            read_handler: None,
            read_chunk_size: config.read_chunk_size(),
            state: RequestState::Created,
        })
    }

    /// Open a request and apply everything a built descriptor carries.
    pub fn from_descriptor(
        transport: &T,
        config: &ClientConfig,
        descriptor: RequestDescriptor<'h>,
    ) -> Result<Self, Error> {
        let RequestDescriptor {
            method,
            url,
            headers,
            content,
            load_flags,
            read_handler,
        } = descriptor;

        let mut request = Self::open(transport, config, method, &url)?;
        if !headers.is_empty() {
            request.set_headers(&headers)?;
        }
        match &content {
            Content::None => {}
            Content::Payload(payload) => request.set_payload(payload)?,
            Content::Json(json) => request.set_json(json)?,
            Content::Multipart(multipart) => request.set_multipart(multipart)?,
        }
        if let Some(flags) = load_flags {
            request.set_load_flags(flags)?;
        }
        if let Some(handler) = read_handler {
            request.set_read_handler(handler)?;
        }
        Ok(request)
    }

    /// The request method.
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    /// The resolved target.
    #[must_use]
    pub fn target(&self) -> &ResolvedUrl {
        &self.target
    }

    /// The current lifecycle state.
    #[must_use]
    pub fn state(&self) -> RequestState {
        self.state
    }

    /// The body that will be sent.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The load flags in effect.
    #[must_use]
    pub fn load_flags(&self) -> LoadFlags {
        self.load_flags
    }

    /// The open session handle.
    #[must_use]
    pub fn session(&self) -> &T::Session {
        &self.session
    }

    /// The open connection handle.
    #[must_use]
    pub fn connection(&self) -> &ConnectionOf<T> {
        &self.connection
    }

    /// Push a header block onto the request handle, replacing headers of
    /// the same name. An empty set is skipped.
    pub fn set_headers(&mut self, headers: &Headers) -> Result<(), Error> {
        self.ensure_configurable("set headers on a started request")?;
        if headers.is_empty() {
            return Ok(());
        }
        let block = headers.to_wire_string();
        trace!("adding header block {block:?}");
        self.handle.add_headers(&block, AddHeadersMode::Replace)?;
        self.state = RequestState::Configured;
        Ok(())
    }

    /// Use a form-urlencoded body.
    pub fn set_payload(&mut self, payload: &Payload) -> Result<(), Error> {
        self.set_content(payload.to_content())
    }

    /// Use a JSON body.
    pub fn set_json(&mut self, json: &JsonContent) -> Result<(), Error> {
        self.set_content(json.to_content())
    }

    /// Use a multipart body.
    pub fn set_multipart(&mut self, multipart: &Multipart) -> Result<(), Error> {
        self.set_content(multipart.to_content())
    }

    /// Use an already encoded body.
    ///
    /// The content type line replaces any `Content-Type` already on the
    /// handle and the body replaces any previously set body, so the last
    /// call wins.
    pub fn set_content(&mut self, content: RequestContent) -> Result<(), Error> {
        self.ensure_configurable("set content on a started request")?;
        let (content_type, body) = content.into_parts();
        self.handle
            .add_headers(&content_type, AddHeadersMode::Replace)?;
        debug!(
            "set request content: {} ({} bytes)",
            content_type.trim_end(),
            body.len()
        );
        self.body = body;
        self.state = RequestState::Configured;
        Ok(())
    }

    /// Change the load flags.
    pub fn set_load_flags(&mut self, flags: LoadFlags) -> Result<(), Error> {
        self.ensure_configurable("set load flags on a started request")?;
        self.load_flags = flags;
        self.state = RequestState::Configured;
        Ok(())
    }

    /// Register a callback that sees every body chunk as it arrives.
    pub fn set_read_handler(&mut self, handler: ReadResponseHandler<'h>) -> Result<(), Error> {
        self.ensure_configurable("set read handler on a started request")?;
        self.read_handler = Some(handler);
        self.state = RequestState::Configured;
        Ok(())
    }

    /// Send the request and read the whole response.
    ///
    /// Blocks until the body has been read to the end. Body chunks are
    /// passed to the read handler as they arrive; they are also kept in the
    /// returned response unless the load flags say otherwise.
    pub fn start(&mut self) -> Result<HttpResponse, Error> {
        self.ensure_configurable("request already started")?;
        match self.execute() {
            Ok(response) => {
                self.state = RequestState::Complete;
                debug!(
                    "{} {} completed with status {} ({} body bytes kept)",
                    self.method,
                    self.target.path(),
                    response.status_code(),
                    response.bytes().len()
                );
                Ok(response)
            }
            Err(e) => {
                self.state = RequestState::Failed;
                debug!("{} {} failed: {e}", self.method, self.target.path());
                Err(e)
            }
        }
    }

    fn execute(&mut self) -> Result<HttpResponse, Error> {
        debug!("sending {} body bytes", self.body.len());
        self.handle.send(&self.body)?;
        self.state = RequestState::Sent;

        let status_code = self.handle.status_code()?;
        let raw_headers = self.handle.raw_headers()?;
        let headers = parse_raw_headers(&raw_headers)?;
        self.state = RequestState::HeadersReceived;
        debug!("status {status_code}, {} response headers", headers.len());

        self.state = RequestState::BodyStreaming;
        let body = self.read_body()?;

        Ok(HttpResponse::new(status_code, headers, body))
    }

    fn read_body(&mut self) -> Result<Vec<u8>, Error> {
        let save = self.load_flags.saves_response_body();
        let mut body = Vec::new();
        let mut buf = vec![0u8; self.read_chunk_size];

        loop {
            match self.handle.read_chunk(&mut buf) {
                Ok(0) => {
                    if let Some(handler) = self.read_handler.as_mut() {
                        handler(ReadEvent::EndOfStream);
                    }
                    return Ok(body);
                }
                Ok(n) => {
                    let chunk = &buf[..n.min(buf.len())];
                    trace!("read {} body bytes", chunk.len());
                    if save {
                        body.extend_from_slice(chunk);
                    }
                    if let Some(handler) = self.read_handler.as_mut() {
                        handler(ReadEvent::Chunk(chunk));
                    }
                }
                Err(e) => {
                    warn!("response body read failed: {e}");
                    if let Some(handler) = self.read_handler.as_mut() {
                        handler(ReadEvent::Error(&e));
                    }
                    return Err(Error::StreamRead(e));
                }
            }
        }
    }

    fn ensure_configurable(&self, detail: &'static str) -> Result<(), Error> {
        if self.state.is_configurable() {
            Ok(())
        } else {
            Err(Error::Misuse { detail })
        }
    }
}

impl<T: Transport> std::fmt::Debug for HttpRequest<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("target", &self.target)
            .field("body_len", &self.body.len())
            .field("load_flags", &self.load_flags)
            .field("has_read_handler", &self.read_handler.is_some())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Parse a raw response header block.
///
/// The first line is the status line and is skipped. Every other non-empty
/// line is split on its first `": "`; a repeated name keeps the last value.
///
/// # Errors
///
/// Returns [`ProtocolError::MalformedHeaderLine`] for a line without the
/// delimiter.
pub fn parse_raw_headers(raw: &str) -> Result<Headers, ProtocolError> {
    let mut headers = Headers::new();
    for line in raw.split("\r\n").skip(1).filter(|l| !l.is_empty()) {
        let (name, value) = split_header_line(line)?;
        trace!("response header {name}: {value}");
        headers.set_header(name, value);
    }
    Ok(headers)
}

fn split_header_line(line: &str) -> Result<(&str, &str), ProtocolError> {
    const DELIM: &[u8] = b": ";
    let pos = memchr::memmem::find(line.as_bytes(), DELIM).ok_or_else(|| {
        ProtocolError::MalformedHeaderLine {
            line: line.to_string(),
        }
    })?;
    Ok((&line[..pos], &line[pos + DELIM.len()..]))
}
