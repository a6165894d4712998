//! Plain-TCP HTTP/1.1 transport.
//!
//! Every request uses its own connection and sends `Connection: close`.
//! TLS is not available: opening a request with `secure` set fails.

use crate::chunked::ChunkedDecoder;
use crate::error::{TransportError, TransportOp};
use crate::transport::{
    AddHeadersMode, Connection, RequestHandle, Session, Transport, header_block_lines,
};
use log::{debug, trace};
use std::fmt::Write as _;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;
use winant_core::Method;

/// Largest response head accepted (64KB).
const MAX_HEAD_LEN: usize = 64 * 1024;

/// Headers the transport writes itself; caller copies are dropped.
const MANAGED_HEADERS: [&str; 4] = ["Host", "Content-Length", "Transfer-Encoding", "Connection"];

// =============================================================================
// Transport / session / connection
// =============================================================================

/// Opens plain TCP connections.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpTransport {
    timeout: Option<Duration>,
}

impl TcpTransport {
    /// Create a transport without timeouts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `timeout` to connecting, reading and writing.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The configured timeout.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Transport for TcpTransport {
    type Session = TcpSession;

    fn open_session(&self, user_agent: &str) -> Result<TcpSession, TransportError> {
        Ok(TcpSession {
            user_agent: user_agent.to_string(),
            timeout: self.timeout,
        })
    }
}

/// Session state: the user agent and timeout.
#[derive(Debug)]
pub struct TcpSession {
    user_agent: String,
    timeout: Option<Duration>,
}

impl Session for TcpSession {
    type Connection = TcpConnection;

    fn open_connection(&mut self, host: &str, port: u16) -> Result<TcpConnection, TransportError> {
        let stream = connect(host, port, self.timeout)
            .map_err(|e| TransportError::from_io(TransportOp::OpenConnection, &e))?;
        debug!("connected to {host}:{port}");
        Ok(TcpConnection {
            stream,
            host_header: host_header(host, port),
            user_agent: self.user_agent.clone(),
        })
    }
}

fn connect(host: &str, port: u16, timeout: Option<Duration>) -> io::Result<TcpStream> {
    let bare_host = host.trim_start_matches('[').trim_end_matches(']');
    let addresses: Vec<SocketAddr> = (bare_host, port).to_socket_addrs()?.collect();

    let stream = match timeout {
        Some(timeout) => connect_timeout(&addresses, timeout)?,
        None => TcpStream::connect(&addresses[..])?,
    };
    stream.set_read_timeout(timeout)?;
    stream.set_write_timeout(timeout)?;
    Ok(stream)
}

fn connect_timeout(addresses: &[SocketAddr], timeout: Duration) -> io::Result<TcpStream> {
    let mut error = io::Error::new(io::ErrorKind::InvalidInput, "host resolved to no addresses");
    for address in addresses {
        match TcpStream::connect_timeout(address, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => error = e,
        }
    }
    Err(error)
}

fn host_header(host: &str, port: u16) -> String {
    if port == 80 {
        host.to_string()
    } else {
        format!("{host}:{port}")
    }
}

/// An open TCP connection to one host.
#[derive(Debug)]
pub struct TcpConnection {
    stream: TcpStream,
    host_header: String,
    user_agent: String,
}

impl Connection for TcpConnection {
    type Request = TcpRequest;

    fn open_request(
        &mut self,
        method: Method,
        path: &str,
        secure: bool,
    ) -> Result<TcpRequest, TransportError> {
        if secure {
            return Err(TransportError::new(
                TransportOp::OpenRequest,
                "TLS is not supported by the TCP transport",
            ));
        }
        let stream = self
            .stream
            .try_clone()
            .map_err(|e| TransportError::from_io(TransportOp::OpenRequest, &e))?;
        Ok(TcpRequest {
            stream: Some(stream),
            method,
            path: path.to_string(),
            host_header: self.host_header.clone(),
            user_agent: self.user_agent.clone(),
            headers: HeaderList::default(),
            head: None,
            body: None,
        })
    }
}

// =============================================================================
// Request handle
// =============================================================================

/// Ordered request headers with case-insensitive merge rules.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct HeaderList {
    entries: Vec<(String, String)>,
}

impl HeaderList {
    fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    fn apply(&mut self, block: &str, mode: AddHeadersMode) -> Result<(), TransportError> {
        for line in header_block_lines(block) {
            let (name, value) = line.map_err(|line| {
                TransportError::new(
                    TransportOp::AddHeaders,
                    format!("malformed header line {line:?}"),
                )
            })?;
            match mode {
                AddHeadersMode::Add => {}
                AddHeadersMode::AddIfNew => {
                    if self.contains(name) {
                        continue;
                    }
                }
                AddHeadersMode::Replace => {
                    self.entries.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
                }
            }
            self.entries.push((name.to_string(), value.to_string()));
        }
        Ok(())
    }
}

/// Parsed response head.
#[derive(Debug)]
struct ResponseHead {
    raw: String,
    status: Option<u16>,
}

/// Body framing chosen from the response head.
enum BodyReader {
    Empty,
    Fixed(io::Take<BufReader<TcpStream>>),
    Chunked(ChunkedDecoder<BufReader<TcpStream>>),
    UntilClose(BufReader<TcpStream>),
}

impl Read for BodyReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Empty => Ok(0),
            Self::Fixed(reader) => {
                let n = reader.read(buf)?;
                if n == 0 && reader.limit() > 0 && !buf.is_empty() {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("connection closed with {} body bytes missing", reader.limit()),
                    ));
                }
                Ok(n)
            }
            Self::Chunked(decoder) => decoder.read(buf),
            Self::UntilClose(reader) => reader.read(buf),
        }
    }
}

/// One HTTP/1.1 exchange on a [`TcpConnection`].
pub struct TcpRequest {
    stream: Option<TcpStream>,
    method: Method,
    path: String,
    host_header: String,
    user_agent: String,
    headers: HeaderList,
    head: Option<ResponseHead>,
    body: Option<BodyReader>,
}

impl std::fmt::Debug for TcpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("host", &self.host_header)
            .field("headers", &self.headers)
            .field("sent", &self.stream.is_none())
            .finish_non_exhaustive()
    }
}

impl TcpRequest {
    fn write_head(&self, body_len: usize) -> String {
        let mut head = String::with_capacity(256);
        let _ = write!(head, "{} {} HTTP/1.1\r\n", self.method, self.path);
        let _ = write!(head, "Host: {}\r\n", self.host_header);
        if !self.headers.contains("User-Agent") {
            let _ = write!(head, "User-Agent: {}\r\n", self.user_agent);
        }
        if body_len > 0 || self.method.expects_body() {
            let _ = write!(head, "Content-Length: {body_len}\r\n");
        }
        head.push_str("Connection: close\r\n");
        for (name, value) in &self.headers.entries {
            if MANAGED_HEADERS.iter().any(|m| m.eq_ignore_ascii_case(name)) {
                continue;
            }
            if value.is_empty() {
                let _ = write!(head, "{name}:\r\n");
            } else {
                let _ = write!(head, "{name}: {value}\r\n");
            }
        }
        head.push_str("\r\n");
        head
    }

    fn head(&self, op: TransportOp) -> Result<&ResponseHead, TransportError> {
        self.head
            .as_ref()
            .ok_or_else(|| TransportError::new(op, "request has not been sent"))
    }
}

impl RequestHandle for TcpRequest {
    fn add_headers(&mut self, block: &str, mode: AddHeadersMode) -> Result<(), TransportError> {
        if self.stream.is_none() {
            return Err(TransportError::new(
                TransportOp::AddHeaders,
                "request has already been sent",
            ));
        }
        self.headers.apply(block, mode)
    }

    fn send(&mut self, body: &[u8]) -> Result<(), TransportError> {
        let mut stream = self
            .stream
            .take()
            .ok_or_else(|| TransportError::new(TransportOp::Send, "request has already been sent"))?;
        let to_send_err = |e: io::Error| TransportError::from_io(TransportOp::Send, &e);

        let head = self.write_head(body.len());
        trace!("request head {head:?}");
        stream.write_all(head.as_bytes()).map_err(to_send_err)?;
        stream.write_all(body).map_err(to_send_err)?;
        stream.flush().map_err(to_send_err)?;

        let mut reader = BufReader::new(stream);
        let raw = read_head(&mut reader).map_err(to_send_err)?;
        let status = raw.lines().next().and_then(parse_status_line);
        debug!("response head received, status {status:?}");

        let framing = choose_framing(self.method, status, &raw).map_err(to_send_err)?;
        self.body = Some(match framing {
            Framing::Empty => BodyReader::Empty,
            Framing::Length(len) => BodyReader::Fixed(reader.take(len)),
            Framing::Chunked => BodyReader::Chunked(ChunkedDecoder::new(reader)),
            Framing::UntilClose => BodyReader::UntilClose(reader),
        });
        self.head = Some(ResponseHead { raw, status });
        Ok(())
    }

    fn status_code(&mut self) -> Result<u16, TransportError> {
        let head = self.head(TransportOp::QueryStatus)?;
        head.status.ok_or_else(|| {
            let line = head.raw.lines().next().unwrap_or_default();
            TransportError::new(
                TransportOp::QueryStatus,
                format!("malformed status line {line:?}"),
            )
        })
    }

    fn raw_headers(&mut self) -> Result<String, TransportError> {
        Ok(self.head(TransportOp::QueryHeaders)?.raw.clone())
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let body = self
            .body
            .as_mut()
            .ok_or_else(|| TransportError::new(TransportOp::ReadBody, "request has not been sent"))?;
        body.read(buf)
            .map_err(|e| TransportError::from_io(TransportOp::ReadBody, &e))
    }
}

// =============================================================================
// Response head
// =============================================================================

/// Read the status line and header lines up to the empty line.
///
/// Lines are returned CRLF-terminated even if the peer used bare LF, and
/// header lines are rewritten as `name: value`.
fn read_head<R: BufRead>(reader: &mut R) -> io::Result<String> {
    let mut raw = String::new();
    let mut line = Vec::new();
    loop {
        line.clear();
        let n = reader
            .by_ref()
            .take(MAX_HEAD_LEN.saturating_sub(raw.len()) as u64 + 1)
            .read_until(b'\n', &mut line)?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed before the response head was complete",
            ));
        }
        if !line.ends_with(b"\n") {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "response head larger than 64KB",
            ));
        }
        line.pop();
        if line.ends_with(b"\r") {
            line.pop();
        }
        if line.is_empty() {
            // Interim 1xx responses are skipped.
            let status = raw.lines().next().and_then(parse_status_line);
            if status.is_some_and(|s| (100..200).contains(&s) && s != 101) {
                raw.clear();
                continue;
            }
            return Ok(raw);
        }
        let text = std::str::from_utf8(&line)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "response head is not UTF-8"))?;
        if raw.is_empty() {
            raw.push_str(text);
        } else {
            push_header_line(&mut raw, text);
        }
        raw.push_str("\r\n");
    }
}

/// Append a header line as `name: value`, whatever whitespace the peer put
/// after the colon. Lines without a colon are kept verbatim.
fn push_header_line(raw: &mut String, line: &str) {
    match line.split_once(':') {
        Some((name, value)) => {
            raw.push_str(name);
            raw.push_str(": ");
            raw.push_str(value.trim());
        }
        None => raw.push_str(line),
    }
}

/// Parse `HTTP/1.x NNN reason` into the status code.
fn parse_status_line(line: &str) -> Option<u16> {
    let mut parts = line.splitn(3, ' ');
    if !parts.next()?.starts_with("HTTP/") {
        return None;
    }
    let code = parts.next()?;
    if code.len() != 3 {
        return None;
    }
    code.parse().ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Framing {
    Empty,
    Length(u64),
    Chunked,
    UntilClose,
}

fn choose_framing(method: Method, status: Option<u16>, raw: &str) -> io::Result<Framing> {
    if method == Method::Head || status.is_some_and(|s| s < 200 || s == 204 || s == 304) {
        return Ok(Framing::Empty);
    }

    let mut content_length = None;
    for (name, value) in raw.lines().skip(1).filter_map(|l| l.split_once(':')) {
        let value = value.trim();
        if name.eq_ignore_ascii_case("Transfer-Encoding") {
            if value
                .rsplit(',')
                .next()
                .is_some_and(|c| c.trim().eq_ignore_ascii_case("chunked"))
            {
                return Ok(Framing::Chunked);
            }
        } else if name.eq_ignore_ascii_case("Content-Length") {
            let len = value.parse().map_err(|_| {
                io::Error::new(io::ErrorKind::InvalidData, format!("invalid Content-Length {value:?}"))
            })?;
            content_length = Some(len);
        }
    }

    Ok(content_length.map_or(Framing::UntilClose, Framing::Length))
}
