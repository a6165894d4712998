//! Transport capabilities consumed by the request engine.
//!
//! The engine never touches sockets itself. It drives a three-level handle
//! hierarchy through these traits:
//!
//! ```text
//! Transport ──open_session──▶ Session ──open_connection──▶ Connection
//!                                                  │
//!                                          open_request
//!                                                  ▼
//!                                            RequestHandle
//! ```
//!
//! Handles release their resources on `Drop`. The engine holds all three
//! and drops them request-first, so a session always outlives its
//! connection and a connection always outlives its request handle.

use crate::error::TransportError;
use winant_core::Method;

/// How [`RequestHandle::add_headers`] merges a header block with headers
/// already on the handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddHeadersMode {
    /// Append, keeping any existing header of the same name.
    Add,
    /// Append only headers whose name is not present yet.
    AddIfNew,
    /// Replace existing headers of the same name.
    Replace,
}

/// Entry point of a transport: opens sessions.
pub trait Transport {
    /// Session handle type.
    type Session: Session;

    /// Open a session identifying itself with `user_agent`.
    fn open_session(&self, user_agent: &str) -> Result<Self::Session, TransportError>;
}

/// An open session: opens connections to hosts.
pub trait Session {
    /// Connection handle type.
    type Connection: Connection;

    /// Open a connection to `host:port`.
    fn open_connection(&mut self, host: &str, port: u16)
    -> Result<Self::Connection, TransportError>;
}

/// An open connection: opens request handles.
pub trait Connection {
    /// Request handle type.
    type Request: RequestHandle;

    /// Open a request for `path` (including any query string).
    ///
    /// `secure` asks for TLS.
    fn open_request(
        &mut self,
        method: Method,
        path: &str,
        secure: bool,
    ) -> Result<Self::Request, TransportError>;
}

/// An in-flight request.
pub trait RequestHandle {
    /// Merge a CRLF-delimited header block into the request headers.
    fn add_headers(&mut self, block: &str, mode: AddHeadersMode) -> Result<(), TransportError>;

    /// Send the request with `body` (possibly empty).
    fn send(&mut self, body: &[u8]) -> Result<(), TransportError>;

    /// The numeric response status code.
    fn status_code(&mut self) -> Result<u16, TransportError>;

    /// The raw response header block, CRLF-delimited, status line first.
    fn raw_headers(&mut self) -> Result<String, TransportError>;

    /// Read up to `buf.len()` body bytes. `Ok(0)` means the body is complete.
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;
}

/// The connection type a transport's sessions open.
pub type ConnectionOf<T> = <<T as Transport>::Session as Session>::Connection;

/// The request handle type a transport's connections open.
pub type RequestOf<T> = <ConnectionOf<T> as Connection>::Request;

/// Iterate the non-empty `(name, value)` lines of a header block.
///
/// Used by transports to apply [`RequestHandle::add_headers`]. A line
/// without a `:` is returned as `Err(line)`.
pub fn header_block_lines(block: &str) -> impl Iterator<Item = Result<(&str, &str), &str>> {
    block
        .split("\r\n")
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.split_once(':')
                .map(|(name, value)| (name, value.trim_start()))
                .ok_or(line)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_block_lines_split() {
        let lines: Vec<_> = header_block_lines("a: 1\r\nb:\r\nc: x: y\r\n\r\n").collect();
        assert_eq!(lines, vec![Ok(("a", "1")), Ok(("b", "")), Ok(("c", "x: y"))]);
    }

    #[test]
    fn header_block_lines_reports_bad_line() {
        let lines: Vec<_> = header_block_lines("good: 1\r\nbad\r\n").collect();
        assert_eq!(lines, vec![Ok(("good", "1")), Err("bad")]);
    }
}
