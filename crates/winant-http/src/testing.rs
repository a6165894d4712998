//! Scripted in-memory transport for tests.
//!
//! [`MockTransport`] answers every request with a canned [`MockResponse`]
//! and records each capability call, including handle release, in a shared
//! [`CallLog`]:
//!
//! ```
//! use winant_http::testing::{Call, HandleKind, MockResponse, MockTransport};
//! use winant_http::{ClientConfig, HttpRequest};
//! use winant_core::{Method, Url};
//!
//! let transport = MockTransport::new(MockResponse::new(200).with_body("ok"));
//! let mut request = HttpRequest::open(
//!     &transport,
//!     &ClientConfig::default(),
//!     Method::Get,
//!     &Url::from("http://example.com/"),
//! )
//! .unwrap();
//! let response = request.start().unwrap();
//! assert_eq!(response.text(), "ok");
//!
//! drop(request);
//! assert_eq!(
//!     transport.calls().last(),
//!     Some(&Call::Release(HandleKind::Session))
//! );
//! ```

use crate::error::{TransportError, TransportOp};
use crate::transport::{AddHeadersMode, Connection, RequestHandle, Session, Transport};
use parking_lot::Mutex;
use std::sync::Arc;
use winant_core::Method;

/// Error code attached to injected failures.
pub const INJECTED_ERROR_CODE: i32 = 12029;

/// Which handle was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    /// A session handle.
    Session,
    /// A connection handle.
    Connection,
    /// A request handle.
    Request,
}

/// One recorded transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// `open_session`.
    OpenSession {
        /// User agent passed in.
        user_agent: String,
    },
    /// `open_connection`.
    OpenConnection {
        /// Host passed in.
        host: String,
        /// Port passed in.
        port: u16,
    },
    /// `open_request`.
    OpenRequest {
        /// Method passed in.
        method: Method,
        /// Path and query passed in.
        path: String,
        /// TLS flag passed in.
        secure: bool,
    },
    /// `add_headers`.
    AddHeaders {
        /// The header block.
        block: String,
        /// The merge mode.
        mode: AddHeadersMode,
    },
    /// `send`.
    Send {
        /// The request body.
        body: Vec<u8>,
    },
    /// `status_code`.
    QueryStatus,
    /// `raw_headers`.
    QueryHeaders,
    /// `read_chunk`.
    ReadBody {
        /// Bytes returned (0 at end of body).
        len: usize,
    },
    /// A handle was dropped.
    Release(HandleKind),
}

/// Shared, append-only record of transport calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl CallLog {
    fn push(&self, call: Call) {
        self.calls.lock().push(call);
    }

    /// Snapshot of the calls recorded so far.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Forget all recorded calls.
    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

/// The response every request on a [`MockTransport`] receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockResponse {
    status: u16,
    headers: Vec<(String, String)>,
    raw_headers: Option<String>,
    chunks: Vec<Vec<u8>>,
    fail_read_after: Option<usize>,
}

impl MockResponse {
    /// A response with `status`, no headers and no body.
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            raw_headers: None,
            chunks: Vec::new(),
            fail_read_after: None,
        }
    }

    /// Add a response header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Append one body chunk. Each chunk is returned by its own read as
    /// long as the read buffer is large enough.
    #[must_use]
    pub fn with_chunk(mut self, chunk: impl Into<Vec<u8>>) -> Self {
        self.chunks.push(chunk.into());
        self
    }

    /// Use `body` as the whole body, in one chunk.
    #[must_use]
    pub fn with_body(self, body: impl Into<Vec<u8>>) -> Self {
        self.with_chunk(body)
    }

    /// Return `raw` verbatim from `raw_headers`, instead of a block built
    /// from the status and headers.
    #[must_use]
    pub fn with_raw_headers(mut self, raw: impl Into<String>) -> Self {
        self.raw_headers = Some(raw.into());
        self
    }

    /// Fail the read that follows the first `chunks` chunks.
    #[must_use]
    pub fn fail_read_after(mut self, chunks: usize) -> Self {
        self.fail_read_after = Some(chunks);
        self
    }

    fn raw_header_block(&self) -> String {
        if let Some(raw) = &self.raw_headers {
            return raw.clone();
        }
        let mut raw = format!("HTTP/1.1 {}\r\n", self.status);
        for (name, value) in &self.headers {
            raw.push_str(name);
            raw.push_str(": ");
            raw.push_str(value);
            raw.push_str("\r\n");
        }
        raw.push_str("\r\n");
        raw
    }
}

/// Everything a handle needs to behave and report.
#[derive(Debug, Clone)]
struct Script {
    log: CallLog,
    response: MockResponse,
    fail_at: Option<TransportOp>,
}

impl Script {
    /// Record `call`, then fail if `op` is the scripted failure point.
    fn enter(&self, op: TransportOp, call: Call) -> Result<(), TransportError> {
        self.log.push(call);
        if self.fail_at == Some(op) {
            return Err(TransportError::new(op, "injected failure").with_code(INJECTED_ERROR_CODE));
        }
        Ok(())
    }
}

/// A transport that never touches the network.
#[derive(Debug, Clone)]
pub struct MockTransport {
    script: Script,
}

impl MockTransport {
    /// Answer every request with `response`.
    #[must_use]
    pub fn new(response: MockResponse) -> Self {
        Self {
            script: Script {
                log: CallLog::default(),
                response,
                fail_at: None,
            },
        }
    }

    /// Make the capability `op` fail.
    #[must_use]
    pub fn fail_at(mut self, op: TransportOp) -> Self {
        self.script.fail_at = Some(op);
        self
    }

    /// Snapshot of the calls recorded so far.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.script.log.snapshot()
    }

    /// The shared call log.
    #[must_use]
    pub fn call_log(&self) -> CallLog {
        self.script.log.clone()
    }
}

impl Transport for MockTransport {
    type Session = MockSession;

    fn open_session(&self, user_agent: &str) -> Result<MockSession, TransportError> {
        self.script.enter(
            TransportOp::OpenSession,
            Call::OpenSession {
                user_agent: user_agent.to_string(),
            },
        )?;
        Ok(MockSession {
            script: self.script.clone(),
        })
    }
}

/// Session handle of a [`MockTransport`].
#[derive(Debug)]
pub struct MockSession {
    script: Script,
}

impl Session for MockSession {
    type Connection = MockConnection;

    fn open_connection(&mut self, host: &str, port: u16) -> Result<MockConnection, TransportError> {
        self.script.enter(
            TransportOp::OpenConnection,
            Call::OpenConnection {
                host: host.to_string(),
                port,
            },
        )?;
        Ok(MockConnection {
            script: self.script.clone(),
        })
    }
}

impl Drop for MockSession {
    fn drop(&mut self) {
        self.script.log.push(Call::Release(HandleKind::Session));
    }
}

/// Connection handle of a [`MockTransport`].
#[derive(Debug)]
pub struct MockConnection {
    script: Script,
}

impl Connection for MockConnection {
    type Request = MockRequest;

    fn open_request(
        &mut self,
        method: Method,
        path: &str,
        secure: bool,
    ) -> Result<MockRequest, TransportError> {
        self.script.enter(
            TransportOp::OpenRequest,
            Call::OpenRequest {
                method,
                path: path.to_string(),
                secure,
            },
        )?;
        Ok(MockRequest {
            script: self.script.clone(),
            chunk: 0,
            offset: 0,
        })
    }
}

impl Drop for MockConnection {
    fn drop(&mut self) {
        self.script.log.push(Call::Release(HandleKind::Connection));
    }
}

/// Request handle of a [`MockTransport`].
#[derive(Debug)]
pub struct MockRequest {
    script: Script,
    chunk: usize,
    offset: usize,
}

impl RequestHandle for MockRequest {
    fn add_headers(&mut self, block: &str, mode: AddHeadersMode) -> Result<(), TransportError> {
        self.script.enter(
            TransportOp::AddHeaders,
            Call::AddHeaders {
                block: block.to_string(),
                mode,
            },
        )
    }

    fn send(&mut self, body: &[u8]) -> Result<(), TransportError> {
        self.script
            .enter(TransportOp::Send, Call::Send { body: body.to_vec() })
    }

    fn status_code(&mut self) -> Result<u16, TransportError> {
        self.script.enter(TransportOp::QueryStatus, Call::QueryStatus)?;
        Ok(self.script.response.status)
    }

    fn raw_headers(&mut self) -> Result<String, TransportError> {
        self.script.enter(TransportOp::QueryHeaders, Call::QueryHeaders)?;
        Ok(self.script.response.raw_header_block())
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let response = &self.script.response;
        if response.fail_read_after.is_some_and(|n| self.chunk >= n) {
            self.script.log.push(Call::ReadBody { len: 0 });
            return Err(TransportError::new(TransportOp::ReadBody, "connection reset")
                .with_code(INJECTED_ERROR_CODE));
        }

        let Some(chunk) = response.chunks.get(self.chunk) else {
            self.script.enter(TransportOp::ReadBody, Call::ReadBody { len: 0 })?;
            return Ok(0);
        };
        let rest = &chunk[self.offset..];
        let n = rest.len().min(buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        self.offset += n;
        if self.offset == chunk.len() {
            self.chunk += 1;
            self.offset = 0;
        }
        self.script
            .enter(TransportOp::ReadBody, Call::ReadBody { len: n })?;
        Ok(n)
    }
}

impl Drop for MockRequest {
    fn drop(&mut self) {
        self.script.log.push(Call::Release(HandleKind::Request));
    }
}
