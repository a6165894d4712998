//! Error types for request execution.
//!
//! Errors fall into two groups:
//! - environment failures ([`Error::Transport`], [`Error::Protocol`],
//!   [`Error::StreamRead`]) that a caller can react to, e.g. by retrying at
//!   a higher layer
//! - caller mistakes ([`Error::Config`], [`Error::Misuse`]) that will fail
//!   the same way every time

use std::io;
use winant_core::ConfigError;

/// The transport capability that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportOp {
    /// Opening the session.
    OpenSession,
    /// Opening the connection to the host.
    OpenConnection,
    /// Opening the request handle.
    OpenRequest,
    /// Adding headers to the request handle.
    AddHeaders,
    /// Sending the request.
    Send,
    /// Querying the response status code.
    QueryStatus,
    /// Querying the raw response header block.
    QueryHeaders,
    /// Reading a chunk of the response body.
    ReadBody,
}

impl TransportOp {
    /// Short name used in error messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenSession => "open session",
            Self::OpenConnection => "open connection",
            Self::OpenRequest => "open request",
            Self::AddHeaders => "add headers",
            Self::Send => "send",
            Self::QueryStatus => "query status",
            Self::QueryHeaders => "query headers",
            Self::ReadBody => "read body",
        }
    }
}

impl std::fmt::Display for TransportOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    op: TransportOp,
    code: Option<i32>,
    detail: String,
}

impl TransportError {
    /// Create a transport error without a platform code.
    #[must_use]
    pub fn new(op: TransportOp, detail: impl Into<String>) -> Self {
        Self {
            op,
            code: None,
            detail: detail.into(),
        }
    }

    /// Attach a platform error code.
    #[must_use]
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    /// Build from an I/O error, keeping its OS error code if any.
    #[must_use]
    pub fn from_io(op: TransportOp, err: &io::Error) -> Self {
        Self {
            op,
            code: err.raw_os_error(),
            detail: err.to_string(),
        }
    }

    /// The capability that failed.
    #[must_use]
    pub fn op(&self) -> TransportOp {
        self.op
    }

    /// The platform error code, when the transport has one.
    #[must_use]
    pub fn code(&self) -> Option<i32> {
        self.code
    }

    /// Human-readable detail.
    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} failed (code {code}): {}", self.op, self.detail),
            None => write!(f, "{} failed: {}", self.op, self.detail),
        }
    }
}

impl std::error::Error for TransportError {}

/// The response did not follow the expected wire format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A response header line had no `": "` delimiter.
    MalformedHeaderLine {
        /// The offending line.
        line: String,
    },
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedHeaderLine { line } => {
                write!(f, "malformed response header line: {line:?}")
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Any error produced while building or executing a request.
#[derive(Debug)]
pub enum Error {
    /// The request was configured with an unusable URL or method.
    Config(ConfigError),
    /// Opening handles, pushing headers, sending or querying the response failed.
    Transport(TransportError),
    /// The response header block was malformed.
    Protocol(ProtocolError),
    /// Reading the response body failed part way.
    StreamRead(TransportError),
    /// The request object was used out of order, e.g. started twice.
    Misuse {
        /// What was attempted.
        detail: &'static str,
    },
    /// The response body could not be decoded as requested.
    Decode {
        /// Decoder diagnostic.
        detail: String,
    },
}

impl Error {
    /// Returns true for errors caused by the caller rather than the
    /// environment. Repeating the same call will fail the same way.
    #[must_use]
    pub fn is_misuse(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Misuse { .. })
    }

    /// The transport error behind this error, if any.
    #[must_use]
    pub fn transport_error(&self) -> Option<&TransportError> {
        match self {
            Self::Transport(e) | Self::StreamRead(e) => Some(e),
            _ => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration error: {e}"),
            Self::Transport(e) => write!(f, "transport error: {e}"),
            Self::Protocol(e) => write!(f, "protocol error: {e}"),
            Self::StreamRead(e) => write!(f, "response stream error: {e}"),
            Self::Misuse { detail } => write!(f, "request misuse: {detail}"),
            Self::Decode { detail } => write!(f, "response decode error: {detail}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Transport(e) | Self::StreamRead(e) => Some(e),
            Self::Protocol(e) => Some(e),
            Self::Misuse { .. } | Self::Decode { .. } => None,
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

impl From<ProtocolError> for Error {
    fn from(e: ProtocolError) -> Self {
        Self::Protocol(e)
    }
}
