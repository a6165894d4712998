//! Streaming decoder for `Transfer-Encoding: chunked` response bodies.
//!
//! ```text
//! chunk-size [; extensions] CRLF
//! chunk-data CRLF
//! ...
//! 0 CRLF
//! [trailers] CRLF
//! ```

use std::io::{self, BufRead, Read};
use winant_core::Headers;

/// Longest size line or trailer section accepted (8KB).
const MAX_LINE_LEN: usize = 8 * 1024;

/// Where the decoder is in the chunk sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkedState {
    /// Expecting a chunk size line.
    ChunkSize,
    /// Reading chunk data.
    ChunkData { remaining: usize },
    /// Expecting CRLF after chunk data.
    ChunkDataEnd,
    /// Reading trailers after the final chunk.
    Trailers,
    /// Complete.
    Complete,
}

/// Decodes a chunked body from `reader`, yielding only payload bytes.
///
/// `read` returns `Ok(0)` once the terminating chunk and trailers have been
/// consumed. Malformed framing is reported as [`io::ErrorKind::InvalidData`]
/// and a stream that ends early as [`io::ErrorKind::UnexpectedEof`].
#[derive(Debug)]
pub struct ChunkedDecoder<R> {
    reader: R,
    state: ChunkedState,
    line: Vec<u8>,
    trailer_bytes: usize,
    total_size: usize,
    trailers: Headers,
}

impl<R: BufRead> ChunkedDecoder<R> {
    /// Create a decoder positioned at the first chunk size line.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            state: ChunkedState::ChunkSize,
            line: Vec::new(),
            trailer_bytes: 0,
            total_size: 0,
            trailers: Headers::new(),
        }
    }

    /// Returns true once the final chunk and trailers have been read.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state == ChunkedState::Complete
    }

    /// Total payload bytes decoded so far.
    #[must_use]
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    /// Trailer fields received after the final chunk.
    #[must_use]
    pub fn trailers(&self) -> &Headers {
        &self.trailers
    }

    /// Return the wrapped reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Read one CRLF (or bare LF) terminated line into `self.line`, without
    /// the terminator.
    fn read_line(&mut self) -> io::Result<()> {
        self.line.clear();
        let n = (&mut self.reader)
            .take(MAX_LINE_LEN as u64 + 1)
            .read_until(b'\n', &mut self.line)?;
        if n == 0 || !self.line.ends_with(b"\n") {
            if self.line.len() > MAX_LINE_LEN {
                return Err(invalid_data("chunk line longer than 8KB"));
            }
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stream ended inside chunked body",
            ));
        }
        self.line.pop();
        if self.line.ends_with(b"\r") {
            self.line.pop();
        }
        Ok(())
    }

    fn parse_chunk_size(&self) -> io::Result<usize> {
        // Extensions after ';' are ignored.
        let size = match memchr::memchr(b';', &self.line) {
            Some(semi) => &self.line[..semi],
            None => &self.line[..],
        };
        let size = std::str::from_utf8(size).map_err(|_| invalid_data("invalid UTF-8 in chunk size"))?;
        let size = size.trim();
        if size.is_empty() {
            return Err(invalid_data("missing chunk size"));
        }
        if !size.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid_data("invalid hex chunk size"));
        }
        usize::from_str_radix(size, 16).map_err(|_| invalid_data("invalid hex chunk size"))
    }

    fn read_trailer(&mut self) -> io::Result<()> {
        self.read_line()?;
        if self.line.is_empty() {
            self.state = ChunkedState::Complete;
            return Ok(());
        }

        self.trailer_bytes += self.line.len() + 2;
        if self.trailer_bytes > MAX_LINE_LEN {
            return Err(invalid_data("chunked trailers larger than 8KB"));
        }

        let line = std::str::from_utf8(&self.line).map_err(|_| invalid_data("invalid UTF-8 in trailer"))?;
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| invalid_data("malformed trailer line"))?;
        self.trailers.set_header(name.trim(), value.trim());
        Ok(())
    }
}

impl<R: BufRead> Read for ChunkedDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            match self.state {
                ChunkedState::ChunkSize => {
                    self.read_line()?;
                    let size = self.parse_chunk_size()?;
                    self.state = if size == 0 {
                        ChunkedState::Trailers
                    } else {
                        ChunkedState::ChunkData { remaining: size }
                    };
                }
                ChunkedState::ChunkData { remaining } => {
                    let available = self.reader.fill_buf()?;
                    if available.is_empty() {
                        return Err(io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            "stream ended inside a chunk",
                        ));
                    }
                    let n = buf.len().min(available.len()).min(remaining);
                    buf[..n].copy_from_slice(&available[..n]);
                    self.reader.consume(n);
                    self.total_size += n;
                    self.state = if n == remaining {
                        ChunkedState::ChunkDataEnd
                    } else {
                        ChunkedState::ChunkData {
                            remaining: remaining - n,
                        }
                    };
                    return Ok(n);
                }
                ChunkedState::ChunkDataEnd => {
                    self.read_line()?;
                    if !self.line.is_empty() {
                        return Err(invalid_data("expected CRLF after chunk data"));
                    }
                    self.state = ChunkedState::ChunkSize;
                }
                ChunkedState::Trailers => self.read_trailer()?,
                ChunkedState::Complete => return Ok(0),
            }
        }
    }
}

fn invalid_data(detail: &'static str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, detail)
}
