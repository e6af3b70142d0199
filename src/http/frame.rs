//! Request framing.
//!
//! Decides whether the bytes accumulated for a connection hold one complete
//! request: a header block terminated by `CRLF CRLF` followed by as many body
//! bytes as the `Content-Length` header declares. Nothing here performs I/O
//! and every call recomputes the answer from scratch, so it does not matter
//! how the bytes were split across reads.

/// Hard cap on the bytes buffered for a single request (64 KiB).
pub const MAX_REQUEST_SIZE: usize = 64 * 1024;

/// Largest `Content-Length` accepted (1 MiB).
pub const MAX_CONTENT_LENGTH: usize = 1024 * 1024;

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Position of a complete request inside the accumulation buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Index immediately after the header terminator.
    pub header_end: usize,
    /// Declared body length, 0 if absent or unusable.
    pub body_len: usize,
}

impl Frame {
    /// Index just past the last byte of the frame.
    pub fn end(&self) -> usize {
        self.header_end + self.body_len
    }

    /// Returns `true` once `buffered` bytes cover the whole frame.
    pub fn is_complete(&self, buffered: usize) -> bool {
        buffered >= self.end()
    }
}

/// Returns the index just past the first `CRLF CRLF`, if any.
pub fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(HEADER_TERMINATOR.len())
        .position(|w| w == HEADER_TERMINATOR)
        .map(|pos| pos + HEADER_TERMINATOR.len())
}

/// Scans a header block for `Content-Length` without a full parse.
///
/// Returns 0 when the header is missing, non-numeric, negative or larger than
/// [`MAX_CONTENT_LENGTH`]. The bad cases are reported later by the parser.
pub fn declared_content_length(header_block: &[u8]) -> usize {
    raw_content_length(header_block)
        .and_then(|len| usize::try_from(len).ok())
        .filter(|&len| len <= MAX_CONTENT_LENGTH)
        .unwrap_or(0)
}

/// The unclamped numeric value of the last `Content-Length` header.
///
/// `None` unless the value is all ASCII digits. A value too large for `u64`
/// saturates to `u64::MAX`.
pub fn raw_content_length(header_block: &[u8]) -> Option<u64> {
    let mut declared = None;

    // First line is the request line.
    for line in header_block.split(|&b| b == b'\n').skip(1) {
        let Some(colon) = line.iter().position(|&b| b == b':') else {
            continue;
        };
        let name = line[..colon].trim_ascii();
        if name.eq_ignore_ascii_case(b"Content-Length") {
            declared = Some(line[colon + 1..].trim_ascii());
        }
    }

    let digits = declared.filter(|v| !v.is_empty() && v.iter().all(u8::is_ascii_digit))?;
    Some(digits.iter().fold(0u64, |acc, &d| {
        acc.saturating_mul(10).saturating_add(u64::from(d - b'0'))
    }))
}

/// Locates the frame of the request at the start of `buf`.
///
/// Returns `None` while the header terminator has not arrived yet. A returned
/// frame may still be waiting for body bytes, see [`Frame::is_complete`].
pub fn detect_frame(buf: &[u8]) -> Option<Frame> {
    let header_end = find_headers_end(buf)?;
    Some(Frame {
        header_end,
        body_len: declared_content_length(&buf[..header_end]),
    })
}

/// Convenience predicate: is a full request buffered?
pub fn is_frame_complete(buf: &[u8]) -> bool {
    detect_frame(buf).is_some_and(|frame| frame.is_complete(buf.len()))
}
