use crate::http::frame::{MAX_CONTENT_LENGTH, find_headers_end};
use crate::http::request::{Method, Request, RequestBuilder};

/// Longest accepted line, request line included.
pub const MAX_LINE_LENGTH: usize = 8192;

/// Most header lines accepted before the blank line.
pub const MAX_HEADERS: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid request line")]
    InvalidRequestLine,
    #[error("too many headers")]
    TooManyHeaders,
    #[error("line too long")]
    LineTooLong,
    #[error("invalid content length: {0:?}")]
    InvalidContentLength(String),
}

/// Parses one complete request frame.
///
/// The caller is expected to have checked the frame with
/// [`detect_frame`](crate::http::frame::detect_frame). If fewer body bytes are
/// present than declared the body is silently truncated to what is there.
pub fn parse_http_request(buf: &[u8]) -> Result<Request, ParseError> {
    let (header_block, body_bytes) = match find_headers_end(buf) {
        Some(end) => buf.split_at(end),
        None => (buf, &[][..]),
    };

    let mut lines = header_block
        .split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line));

    // Request line
    let request_line = lines.next().unwrap_or_default();
    if request_line.len() > MAX_LINE_LENGTH {
        return Err(ParseError::LineTooLong);
    }
    let request_line = String::from_utf8_lossy(request_line);
    let (method, path, version) =
        split_request_line(&request_line).ok_or(ParseError::InvalidRequestLine)?;

    let mut builder = RequestBuilder::new()
        .method(Method::parse(method))
        .path(path);
    if let Some(version) = version {
        builder = builder.version(version);
    }

    // Headers
    let mut header_lines = 0;
    let mut content_length = None;

    for line in lines {
        if line.is_empty() {
            break;
        }
        if line.len() > MAX_LINE_LENGTH {
            return Err(ParseError::LineTooLong);
        }

        header_lines += 1;
        if header_lines > MAX_HEADERS {
            return Err(ParseError::TooManyHeaders);
        }

        let line = String::from_utf8_lossy(line);
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let value = value.trim();

        if key.eq_ignore_ascii_case("Content-Length") {
            content_length = Some(value.to_string());
        }
        builder = builder.header(key, value);
    }

    // Body
    if let Some(raw) = content_length {
        let len = parse_content_length(&raw)?;
        let available = len.min(body_bytes.len());
        builder = builder.body(body_bytes[..available].to_vec());
    }

    Ok(builder.build())
}

/// Splits on runs of whitespace into method, path and an optional remainder.
fn split_request_line(line: &str) -> Option<(&str, &str, Option<&str>)> {
    let line = line.trim_start();
    let (method, rest) = line.split_once(char::is_whitespace)?;
    let rest = rest.trim_start();
    if rest.is_empty() {
        return None;
    }

    let (path, version) = match rest.split_once(char::is_whitespace) {
        Some((path, version)) => (path, Some(version.trim()).filter(|v| !v.is_empty())),
        None => (rest, None),
    };

    Some((method, path, version))
}

fn parse_content_length(raw: &str) -> Result<usize, ParseError> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .and_then(|len| usize::try_from(len).ok())
        .filter(|&len| len <= MAX_CONTENT_LENGTH)
        .ok_or_else(|| ParseError::InvalidContentLength(raw.to_string()))
}
