use std::io;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::Response;

const HTTP_VERSION: &str = "HTTP/1.1";

/// Renders a response into its exact wire bytes.
///
/// Headers are written sorted by name. `Content-Length` is added from the
/// body size unless the handler set one, and every response ends its header
/// block with `Connection: close`.
pub fn serialize_response(resp: &Response) -> Vec<u8> {
    let mut buf = Vec::with_capacity(128 + resp.body.len());

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    // Headers
    let mut headers: Vec<_> = resp
        .headers
        .iter()
        .filter(|(k, _)| !k.eq_ignore_ascii_case("Connection"))
        .collect();
    headers.sort();

    let mut has_content_length = false;
    for (k, v) in headers {
        has_content_length |= k.eq_ignore_ascii_case("Content-Length");
        push_header(&mut buf, k, v);
    }
    if !has_content_length {
        push_header(&mut buf, "Content-Length", &resp.body.len().to_string());
    }
    push_header(&mut buf, "Connection", "close");

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    // Body
    buf.extend_from_slice(&resp.body);

    buf
}

fn push_header(buf: &mut Vec<u8>, key: &str, value: &str) {
    buf.extend_from_slice(key.as_bytes());
    buf.extend_from_slice(b": ");
    buf.extend_from_slice(value.as_bytes());
    buf.extend_from_slice(b"\r\n");
}

/// A serialized response and how much of it has reached the peer.
#[derive(Debug)]
pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl ResponseWriter {
    pub fn new(response: &Response) -> Self {
        Self {
            buffer: serialize_response(response),
            written: 0,
        }
    }

    /// Bytes already accepted by the stream.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn is_done(&self) -> bool {
        self.written >= self.buffer.len()
    }

    /// The part of the response still to be written.
    pub fn remaining(&self) -> &[u8] {
        &self.buffer[self.written..]
    }

    /// Writes until the whole response is flushed.
    ///
    /// The cursor only advances by what each write reports, so a short write
    /// is simply continued on the next iteration.
    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while !self.is_done() {
            let n = stream.write(self.remaining()).await?;

            if n == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "connection closed while writing",
                ));
            }

            self.written += n;
            tracing::trace!(
                bytes = n,
                written = self.written,
                total = self.buffer.len(),
                "Wrote response bytes"
            );
        }

        stream.flush().await
    }
}
