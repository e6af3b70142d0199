use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, trace, warn};

use crate::handler::Dispatcher;
use crate::http::frame::{MAX_REQUEST_SIZE, detect_frame, raw_content_length};
use crate::http::parser::parse_http_request;
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};
use crate::http::stats::ConnectionStats;
use crate::http::writer::ResponseWriter;

/// Initial capacity of the accumulation buffer.
const INITIAL_BUFFER_SIZE: usize = 4096;

/// Spare capacity guaranteed before every read.
const MIN_READ_SPACE: usize = 1024;

/// Drives one accepted stream from the first byte read to close.
///
/// Exactly one request is read, dispatched and answered; the connection is
/// never reused.
pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    state: ConnectionState,
    dispatcher: Arc<dyn Dispatcher>,
    stats: Arc<ConnectionStats>,
}

enum ConnectionState {
    Reading,
    Dispatching(Request),
    Writing(ResponseWriter, StatusCode),
    Closed,
}

/// How a connection that ran to completion ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A response with this status was fully written.
    Responded(StatusCode),
    /// The peer closed its write side before a full request arrived.
    PeerClosed,
}

/// Errors that end a connection without a response.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("handler panicked")]
    HandlerPanicked,
}

/// Result of the reading phase.
enum ReadResult {
    Request(Request),
    Rejected(Response),
    PeerClosed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, dispatcher: Arc<dyn Dispatcher>, stats: Arc<ConnectionStats>) -> Self {
        stats.connection_opened();

        Self {
            stream,
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            state: ConnectionState::Reading,
            dispatcher,
            stats,
        }
    }

    pub async fn run(mut self) -> Result<Outcome, ConnectionError> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => match self.read_request().await? {
                    ReadResult::Request(req) => {
                        self.state = ConnectionState::Dispatching(req);
                    }
                    ReadResult::Rejected(response) => {
                        self.stats.request_rejected();
                        let writer = ResponseWriter::new(&response);
                        self.state = ConnectionState::Writing(writer, response.status);
                    }
                    ReadResult::PeerClosed => {
                        debug!(buffered = self.buffer.len(), "Peer closed before a full request");
                        return Ok(Outcome::PeerClosed);
                    }
                },

                ConnectionState::Dispatching(req) => {
                    let response = self.dispatch(&req)?;
                    debug!(
                        method = %req.method,
                        path = %req.path,
                        status = response.status.as_u16(),
                        "Dispatched request"
                    );
                    self.state =
                        ConnectionState::Writing(ResponseWriter::new(&response), response.status);
                }

                ConnectionState::Writing(mut writer, status) => {
                    let result = writer.write_to_stream(&mut self.stream).await;
                    self.stats.bytes_written(writer.written());
                    result?;
                    self.stats.response_sent(status);

                    if let Err(e) = self.stream.shutdown().await {
                        debug!(error = %e, "Shutdown after response failed");
                    }
                    return Ok(Outcome::Responded(status));
                }

                ConnectionState::Closed => {
                    return Err(io::Error::from(io::ErrorKind::NotConnected).into());
                }
            }
        }
    }

    /// Reads until a full frame is buffered, the size cap is hit or the peer
    /// stops sending.
    async fn read_request(&mut self) -> Result<ReadResult, ConnectionError> {
        loop {
            if self.buffer.capacity() - self.buffer.len() < MIN_READ_SPACE {
                self.buffer.reserve(INITIAL_BUFFER_SIZE);
            }

            let n = self.stream.read_buf(&mut self.buffer).await?;
            if n == 0 {
                return Ok(ReadResult::PeerClosed);
            }

            self.stats.bytes_read(n);
            trace!(bytes = n, buffered = self.buffer.len(), "Read data");

            if self.buffer.len() > MAX_REQUEST_SIZE {
                warn!(size = self.buffer.len(), "Request exceeds size limit");
                return Ok(ReadResult::Rejected(Response::payload_too_large()));
            }

            let Some(frame) = detect_frame(&self.buffer) else {
                continue;
            };

            // A declared body that cannot fit under the cap is rejected now,
            // whatever the 1 MiB Content-Length limit makes of it.
            let declared = raw_content_length(&self.buffer[..frame.header_end]).unwrap_or(0);
            if (frame.header_end as u64).saturating_add(declared) > MAX_REQUEST_SIZE as u64 {
                warn!(
                    header_bytes = frame.header_end,
                    content_length = declared,
                    "Declared request exceeds size limit"
                );
                return Ok(ReadResult::Rejected(Response::payload_too_large()));
            }

            if !frame.is_complete(self.buffer.len()) {
                trace!(
                    needed = frame.end(),
                    buffered = self.buffer.len(),
                    "Waiting for request body"
                );
                continue;
            }

            return match parse_http_request(&self.buffer[..frame.end()]) {
                Ok(request) => {
                    self.stats.request_parsed();
                    Ok(ReadResult::Request(request))
                }
                Err(e) => {
                    warn!(error = %e, "Malformed request");
                    Ok(ReadResult::Rejected(Response::bad_request()))
                }
            };
        }
    }

    /// Runs the dispatcher, substituting a 404 when nothing matched.
    fn dispatch(&self, req: &Request) -> Result<Response, ConnectionError> {
        let dispatcher = &self.dispatcher;
        match panic::catch_unwind(AssertUnwindSafe(|| dispatcher.dispatch(req))) {
            Ok(Some(response)) => Ok(response),
            Ok(None) => Ok(Response::not_found()),
            Err(_) => {
                error!(method = %req.method, path = %req.path, "Handler panicked");
                Err(ConnectionError::HandlerPanicked)
            }
        }
    }
}

impl<S> Drop for Connection<S> {
    fn drop(&mut self) {
        self.stats.connection_closed();
    }
}
