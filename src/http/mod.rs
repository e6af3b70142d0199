//! HTTP protocol implementation.
//!
//! This module implements the HTTP/1.1 side of the server: one request per
//! connection, `Connection: close` on every response, no keep-alive.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`frame`**: Decides whether the buffered bytes hold a complete request
//! - **`parser`**: Parses a complete request frame
//! - **`request`**: HTTP request representation
//! - **`response`**: HTTP response representation with builder pattern
//! - **`writer`**: Serializes responses and writes them out with a cursor
//! - **`connection`**: The per-connection state machine
//! - **`stats`**: Counters shared by all connections
//! - **`mime`**: MIME type detection based on file extensions
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Accumulate bytes until a full frame is buffered
//!        └──────┬──────┘
//!               │ Frame complete          (EOF → Closed, no response)
//!               │                         (> 64 KiB → 413 → Writing)
//!               │                         (parse error → 400 → Writing)
//!               ▼
//!        ┌──────────────────┐
//!        │   Dispatching    │ ← Run the dispatcher, 404 if nothing matched
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Drain the serialized response
//!        └──────┬───────────┘
//!               │ Response sent
//!               ▼
//!            Closed
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use hearth::handler::{Dispatcher, Router};
//! use hearth::http::connection::Connection;
//! use hearth::http::request::Request;
//! use hearth::http::response::Response;
//! use hearth::http::stats::ConnectionStats;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!     let router: Arc<dyn Dispatcher> = Arc::new(
//!         Router::new().route("/", |_req: &Request, res: &mut Response| {
//!             res.set_body("hello");
//!         }),
//!     );
//!     let stats = Arc::new(ConnectionStats::new());
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let conn = Connection::new(socket, Arc::clone(&router), Arc::clone(&stats));
//!         tokio::spawn(async move {
//!             if let Err(e) = conn.run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod connection;
pub mod frame;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod stats;
pub mod writer;
