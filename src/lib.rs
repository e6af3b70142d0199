//! Hearth - a small HTTP/1.1 server engine
//!
//! Reads exactly one request per connection, hands it to a dispatcher and
//! writes the response back before closing.

pub mod config;
pub mod handler;
pub mod http;
pub mod server;
