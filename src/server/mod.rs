//! Accept loop.
//!
//! Each accepted socket gets its own tokio task running a
//! [`Connection`](crate::http::connection::Connection). A semaphore bounds how
//! many of those tasks are alive at once; the accept loop waits for a free
//! permit before taking the next socket off the backlog.

pub mod listener;

pub use listener::Server;
